//! Source registry engine for StrataFS.
//!
//! This module provides:
//! - Reversible encoding of source names into URL-safe registry keys
//! - Protocol resolution for declared paths
//! - The async capability set over the backend catalog
//! - Configuration loading with placeholder synthesis and change detection
//! - The source registry itself: build, lookup, and reload
//!
//! # Architecture
//! The registry sits between the configuration file and the storage
//! backends, turning source declarations into live backend handles that
//! consumers look up by key or by protocol.

pub mod capability;
pub mod config;
pub mod key;
pub mod manager;
pub mod resolver;

pub use capability::AsyncProtocols;
pub use config::{ConfigFingerprint, RegistryConfig, SourceConfig};
pub use manager::{RegistrySnapshot, SourceEntry, SourceRegistry};
pub use resolver::DEFAULT_PROTOCOL;
