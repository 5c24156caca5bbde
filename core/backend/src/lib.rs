//! Storage backend abstraction for StrataFS.
//!
//! This module provides a trait-based interface for different storage backends
//! (local filesystem, in-memory, HTTP, etc.) and a backend catalog for
//! protocol-keyed construction.
//!
//! # Design Principles
//! - Backend isolation: No backend-specific logic in the registry module
//! - Async operations: All I/O operations are async
//! - Path normalization: Each backend owns its strip/unstrip rules
//! - Unified error semantics: Consistent error types across backends

pub mod backend;
pub mod catalog;
pub mod http;
pub mod local;
pub mod memory;

pub use backend::FsBackend;
pub use catalog::{default_catalog, BackendCatalog, BackendDescriptor, BackendFactory};
pub use http::HttpBackend;
pub use local::LocalBackend;
pub use memory::MemoryBackend;
