//! Protocol catalog for dynamic backend construction.

use std::collections::BTreeMap;
use std::sync::Arc;

use serde_json::{Map, Value};

use crate::backend::FsBackend;
use stratafs_common::{Error, Result};

/// Factory function type for constructing backends.
///
/// The boolean argument is the asynchronous-operation flag the caller derived
/// for the protocol; factories for purely synchronous backends ignore it.
pub type BackendFactory =
    Box<dyn Fn(bool, &Map<String, Value>) -> Result<Arc<dyn FsBackend>> + Send + Sync>;

/// Capability descriptor for one protocol: whether a non-blocking
/// implementation is available, and how to construct a handle.
pub struct BackendDescriptor {
    /// Whether this protocol's implementation is asynchronous-capable.
    pub async_impl: bool,
    factory: BackendFactory,
}

impl BackendDescriptor {
    /// Create a descriptor from a capability flag and a factory.
    pub fn new(async_impl: bool, factory: BackendFactory) -> Self {
        Self {
            async_impl,
            factory,
        }
    }

    /// Construct a backend handle from this descriptor.
    ///
    /// # Errors
    /// - Options are invalid for the protocol
    /// - Backend-specific construction failure
    pub fn construct(
        &self,
        asynchronous: bool,
        options: &Map<String, Value>,
    ) -> Result<Arc<dyn FsBackend>> {
        (self.factory)(asynchronous, options)
    }
}

/// Catalog of known storage protocols.
///
/// Maps protocol identifiers to their capability descriptors, allowing
/// dynamic registration and construction of backends by protocol name.
/// Enumeration order is deterministic (sorted by protocol).
pub struct BackendCatalog {
    entries: BTreeMap<String, BackendDescriptor>,
}

impl BackendCatalog {
    /// Create a new empty catalog.
    pub fn new() -> Self {
        Self {
            entries: BTreeMap::new(),
        }
    }

    /// Register a protocol descriptor.
    ///
    /// # Preconditions
    /// - `protocol` must be unique within the catalog
    ///
    /// # Errors
    /// - Returns error if the protocol is already registered
    pub fn register(
        &mut self,
        protocol: impl Into<String>,
        descriptor: BackendDescriptor,
    ) -> Result<()> {
        let protocol = protocol.into();
        if self.entries.contains_key(&protocol) {
            return Err(Error::AlreadyExists(format!(
                "Protocol '{}' is already registered",
                protocol
            )));
        }
        self.entries.insert(protocol, descriptor);
        Ok(())
    }

    /// Construct a backend handle for a protocol.
    ///
    /// # Errors
    /// - Protocol not registered
    /// - Options invalid for the protocol
    pub fn construct(
        &self,
        protocol: &str,
        asynchronous: bool,
        options: &Map<String, Value>,
    ) -> Result<Arc<dyn FsBackend>> {
        let descriptor = self.entries.get(protocol).ok_or_else(|| {
            Error::NotFound(format!("Protocol '{}' is not registered", protocol))
        })?;
        descriptor.construct(asynchronous, options)
    }

    /// Get the descriptor for a protocol, if registered.
    pub fn descriptor(&self, protocol: &str) -> Option<&BackendDescriptor> {
        self.entries.get(protocol)
    }

    /// Get the list of registered protocol identifiers, sorted.
    pub fn protocols(&self) -> Vec<String> {
        self.entries.keys().cloned().collect()
    }

    /// Check if a protocol is registered.
    pub fn contains(&self, protocol: &str) -> bool {
        self.entries.contains_key(protocol)
    }

    /// Iterate over `(protocol, descriptor)` pairs in sorted order.
    pub fn iter(&self) -> impl Iterator<Item = (&String, &BackendDescriptor)> {
        self.entries.iter()
    }
}

impl Default for BackendCatalog {
    fn default() -> Self {
        Self::new()
    }
}

/// Reject construction options outside the allowed set for a protocol.
pub(crate) fn reject_unknown_options(
    protocol: &str,
    options: &Map<String, Value>,
    allowed: &[&str],
) -> Result<()> {
    for key in options.keys() {
        if !allowed.contains(&key.as_str()) {
            return Err(Error::Construction(format!(
                "{} backend does not accept option '{}'",
                protocol, key
            )));
        }
    }
    Ok(())
}

fn local_factory() -> BackendFactory {
    Box::new(|_asynchronous, options| {
        Ok(Arc::new(crate::local::LocalBackend::from_options(options)?))
    })
}

fn http_factory(scheme: &'static str) -> BackendFactory {
    Box::new(move |_asynchronous, options| {
        Ok(Arc::new(crate::http::HttpBackend::from_options(
            scheme, options,
        )?))
    })
}

/// Create a catalog with the built-in protocols.
///
/// `file` and `local` are aliases for the same disk-backed implementation;
/// `http` and `https` are the asynchronous-capable network protocols.
pub fn default_catalog() -> BackendCatalog {
    let mut catalog = BackendCatalog::new();

    catalog
        .register(
            "memory",
            BackendDescriptor::new(
                false,
                Box::new(|_asynchronous, options| {
                    Ok(Arc::new(crate::memory::MemoryBackend::from_options(
                        options,
                    )?))
                }),
            ),
        )
        .expect("Failed to register memory backend");

    catalog
        .register("file", BackendDescriptor::new(false, local_factory()))
        .expect("Failed to register file backend");
    catalog
        .register("local", BackendDescriptor::new(false, local_factory()))
        .expect("Failed to register local backend");

    catalog
        .register("http", BackendDescriptor::new(true, http_factory("http")))
        .expect("Failed to register http backend");
    catalog
        .register("https", BackendDescriptor::new(true, http_factory("https")))
        .expect("Failed to register https backend");

    catalog
}
