//! Async capability set.
//!
//! Records which protocols have a non-blocking backend implementation.
//! Built once when the registry is constructed and read-only afterwards;
//! each registry owns its own set rather than consulting global state.

use std::collections::BTreeSet;

use stratafs_backend::BackendCatalog;

/// The set of protocols whose backends are async-capable.
#[derive(Debug, Clone, Default)]
pub struct AsyncProtocols {
    protocols: BTreeSet<String>,
}

impl AsyncProtocols {
    /// Build the set from a backend catalog.
    ///
    /// Every registered protocol is inspected; those whose descriptor
    /// advertises an async implementation are included. Descriptors are
    /// plain registered values, so enumeration cannot fail.
    pub fn from_catalog(catalog: &BackendCatalog) -> Self {
        let protocols = catalog
            .iter()
            .filter(|(_, descriptor)| descriptor.async_impl)
            .map(|(protocol, _)| protocol.clone())
            .collect();
        Self { protocols }
    }

    /// Check whether a protocol has an async-capable backend.
    pub fn supports(&self, protocol: &str) -> bool {
        self.protocols.contains(protocol)
    }

    /// Iterate the async-capable protocols in sorted order.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.protocols.iter().map(String::as_str)
    }

    /// Number of async-capable protocols.
    pub fn len(&self) -> usize {
        self.protocols.len()
    }

    /// True when no protocol is async-capable.
    pub fn is_empty(&self) -> bool {
        self.protocols.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use stratafs_backend::default_catalog;

    #[test]
    fn test_default_catalog_capabilities() {
        let capabilities = AsyncProtocols::from_catalog(&default_catalog());

        assert!(capabilities.supports("http"));
        assert!(capabilities.supports("https"));
        assert!(!capabilities.supports("memory"));
        assert!(!capabilities.supports("file"));
        assert!(!capabilities.supports("local"));
        assert!(!capabilities.supports("s3"));
    }

    #[test]
    fn test_iter_is_sorted() {
        let capabilities = AsyncProtocols::from_catalog(&default_catalog());
        let listed: Vec<&str> = capabilities.iter().collect();
        assert_eq!(listed, vec!["http", "https"]);
    }

    #[test]
    fn test_empty_catalog() {
        let capabilities = AsyncProtocols::from_catalog(&BackendCatalog::new());
        assert!(capabilities.is_empty());
        assert_eq!(capabilities.len(), 0);
    }
}
