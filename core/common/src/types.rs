//! Common types used throughout StrataFS.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Stable identifier under which a filesystem source is registered.
///
/// Keys are produced by percent-encoding a source name, so they are safe to
/// round-trip through URLs and wire identifiers. The same name always yields
/// the same key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct RegistryKey(String);

impl RegistryKey {
    /// Create a new RegistryKey from an already-encoded string.
    ///
    /// # Errors
    /// - Returns error if the key is empty
    pub fn new(key: impl Into<String>) -> crate::Result<Self> {
        let key = key.into();
        if key.is_empty() {
            return Err(crate::Error::InvalidInput(
                "RegistryKey cannot be empty".to_string(),
            ));
        }
        Ok(Self(key))
    }

    /// Get the inner string value.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RegistryKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<RegistryKey> for String {
    fn from(key: RegistryKey) -> Self {
        key.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_registry_key_creation() {
        let key = RegistryKey::new("my%20source").unwrap();
        assert_eq!(key.as_str(), "my%20source");
    }

    #[test]
    fn test_registry_key_empty_fails() {
        assert!(RegistryKey::new("").is_err());
    }

    #[test]
    fn test_registry_key_display() {
        let key = RegistryKey::new("abc").unwrap();
        assert_eq!(key.to_string(), "abc");
    }
}
