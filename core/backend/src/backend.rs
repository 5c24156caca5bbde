//! Storage backend trait definition.

use async_trait::async_trait;

use stratafs_common::Result;

/// Storage backend capability for one protocol.
///
/// A backend accepts paths as declared in the source configuration: the
/// protocol prefix may or may not be present, and every operation normalizes
/// its input through [`FsBackend::strip_protocol`] before acting on it.
/// Implementations must handle their own connection state and locking.
#[async_trait]
pub trait FsBackend: Send + Sync {
    /// Get the primary protocol identifier (e.g., "memory", "file", "http").
    fn protocol(&self) -> &str;

    /// Check whether a path exists.
    ///
    /// # Errors
    /// - I/O failure while probing the path
    async fn exists(&self, path: &str) -> Result<bool>;

    /// Create a directory, including any missing parents.
    ///
    /// Creating a directory that already exists is not an error.
    ///
    /// # Errors
    /// - Path exists but is a file
    /// - Backend does not support directories
    async fn mkdir(&self, path: &str) -> Result<()>;

    /// Read the complete contents of a file.
    ///
    /// # Errors
    /// - File not found
    /// - Path is a directory
    async fn read(&self, path: &str) -> Result<Vec<u8>>;

    /// Write the complete contents of a file, replacing anything present.
    ///
    /// # Errors
    /// - Parent directory not found
    /// - Backend is read-only
    async fn write(&self, path: &str, data: Vec<u8>) -> Result<()>;

    /// Reduce a declared path to the backend-internal form.
    ///
    /// The generic rule strips a leading `{protocol}://` prefix and trailing
    /// slashes; an empty result is the root. Backends with their own path
    /// shape (URLs, rooted pseudo-filesystems) override this.
    fn strip_protocol(&self, path: &str) -> String {
        let prefix = format!("{}://", self.protocol());
        let path = path.strip_prefix(&prefix).unwrap_or(path);
        let trimmed = path.trim_end_matches('/');
        if trimmed.is_empty() {
            "/".to_string()
        } else {
            trimmed.to_string()
        }
    }

    /// Fully-qualified form of a path, with the protocol prefix applied.
    ///
    /// Paths that already carry the prefix are returned unchanged.
    fn unstrip_protocol(&self, path: &str) -> String {
        let prefix = format!("{}://", self.protocol());
        if path.starts_with(&prefix) {
            path.to_string()
        } else {
            format!("{}{}", prefix, path)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use stratafs_common::Error;

    /// Minimal backend exercising the default path rules.
    struct PlainBackend;

    #[async_trait]
    impl FsBackend for PlainBackend {
        fn protocol(&self) -> &str {
            "plain"
        }

        async fn exists(&self, _path: &str) -> Result<bool> {
            Ok(false)
        }

        async fn mkdir(&self, _path: &str) -> Result<()> {
            Ok(())
        }

        async fn read(&self, path: &str) -> Result<Vec<u8>> {
            Err(Error::NotFound(path.to_string()))
        }

        async fn write(&self, _path: &str, _data: Vec<u8>) -> Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_strip_protocol_removes_prefix() {
        let backend = PlainBackend;
        assert_eq!(backend.strip_protocol("plain://some/dir"), "some/dir");
        assert_eq!(backend.strip_protocol("some/dir/"), "some/dir");
        assert_eq!(backend.strip_protocol("plain://"), "/");
    }

    #[test]
    fn test_unstrip_protocol_applies_prefix_once() {
        let backend = PlainBackend;
        assert_eq!(backend.unstrip_protocol("/data"), "plain:///data");
        assert_eq!(backend.unstrip_protocol("plain://data"), "plain://data");
    }
}
