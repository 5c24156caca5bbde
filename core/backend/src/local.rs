//! Local disk storage backend.

use std::path::PathBuf;

use async_trait::async_trait;
use serde_json::{Map, Value};
use tokio::fs;

use crate::backend::FsBackend;
use crate::catalog::reject_unknown_options;
use stratafs_common::{Error, Result};

/// Local disk storage backend.
///
/// Operates on absolute host paths; the declared source path is data the
/// registry tracks, not a jail root. With `auto_mkdir` enabled, writes
/// create missing parent directories first.
pub struct LocalBackend {
    auto_mkdir: bool,
}

impl LocalBackend {
    /// Create a new local backend.
    pub fn new(auto_mkdir: bool) -> Self {
        Self { auto_mkdir }
    }

    /// Construct from declaration options.
    ///
    /// # Errors
    /// - Accepts only `auto_mkdir: bool`
    pub fn from_options(options: &Map<String, Value>) -> Result<Self> {
        reject_unknown_options("local", options, &["auto_mkdir"])?;
        let auto_mkdir = match options.get("auto_mkdir") {
            None => false,
            Some(Value::Bool(flag)) => *flag,
            Some(other) => {
                return Err(Error::Construction(format!(
                    "local backend option 'auto_mkdir' must be a boolean, got {}",
                    other
                )));
            }
        };
        Ok(Self::new(auto_mkdir))
    }

    /// Convert a declared path to a host filesystem path.
    fn to_fs_path(&self, path: &str) -> PathBuf {
        PathBuf::from(self.strip_protocol(path))
    }
}

#[async_trait]
impl FsBackend for LocalBackend {
    fn protocol(&self) -> &str {
        "file"
    }

    async fn exists(&self, path: &str) -> Result<bool> {
        let fs_path = self.to_fs_path(path);
        Ok(fs_path.exists())
    }

    async fn mkdir(&self, path: &str) -> Result<()> {
        let fs_path = self.to_fs_path(path);
        fs::create_dir_all(&fs_path).await?;
        Ok(())
    }

    async fn read(&self, path: &str) -> Result<Vec<u8>> {
        let fs_path = self.to_fs_path(path);

        if !fs_path.exists() {
            return Err(Error::NotFound(format!("File not found: {}", path)));
        }
        if fs_path.is_dir() {
            return Err(Error::InvalidInput(format!(
                "Cannot read directory: {}",
                path
            )));
        }

        Ok(fs::read(&fs_path).await?)
    }

    async fn write(&self, path: &str, data: Vec<u8>) -> Result<()> {
        let fs_path = self.to_fs_path(path);

        if let Some(parent) = fs_path.parent() {
            if self.auto_mkdir {
                fs::create_dir_all(parent).await?;
            } else if !parent.exists() {
                return Err(Error::NotFound("Parent directory not found".to_string()));
            }
        }

        fs::write(&fs_path, &data).await?;
        Ok(())
    }

    /// Disk paths may be declared under either registered alias.
    fn strip_protocol(&self, path: &str) -> String {
        let path = path
            .strip_prefix("file://")
            .or_else(|| path.strip_prefix("local://"))
            .unwrap_or(path);
        let trimmed = path.trim_end_matches('/');
        if trimmed.is_empty() {
            "/".to_string()
        } else {
            trimmed.to_string()
        }
    }

    /// Either alias counts as already qualified.
    fn unstrip_protocol(&self, path: &str) -> String {
        if path.starts_with("file://") || path.starts_with("local://") {
            path.to_string()
        } else {
            format!("file://{}", path)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_write_read() {
        let temp = TempDir::new().unwrap();
        let backend = LocalBackend::new(false);
        let path = temp.path().join("test.txt");
        let path = path.to_str().unwrap();
        let data = b"Hello, Local!".to_vec();

        backend.write(path, data.clone()).await.unwrap();
        let read = backend.read(path).await.unwrap();

        assert_eq!(read, data);
    }

    #[tokio::test]
    async fn test_exists() {
        let temp = TempDir::new().unwrap();
        let backend = LocalBackend::new(false);
        let path = temp.path().join("marker.txt");
        let path = path.to_str().unwrap();

        assert!(!backend.exists(path).await.unwrap());
        backend.write(path, vec![1]).await.unwrap();
        assert!(backend.exists(path).await.unwrap());
    }

    #[tokio::test]
    async fn test_mkdir_creates_nested() {
        let temp = TempDir::new().unwrap();
        let backend = LocalBackend::new(false);
        let dir = temp.path().join("a/b/c");
        let dir = dir.to_str().unwrap();

        backend.mkdir(dir).await.unwrap();
        assert!(backend.exists(dir).await.unwrap());
    }

    #[tokio::test]
    async fn test_write_missing_parent() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("missing/file.txt");
        let path = path.to_str().unwrap();

        let strict = LocalBackend::new(false);
        assert!(strict.write(path, vec![1]).await.is_err());

        let relaxed = LocalBackend::new(true);
        relaxed.write(path, vec![1]).await.unwrap();
        assert!(relaxed.exists(path).await.unwrap());
    }

    #[test]
    fn test_strip_protocol_forms() {
        let backend = LocalBackend::new(false);
        assert_eq!(backend.strip_protocol("/tmp/b"), "/tmp/b");
        assert_eq!(backend.strip_protocol("file:///tmp/b"), "/tmp/b");
        assert_eq!(backend.strip_protocol("local:///tmp/b"), "/tmp/b");
        assert_eq!(backend.strip_protocol("/tmp/b/"), "/tmp/b");
    }

    #[test]
    fn test_unstrip_protocol() {
        let backend = LocalBackend::new(false);
        assert_eq!(backend.unstrip_protocol("/tmp/b"), "file:///tmp/b");
        assert_eq!(backend.unstrip_protocol("file:///tmp/b"), "file:///tmp/b");
        assert_eq!(backend.unstrip_protocol("local:///tmp/b"), "local:///tmp/b");
    }

    #[test]
    fn test_from_options() {
        let mut options = Map::new();
        options.insert("auto_mkdir".to_string(), Value::Bool(true));
        assert!(LocalBackend::from_options(&options).is_ok());

        let mut bad_type = Map::new();
        bad_type.insert("auto_mkdir".to_string(), Value::from("yes"));
        assert!(LocalBackend::from_options(&bad_type).is_err());

        let mut unknown = Map::new();
        unknown.insert("root".to_string(), Value::from("/tmp"));
        assert!(LocalBackend::from_options(&unknown).is_err());
    }
}
