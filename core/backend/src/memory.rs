//! In-memory storage backend.

use std::collections::BTreeMap;
use std::sync::{Arc, RwLock};

use async_trait::async_trait;
use serde_json::{Map, Value};

use crate::backend::FsBackend;
use crate::catalog::reject_unknown_options;
use stratafs_common::{Error, Result};

/// In-memory pseudo-filesystem node.
#[derive(Debug, Clone)]
enum Node {
    File(Vec<u8>),
    Dir,
}

/// In-memory storage backend.
///
/// Paths normalize to a rooted form with a leading `/`. Contents live as
/// long as the handle; a freshly constructed handle starts empty apart
/// from the root directory.
pub struct MemoryBackend {
    nodes: Arc<RwLock<BTreeMap<String, Node>>>,
}

impl MemoryBackend {
    /// Create a new empty memory backend.
    pub fn new() -> Self {
        let mut nodes = BTreeMap::new();
        nodes.insert("/".to_string(), Node::Dir);
        Self {
            nodes: Arc::new(RwLock::new(nodes)),
        }
    }

    /// Construct from declaration options.
    ///
    /// # Errors
    /// - The memory backend accepts no options
    pub fn from_options(options: &Map<String, Value>) -> Result<Self> {
        reject_unknown_options("memory", options, &[])?;
        Ok(Self::new())
    }

    /// Parent of a normalized path; the root has none.
    fn parent_of(path: &str) -> Option<String> {
        if path == "/" {
            return None;
        }
        match path.rfind('/') {
            Some(0) => Some("/".to_string()),
            Some(idx) => Some(path[..idx].to_string()),
            None => None,
        }
    }
}

impl Default for MemoryBackend {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl FsBackend for MemoryBackend {
    fn protocol(&self) -> &str {
        "memory"
    }

    async fn exists(&self, path: &str) -> Result<bool> {
        let path = self.strip_protocol(path);
        Ok(self.nodes.read().unwrap().contains_key(&path))
    }

    async fn mkdir(&self, path: &str) -> Result<()> {
        let path = self.strip_protocol(path);
        let mut nodes = self.nodes.write().unwrap();

        // Walk up until a known node is hit, collecting missing ancestors.
        let mut missing = Vec::new();
        let mut cursor = path;
        loop {
            match nodes.get(&cursor) {
                Some(Node::Dir) => break,
                Some(Node::File(_)) => {
                    return Err(Error::InvalidInput(format!(
                        "Not a directory: {}",
                        cursor
                    )));
                }
                None => {
                    missing.push(cursor.clone());
                    match Self::parent_of(&cursor) {
                        Some(parent) => cursor = parent,
                        None => break,
                    }
                }
            }
        }
        for dir in missing {
            nodes.insert(dir, Node::Dir);
        }
        Ok(())
    }

    async fn read(&self, path: &str) -> Result<Vec<u8>> {
        let path = self.strip_protocol(path);
        let nodes = self.nodes.read().unwrap();

        match nodes.get(&path) {
            Some(Node::File(data)) => Ok(data.clone()),
            Some(Node::Dir) => Err(Error::InvalidInput(format!(
                "Cannot read directory: {}",
                path
            ))),
            None => Err(Error::NotFound(format!("File not found: {}", path))),
        }
    }

    async fn write(&self, path: &str, data: Vec<u8>) -> Result<()> {
        let path = self.strip_protocol(path);
        let mut nodes = self.nodes.write().unwrap();

        if let Some(Node::Dir) = nodes.get(&path) {
            return Err(Error::InvalidInput(format!("Is a directory: {}", path)));
        }
        if let Some(parent) = Self::parent_of(&path) {
            match nodes.get(&parent) {
                Some(Node::Dir) => {}
                Some(Node::File(_)) => {
                    return Err(Error::InvalidInput("Parent is a file".to_string()));
                }
                None => {
                    return Err(Error::NotFound("Parent directory not found".to_string()));
                }
            }
        }

        nodes.insert(path, Node::File(data));
        Ok(())
    }

    /// Memory paths are always rooted: `memory://mytests` and `/mytests`
    /// both normalize to `/mytests`.
    fn strip_protocol(&self, path: &str) -> String {
        let path = path.strip_prefix("memory://").unwrap_or(path);
        let trimmed = path.trim_start_matches('/').trim_end_matches('/');
        format!("/{}", trimmed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_write_read() {
        let backend = MemoryBackend::new();
        let data = b"Hello, Memory!".to_vec();

        backend.write("/test.txt", data.clone()).await.unwrap();
        let read = backend.read("/test.txt").await.unwrap();

        assert_eq!(read, data);
    }

    #[tokio::test]
    async fn test_exists() {
        let backend = MemoryBackend::new();

        assert!(!backend.exists("/test.txt").await.unwrap());
        backend.write("/test.txt", vec![1, 2, 3]).await.unwrap();
        assert!(backend.exists("/test.txt").await.unwrap());
    }

    #[tokio::test]
    async fn test_exists_accepts_prefixed_path() {
        let backend = MemoryBackend::new();
        backend.mkdir("memory://mytests").await.unwrap();

        assert!(backend.exists("/mytests").await.unwrap());
        assert!(backend.exists("memory://mytests").await.unwrap());
    }

    #[tokio::test]
    async fn test_mkdir_is_idempotent() {
        let backend = MemoryBackend::new();

        backend.mkdir("/dir").await.unwrap();
        backend.mkdir("/dir").await.unwrap();
        assert!(backend.exists("/dir").await.unwrap());
    }

    #[tokio::test]
    async fn test_mkdir_creates_parents() {
        let backend = MemoryBackend::new();

        backend.mkdir("/a/b/c").await.unwrap();
        assert!(backend.exists("/a").await.unwrap());
        assert!(backend.exists("/a/b").await.unwrap());
        assert!(backend.exists("/a/b/c").await.unwrap());
    }

    #[tokio::test]
    async fn test_mkdir_over_file_fails() {
        let backend = MemoryBackend::new();

        backend.write("/taken", vec![0]).await.unwrap();
        assert!(backend.mkdir("/taken").await.is_err());
    }

    #[tokio::test]
    async fn test_write_missing_parent_fails() {
        let backend = MemoryBackend::new();

        let result = backend.write("/nodir/file.txt", vec![1]).await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_read_missing_fails() {
        let backend = MemoryBackend::new();
        assert!(backend.read("/ghost").await.is_err());
    }

    #[test]
    fn test_strip_protocol_forms() {
        let backend = MemoryBackend::new();
        assert_eq!(backend.strip_protocol("memory://mytests"), "/mytests");
        assert_eq!(backend.strip_protocol("/testing"), "/testing");
        assert_eq!(backend.strip_protocol("testing/"), "/testing");
        assert_eq!(backend.strip_protocol("memory://"), "/");
    }

    #[test]
    fn test_unstrip_protocol_forms() {
        let backend = MemoryBackend::new();
        assert_eq!(backend.unstrip_protocol("/testing"), "memory:///testing");
        assert_eq!(
            backend.unstrip_protocol("memory://mytests"),
            "memory://mytests"
        );
    }

    #[test]
    fn test_from_options_rejects_unknown() {
        let mut options = Map::new();
        options.insert("size".to_string(), Value::from(10));
        assert!(MemoryBackend::from_options(&options).is_err());
    }
}
