//! HTTP storage backend (read-only).

use std::time::Duration;

use async_trait::async_trait;
use serde_json::{Map, Value};
use tracing::debug;

use crate::backend::FsBackend;
use crate::catalog::reject_unknown_options;
use stratafs_common::{Error, Result};

const DEFAULT_USER_AGENT: &str = "stratafs/0.1";

/// Read-only backend over HTTP(S).
///
/// Declared paths are full URLs and stay full URLs: there is no
/// protocol-relative form to strip them down to.
pub struct HttpBackend {
    scheme: String,
    client: reqwest::Client,
}

impl HttpBackend {
    /// Construct from declaration options.
    ///
    /// # Errors
    /// - Accepts `user_agent: string` and `timeout_secs: integer`
    pub fn from_options(scheme: &str, options: &Map<String, Value>) -> Result<Self> {
        reject_unknown_options(scheme, options, &["user_agent", "timeout_secs"])?;

        let user_agent = match options.get("user_agent") {
            None => DEFAULT_USER_AGENT.to_string(),
            Some(Value::String(agent)) => agent.clone(),
            Some(other) => {
                return Err(Error::Construction(format!(
                    "{} backend option 'user_agent' must be a string, got {}",
                    scheme, other
                )));
            }
        };

        let mut builder = reqwest::Client::builder().user_agent(user_agent);
        if let Some(value) = options.get("timeout_secs") {
            match value.as_u64() {
                Some(secs) => builder = builder.timeout(Duration::from_secs(secs)),
                None => {
                    return Err(Error::Construction(format!(
                        "{} backend option 'timeout_secs' must be a non-negative integer, got {}",
                        scheme, value
                    )));
                }
            }
        }

        let client = builder
            .build()
            .map_err(|e| Error::Construction(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            scheme: scheme.to_string(),
            client,
        })
    }
}

#[async_trait]
impl FsBackend for HttpBackend {
    fn protocol(&self) -> &str {
        &self.scheme
    }

    async fn exists(&self, path: &str) -> Result<bool> {
        match self.client.head(path).send().await {
            Ok(response) => Ok(response.status().is_success()),
            Err(e) => {
                debug!("HEAD {} failed: {}", path, e);
                Ok(false)
            }
        }
    }

    async fn mkdir(&self, _path: &str) -> Result<()> {
        Err(Error::Unsupported(
            "HTTP backend does not support mkdir".to_string(),
        ))
    }

    async fn read(&self, path: &str) -> Result<Vec<u8>> {
        let response = self
            .client
            .get(path)
            .send()
            .await
            .map_err(|e| Error::Network(format!("GET {} failed: {}", path, e)))?;

        if !response.status().is_success() {
            return Err(Error::NotFound(format!(
                "GET {} returned {}",
                path,
                response.status()
            )));
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| Error::Network(format!("Failed to read body of {}: {}", path, e)))?;
        Ok(body.to_vec())
    }

    async fn write(&self, _path: &str, _data: Vec<u8>) -> Result<()> {
        Err(Error::Unsupported(
            "HTTP backend does not support write".to_string(),
        ))
    }

    /// URLs are kept whole.
    fn strip_protocol(&self, path: &str) -> String {
        path.to_string()
    }

    fn unstrip_protocol(&self, path: &str) -> String {
        if path.starts_with("http://") || path.starts_with("https://") {
            path.to_string()
        } else {
            format!("{}://{}", self.scheme, path)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_options_defaults() {
        let backend = HttpBackend::from_options("https", &Map::new()).unwrap();
        assert_eq!(backend.protocol(), "https");
    }

    #[test]
    fn test_from_options_validation() {
        let mut options = Map::new();
        options.insert("user_agent".to_string(), Value::from("custom-agent/1.0"));
        options.insert("timeout_secs".to_string(), Value::from(30));
        assert!(HttpBackend::from_options("http", &options).is_ok());

        let mut bad_timeout = Map::new();
        bad_timeout.insert("timeout_secs".to_string(), Value::from(-5));
        assert!(HttpBackend::from_options("http", &bad_timeout).is_err());

        let mut unknown = Map::new();
        unknown.insert("proxy".to_string(), Value::from("localhost"));
        assert!(HttpBackend::from_options("http", &unknown).is_err());
    }

    #[test]
    fn test_strip_protocol_keeps_url() {
        let backend = HttpBackend::from_options("https", &Map::new()).unwrap();
        assert_eq!(
            backend.strip_protocol("https://example.com/data.json"),
            "https://example.com/data.json"
        );
    }

    #[test]
    fn test_unstrip_protocol() {
        let backend = HttpBackend::from_options("https", &Map::new()).unwrap();
        assert_eq!(
            backend.unstrip_protocol("https://example.com/d"),
            "https://example.com/d"
        );
        assert_eq!(
            backend.unstrip_protocol("http://example.com/d"),
            "http://example.com/d"
        );
        assert_eq!(
            backend.unstrip_protocol("example.com/d"),
            "https://example.com/d"
        );
    }
}
