//! Protocol resolution for source declarations.
//!
//! A declared path may carry its protocol inline (`s3://bucket/data`) or
//! leave it implicit (`/tmp/data`). Resolution is total: any string that
//! does not parse as a scheme-prefixed URL is treated as a local path.

use url::Url;

/// Protocol assumed when a path carries no scheme.
pub const DEFAULT_PROTOCOL: &str = "file";

/// Resolve the protocol for a declared path.
///
/// A non-empty explicit protocol always wins, verbatim. Otherwise the path
/// is inspected for a `scheme://` prefix. Single-letter schemes are Windows
/// drive letters (`C:\data`), not protocols. Never fails: anything
/// unparseable resolves to [`DEFAULT_PROTOCOL`].
pub fn resolve(path: &str, explicit: Option<&str>) -> String {
    if let Some(protocol) = explicit {
        if !protocol.is_empty() {
            return protocol.to_string();
        }
    }

    match Url::parse(path) {
        Ok(url) => {
            let scheme = url.scheme();
            // `Url` accepts `mailto:`-style schemes; only a full
            // `scheme://` prefix names a storage protocol.
            if scheme.len() > 1 && path[scheme.len()..].starts_with("://") {
                scheme.to_string()
            } else {
                DEFAULT_PROTOCOL.to_string()
            }
        }
        Err(_) => DEFAULT_PROTOCOL.to_string(),
    }
}
