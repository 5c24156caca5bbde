//! Registry configuration file handling.
//!
//! The source list lives in a YAML file. A missing file is not an error:
//! a commented-out placeholder is written so the format is discoverable.
//! Change detection uses a content fingerprint over the canonical
//! serialization, so rebuilds only happen when the file actually changed.

use std::fmt;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tokio::fs;
use tracing::info;

use stratafs_common::{Error, Result};

/// One named source declaration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceConfig {
    /// Human-readable source name, unique within the config by convention.
    pub name: String,
    /// Declared path; may embed a protocol scheme (`memory://scratch`).
    pub path: String,
    /// Explicit protocol override; inferred from `path` when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub protocol: Option<String>,
    /// Backend construction parameters, opaque to the registry.
    #[serde(default, skip_serializing_if = "Map::is_empty")]
    pub additional_options: Map<String, Value>,
}

/// The full declarative source list.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RegistryConfig {
    #[serde(default)]
    pub sources: Vec<SourceConfig>,
}

impl RegistryConfig {
    /// Parse a YAML document.
    ///
    /// A null or comment-only document is an empty configuration, not an
    /// error.
    ///
    /// # Errors
    /// - YAML does not match the schema
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        let parsed: Option<Self> =
            serde_yaml::from_str(yaml).map_err(|e| Error::ConfigParse(e.to_string()))?;
        Ok(parsed.unwrap_or_default())
    }

    /// Serialize to canonical YAML.
    ///
    /// Canonical because struct field order is fixed by declaration and
    /// source order is the declaration order.
    pub fn to_yaml(&self) -> Result<String> {
        serde_yaml::to_string(self).map_err(|e| Error::Serialization(e.to_string()))
    }

    /// Compute the content fingerprint for change detection.
    ///
    /// Equality-only use; not a security property.
    pub fn fingerprint(&self) -> Result<ConfigFingerprint> {
        use blake2::digest::consts::U16;
        use blake2::{Blake2b, Digest};

        let yaml = self.to_yaml()?;
        let mut hasher = Blake2b::<U16>::new();
        hasher.update(yaml.as_bytes());
        let digest = hasher.finalize();

        let mut bytes = [0u8; 16];
        bytes.copy_from_slice(&digest);
        Ok(ConfigFingerprint(bytes))
    }
}

/// 128-bit configuration content fingerprint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConfigFingerprint([u8; 16]);

impl fmt::Display for ConfigFingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for byte in &self.0 {
            write!(f, "{:02x}", byte)?;
        }
        Ok(())
    }
}

/// Configuration file name inside the application config directory.
pub const CONFIG_FILENAME: &str = "stratafs.yaml";

/// Application directory name under the user config directory.
pub const CONFIG_DIRNAME: &str = "stratafs";

const PLACEHOLDER_HEADER: &str = "\
# StrataFS source configuration.
#
# Declare named storage sources under `sources:`. Each source needs a
# `name` and a `path`; `protocol` overrides scheme inference and
# `additional_options` is passed through to the backend constructor.
# Uncomment and edit the example below to get started.";

/// Default config location: `<user config dir>/stratafs/stratafs.yaml`.
///
/// # Errors
/// - User configuration directory cannot be determined
pub fn default_config_path() -> Result<PathBuf> {
    let base = dirs::config_dir()
        .ok_or_else(|| Error::NotFound("User configuration directory".to_string()))?;
    Ok(base.join(CONFIG_DIRNAME).join(CONFIG_FILENAME))
}

/// Render the placeholder file: documentation header plus the example
/// config with every line commented out.
pub fn placeholder_content() -> Result<String> {
    let example = RegistryConfig {
        sources: vec![
            SourceConfig {
                name: "scratch".to_string(),
                path: "memory://scratch".to_string(),
                protocol: None,
                additional_options: Map::new(),
            },
            SourceConfig {
                name: "project".to_string(),
                path: "/project".to_string(),
                protocol: Some("memory".to_string()),
                additional_options: Map::new(),
            },
        ],
    };

    let yaml = example.to_yaml()?;
    let commented: String = yaml.lines().map(|line| format!("# {}\n", line)).collect();
    Ok(format!("{}\n\n{}", PLACEHOLDER_HEADER, commented))
}

/// Write the placeholder config, creating parent directories as needed.
pub async fn write_placeholder(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).await?;
    }
    fs::write(path, placeholder_content()?).await?;
    info!("Wrote placeholder configuration to {}", path.display());
    Ok(())
}

/// Load the configuration, synthesizing the placeholder when absent.
///
/// # Errors
/// - File exists but cannot be read
/// - File content does not parse
pub async fn load(path: &Path) -> Result<RegistryConfig> {
    if !path.exists() {
        info!(
            "No configuration at {}; creating placeholder",
            path.display()
        );
        write_placeholder(path).await?;
    }

    let raw = fs::read_to_string(path).await?;
    RegistryConfig::from_yaml(&raw)
}
