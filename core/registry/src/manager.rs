//! Source registry: builds and serves live backend handles.
//!
//! The registry consumes the declarative source list, resolves each
//! source's protocol and async capability, constructs its backend handle,
//! and stores the result under the encoded registry key. Rebuilds replace
//! the whole snapshot at once; readers never observe a half-built map.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, RwLock};

use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::capability::AsyncProtocols;
use crate::config::{self, ConfigFingerprint, RegistryConfig, SourceConfig};
use crate::key;
use crate::resolver;
use stratafs_backend::{default_catalog, BackendCatalog, FsBackend};
use stratafs_common::{RegistryKey, Result};

/// One registered source: the live backend handle plus the identity and
/// path data recorded at build time.
///
/// Entries are immutable once built; a rebuild replaces them wholesale.
pub struct SourceEntry {
    /// Registry key derived from the name.
    pub key: RegistryKey,
    /// Declared source name.
    pub name: String,
    /// Resolved protocol.
    pub protocol: String,
    /// Declared path with the protocol prefix stripped (backend form).
    pub path: String,
    /// Fully qualified form of the declared path.
    pub canonical_path: String,
    /// Live backend handle.
    pub backend: Arc<dyn FsBackend>,
}

/// Immutable view of the registered sources from one build cycle.
#[derive(Default)]
pub struct RegistrySnapshot {
    entries: Vec<Arc<SourceEntry>>,
    by_key: BTreeMap<String, Arc<SourceEntry>>,
}

impl RegistrySnapshot {
    /// Insert an entry; a duplicate key keeps its original position and
    /// takes the later value.
    fn insert(&mut self, entry: Arc<SourceEntry>) {
        let replaced = self
            .by_key
            .insert(entry.key.as_str().to_string(), Arc::clone(&entry));
        match replaced {
            Some(_) => {
                warn!(
                    "Duplicate source name '{}'; the later declaration wins",
                    entry.name
                );
                if let Some(slot) = self.entries.iter_mut().find(|slot| slot.key == entry.key) {
                    *slot = entry;
                }
            }
            None => self.entries.push(entry),
        }
    }

    /// Look up an entry by registry key.
    pub fn get(&self, key: &str) -> Option<Arc<SourceEntry>> {
        self.by_key.get(key).cloned()
    }

    /// First entry with the given protocol, in declaration order.
    pub fn by_protocol(&self, protocol: &str) -> Option<Arc<SourceEntry>> {
        self.entries
            .iter()
            .find(|entry| entry.protocol == protocol)
            .cloned()
    }

    /// All entries in declaration order.
    pub fn entries(&self) -> &[Arc<SourceEntry>] {
        &self.entries
    }

    /// Number of registered entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True when no source is registered.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Configuration as currently held in memory, guarded by the rebuild lock.
struct RegistryState {
    config: RegistryConfig,
    fingerprint: ConfigFingerprint,
}

/// The source registry.
///
/// Readers (`lookup`, `lookup_by_protocol`, `entries`) may run
/// concurrently with a rebuild: they clone the current snapshot handle and
/// see either the pre-rebuild or post-rebuild map in its entirety.
/// Rebuilds themselves are serialized through an async mutex.
pub struct SourceRegistry {
    config_path: PathBuf,
    catalog: BackendCatalog,
    async_protocols: AsyncProtocols,
    state: Mutex<RegistryState>,
    current: RwLock<Arc<RegistrySnapshot>>,
}

impl SourceRegistry {
    /// Create a registry from a config file and backend catalog, and run
    /// the initial build.
    ///
    /// A missing config file gets the placeholder written in its place. A
    /// config that fails to load degrades to the empty source list with a
    /// diagnostic; a later successful reload recovers.
    ///
    /// # Errors
    /// - Fingerprint serialization failure
    pub async fn new(config_path: impl Into<PathBuf>, catalog: BackendCatalog) -> Result<Self> {
        let config_path = config_path.into();

        let config = match config::load(&config_path).await {
            Ok(config) => config,
            Err(e) => {
                warn!(
                    "Failed to load configuration from {}: {}; starting with no sources",
                    config_path.display(),
                    e
                );
                RegistryConfig::default()
            }
        };
        let fingerprint = config.fingerprint()?;
        let async_protocols = AsyncProtocols::from_catalog(&catalog);

        let registry = Self {
            config_path,
            catalog,
            async_protocols,
            state: Mutex::new(RegistryState {
                config,
                fingerprint,
            }),
            current: RwLock::new(Arc::new(RegistrySnapshot::default())),
        };
        registry.initialize().await?;
        Ok(registry)
    }

    /// Create a registry over the built-in catalog and the default config
    /// location.
    ///
    /// # Errors
    /// - User configuration directory cannot be determined
    pub async fn create_default() -> Result<Self> {
        Self::new(config::default_config_path()?, default_catalog()).await
    }

    /// Rebuild the snapshot from the currently held configuration.
    ///
    /// Per-source failures are logged and the source is omitted; the build
    /// always completes with whatever subset constructed successfully.
    pub async fn initialize(&self) -> Result<()> {
        let state = self.state.lock().await;
        let snapshot = self.build(&state.config).await;
        self.publish(snapshot);
        Ok(())
    }

    /// Re-read the on-disk configuration and rebuild if it changed.
    ///
    /// Returns `Ok(false)` without any construction work when the content
    /// fingerprint is unchanged.
    ///
    /// # Errors
    /// - Config file unreadable or unparseable; the previous configuration
    ///   and snapshot stay live
    pub async fn reload_if_changed(&self) -> Result<bool> {
        let mut state = self.state.lock().await;

        let config = config::load(&self.config_path).await?;
        let fingerprint = config.fingerprint()?;
        if fingerprint == state.fingerprint {
            debug!("Configuration unchanged; skipping rebuild");
            return Ok(false);
        }

        info!("Configuration changed; rebuilding source registry");
        let snapshot = self.build(&config).await;
        self.publish(snapshot);
        state.config = config;
        state.fingerprint = fingerprint;
        Ok(true)
    }

    /// Look up an entry by its registry key.
    pub fn lookup(&self, key: &str) -> Option<Arc<SourceEntry>> {
        self.snapshot().get(key)
    }

    /// First entry registered for a protocol, in declaration order.
    pub fn lookup_by_protocol(&self, protocol: &str) -> Option<Arc<SourceEntry>> {
        self.snapshot().by_protocol(protocol)
    }

    /// All entries in declaration order.
    pub fn entries(&self) -> Vec<Arc<SourceEntry>> {
        self.snapshot().entries().to_vec()
    }

    /// The current snapshot handle.
    pub fn snapshot(&self) -> Arc<RegistrySnapshot> {
        Arc::clone(&self.current.read().unwrap())
    }

    /// The config file this registry watches.
    pub fn config_path(&self) -> &Path {
        &self.config_path
    }

    /// The backend catalog.
    pub fn catalog(&self) -> &BackendCatalog {
        &self.catalog
    }

    /// The async capability set built at construction.
    pub fn async_protocols(&self) -> &AsyncProtocols {
        &self.async_protocols
    }

    async fn build(&self, config: &RegistryConfig) -> RegistrySnapshot {
        let mut snapshot = RegistrySnapshot::default();

        for source in &config.sources {
            match self.build_source(source).await {
                Ok(entry) => snapshot.insert(Arc::new(entry)),
                Err(e) => {
                    warn!("Skipping source '{}': {}", source.name, e);
                }
            }
        }

        info!(
            "Registered {} of {} configured sources",
            snapshot.len(),
            config.sources.len()
        );
        snapshot
    }

    async fn build_source(&self, source: &SourceConfig) -> Result<SourceEntry> {
        let key = key::encode(&source.name)?;
        let protocol = resolver::resolve(&source.path, source.protocol.as_deref());
        let asynchronous = self.async_protocols.supports(&protocol);

        let backend = self
            .catalog
            .construct(&protocol, asynchronous, &source.additional_options)?;

        let path = backend.strip_protocol(&source.path);
        // In-memory roots have nothing persistent to pre-exist.
        if protocol == "memory" && !backend.exists(&path).await? {
            backend.mkdir(&path).await?;
        }
        // Qualify the declared path, not the stripped one; a declaration
        // that already carries its prefix keeps that exact form.
        let canonical_path = backend.unstrip_protocol(&source.path);

        debug!(
            "Registered source '{}' as {} ({}, async={})",
            source.name, key, protocol, asynchronous
        );

        Ok(SourceEntry {
            key,
            name: source.name.clone(),
            protocol,
            path,
            canonical_path,
            backend,
        })
    }

    fn publish(&self, snapshot: RegistrySnapshot) {
        *self.current.write().unwrap() = Arc::new(snapshot);
    }
}
