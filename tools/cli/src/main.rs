//! StrataFS CLI - Command line interface for the source registry.
//!
//! This tool builds the registry from the declarative source list and
//! exposes it for inspection: listing registered sources, showing one
//! source, and watching the configuration for changes.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{info, warn, Level};
use tracing_subscriber::FmtSubscriber;

use stratafs_backend::default_catalog;
use stratafs_registry::{config, key, AsyncProtocols, SourceRegistry};

#[derive(Parser)]
#[command(name = "stratafs")]
#[command(about = "StrataFS - Named filesystem source registry")]
#[command(version)]
struct Cli {
    /// Path to the registry configuration file.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Enable verbose logging.
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create the configuration file if it does not exist.
    Init,

    /// Build the registry and list every registered source.
    List,

    /// Show one source by its declared name.
    Show {
        /// Source name as declared in the configuration.
        name: String,
    },

    /// List known protocols and their async capability.
    Protocols,

    /// Poll the configuration and rebuild the registry on change.
    Watch {
        /// Poll interval in seconds.
        #[arg(short, long, default_value_t = 5)]
        interval: u64,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Setup logging
    let level = if cli.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .compact()
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let config_path = match cli.config {
        Some(path) => path,
        None => config::default_config_path().context("Failed to determine config location")?,
    };

    match cli.command {
        Commands::Init => cmd_init(&config_path).await,

        Commands::List => cmd_list(&config_path).await,

        Commands::Show { name } => cmd_show(&config_path, &name).await,

        Commands::Protocols => cmd_protocols(),

        Commands::Watch { interval } => cmd_watch(&config_path, interval).await,
    }
}

/// Build the registry over the built-in catalog.
async fn build_registry(config_path: &Path) -> Result<SourceRegistry> {
    SourceRegistry::new(config_path.to_path_buf(), default_catalog())
        .await
        .context("Failed to build the source registry")
}

/// Create the configuration file if it does not exist.
async fn cmd_init(config_path: &Path) -> Result<()> {
    if config_path.exists() {
        println!("Configuration already exists: {}", config_path.display());
        return Ok(());
    }

    config::write_placeholder(config_path)
        .await
        .context("Failed to write configuration")?;

    println!("Created configuration: {}", config_path.display());
    println!("Edit it to declare your sources, then run `stratafs list`.");

    Ok(())
}

/// List every registered source.
async fn cmd_list(config_path: &Path) -> Result<()> {
    let registry = build_registry(config_path).await?;

    let entries = registry.entries();
    if entries.is_empty() {
        println!("No sources registered.");
        println!("Configuration: {}", registry.config_path().display());
        return Ok(());
    }

    println!("Registered sources ({}):", entries.len());
    for entry in entries {
        let asynchronous = registry.async_protocols().supports(&entry.protocol);
        let marker = if asynchronous { ", async" } else { "" };
        println!("  {} [{}{}]", entry.name, entry.protocol, marker);
        println!("    key:       {}", entry.key);
        println!("    path:      {}", entry.path);
        println!("    canonical: {}", entry.canonical_path);
    }

    Ok(())
}

/// Show one source in detail.
async fn cmd_show(config_path: &Path, name: &str) -> Result<()> {
    let registry = build_registry(config_path).await?;

    let registry_key = key::encode(name).context("Invalid source name")?;
    let entry = registry
        .lookup(registry_key.as_str())
        .with_context(|| format!("No source named '{}' is registered", name))?;

    let asynchronous = registry.async_protocols().supports(&entry.protocol);

    println!("Source: {}", entry.name);
    println!("  key:       {}", entry.key);
    println!("  protocol:  {} (async: {})", entry.protocol, asynchronous);
    println!("  path:      {}", entry.path);
    println!("  canonical: {}", entry.canonical_path);

    match entry.backend.exists(&entry.path).await {
        Ok(exists) => println!("  reachable: {}", exists),
        Err(e) => println!("  reachable: unknown ({})", e),
    }

    Ok(())
}

/// List known protocols with their async capability.
fn cmd_protocols() -> Result<()> {
    let catalog = default_catalog();
    let capabilities = AsyncProtocols::from_catalog(&catalog);

    println!("Known protocols:");
    for protocol in catalog.protocols() {
        let marker = if capabilities.supports(&protocol) {
            " (async)"
        } else {
            ""
        };
        println!("  {}{}", protocol, marker);
    }

    Ok(())
}

/// Poll the configuration, rebuilding the registry whenever it changes.
async fn cmd_watch(config_path: &Path, interval: u64) -> Result<()> {
    if interval == 0 {
        anyhow::bail!("Interval must be at least 1 second");
    }

    let registry = build_registry(config_path).await?;
    info!(
        "Watching {} every {}s",
        registry.config_path().display(),
        interval
    );

    let mut ticker = tokio::time::interval(Duration::from_secs(interval));
    loop {
        ticker.tick().await;
        match registry.reload_if_changed().await {
            Ok(true) => info!("Rebuilt registry: {} sources", registry.entries().len()),
            Ok(false) => {}
            Err(e) => warn!("Reload failed; keeping previous registry: {}", e),
        }
    }
}
