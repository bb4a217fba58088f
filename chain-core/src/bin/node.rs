//! Chain node binary

use anyhow::Context;
use chain_core::metrics::Metrics;
use chain_core::{spawn_chain_actor, Config, InMemoryStore};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    // Load configuration
    let config = match std::env::args().nth(1) {
        Some(path) => Config::from_file(&path).with_context(|| format!("loading {}", path))?,
        None => Config::from_env().context("reading CHAIN_* environment")?,
    };

    tracing::info!(
        service = %config.service_name,
        version = %config.service_version,
        "Starting chain node"
    );

    if !config.chain.require_signatures {
        tracing::warn!(
            "Unsigned transactions are accepted; every ChainHandle caller is trusted"
        );
    }

    // Restore state
    let store = match &config.snapshot_path {
        Some(path) if path.exists() => InMemoryStore::load_snapshot(path)
            .with_context(|| format!("loading snapshot {}", path.display()))?,
        _ => config
            .genesis
            .build_store(config.chain.clone())
            .context("building genesis state")?,
    };

    let metrics = Metrics::new().context("registering metrics")?;
    let handle = spawn_chain_actor(store, &config.actor, metrics);
    tracing::info!("Chain actor started");

    tokio::signal::ctrl_c().await?;

    tracing::info!("Shutting down chain node");
    handle.shutdown().await?;

    if let Some(path) = &config.snapshot_path {
        handle
            .read(|store| store.save_snapshot(path))
            .with_context(|| format!("writing snapshot {}", path.display()))?;
    }

    Ok(())
}
