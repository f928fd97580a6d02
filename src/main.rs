//! St. Paul crime API server
//!
//! Reads configuration from the YAML file named by `CRIME_API_CONFIG`
//! (defaults otherwise), opens the SQLite database and serves until
//! Ctrl+C or SIGTERM.

use anyhow::Result;
use crime_api::prelude::*;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    let config = AppConfig::from_env()?;

    // RUST_LOG wins over the configured filter
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.logging.filter))?;
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let store = SqliteStore::connect(&config.database).await?;

    ServerBuilder::new()
        .with_store(store.clone())
        .with_config(&config.server)
        .serve(&config.server.addr())
        .await?;

    store.close().await;
    Ok(())
}
