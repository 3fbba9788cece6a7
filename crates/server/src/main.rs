//! foliocache server entry point.
//!
//! Registers the offline worker, runs install and activate, then serves
//! host events as MCP tools on stdio transport.
//! Logging goes to stderr to avoid interfering with the JSON-RPC protocol on stdout.

use std::sync::Arc;

use anyhow::Result;
use rmcp::service::serve_server;
use rmcp::transport::io::stdio;
use tracing_subscriber::EnvFilter;

use foliocache_client::{FetchClient, FetchConfig, SessionHost, Worker, WorkerConfig};
use foliocache_core::{AppConfig, CacheDb};

mod handler;
mod tools;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .json()
        .init();

    let config = AppConfig::load()?;
    tracing::info!(cache = %config.cache_name, db = %config.db_path.display(), "Starting foliocache server on stdio transport");

    let storage = Arc::new(CacheDb::open(&config.db_path).await?);
    let network = Arc::new(FetchClient::new(FetchConfig::from_app(&config)?)?);
    let session = SessionHost::new();
    let worker = Worker::register(WorkerConfig::from_app(&config)?, storage, network, Arc::new(session.clone()));

    match worker.install().await {
        Ok(_) => {
            if let Err(e) = worker.activate().await {
                tracing::warn!(error = %e, "worker not activated at startup");
            }
        }
        Err(e) => tracing::error!(error = %e, "worker install failed at startup"),
    }

    let handler = handler::FolioCacheServer::new(worker, session);
    let transport = stdio();
    let server = serve_server(handler, transport).await?;

    server.waiting().await?;

    Ok(())
}
