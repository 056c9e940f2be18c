//! storage-admin
//!
//! Admin front end for an S3-compatible object storage cluster.
//!
//! # Architecture Overview
//!
//! ```text
//!                      ┌──────────────────────────────────────────────┐
//!                      │                 STORAGE ADMIN                │
//!   Client Request     │  ┌─────────┐   ┌──────────┐   ┌───────────┐  │
//!  ────────────────────┼─▶│  http   │──▶│  session │──▶│ handlers  │  │
//!                      │  │ server  │   │   gate   │   │           │  │
//!                      │  └─────────┘   └──────────┘   └─────┬─────┘  │
//!                      │                                     │        │
//!                      │        ┌──────────────┬─────────────┤        │
//!                      │        ▼              ▼             ▼        │
//!                      │  ┌───────────┐ ┌────────────┐ ┌──────────┐   │
//!                      │  │ aggregator│ │   cache    │ │  proxy   │   │
//!                      │  │ (buckets) │ │  (config)  │ │  (/v2/*) │   │
//!                      │  └─────┬─────┘ └─────┬──────┘ └────┬─────┘   │
//!                      │        └─────────────┼─────────────┘         │
//!                      │                      ▼                       │
//!                      │               ┌─────────────┐                │
//!                      │               │  upstream   │────────────────┼──▶ Admin API
//!                      │               │   client    │                │
//!                      │               └─────────────┘                │
//!                      └──────────────────────────────────────────────┘
//! ```

use std::path::PathBuf;

use clap::Parser;
use tokio::net::TcpListener;

use storage_admin::config::load_config;
use storage_admin::lifecycle::{wait_for_signal, Shutdown};
use storage_admin::observability::{logging, metrics};
use storage_admin::HttpServer;

#[derive(Parser)]
#[command(name = "storage-admin", version, about = "Admin front end for object storage")]
struct Args {
    /// TOML config file. Environment variables override its values.
    #[arg(short, long, env = "STORAGE_ADMIN_CONFIG")]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();
    let config = load_config(args.config.as_deref())?;

    logging::init_logging(&config.observability)?;
    tracing::info!(version = env!("CARGO_PKG_VERSION"), "storage-admin starting");

    tracing::info!(
        bind_address = %config.server.bind_address(),
        api_prefix = %config.api_prefix(),
        upstream = %config.upstream.base_url,
        max_concurrency = config.aggregator.max_concurrency,
        auth_enabled = config.auth.enabled(),
        "Configuration loaded"
    );

    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse() {
            Ok(addr) => metrics::init_metrics(addr),
            Err(e) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                error = %e,
                "Failed to parse metrics address"
            ),
        }
    }

    let load_on_startup = config.cache.load_on_startup;
    let bind_address = config.server.bind_address();
    let server = HttpServer::new(config)?;

    if load_on_startup {
        // Failure is logged by the cache; handlers retry lazily.
        let _ = server.state().config_cache.reload().await;
    }

    let listener = TcpListener::bind(&bind_address).await?;
    tracing::info!(address = %listener.local_addr()?, "Listening for connections");

    let shutdown = Shutdown::new();
    let receiver = shutdown.subscribe();
    tokio::spawn(async move {
        wait_for_signal().await;
        shutdown.trigger();
    });

    server.run(listener, receiver).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
