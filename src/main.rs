//! File Gateway
//!
//! A public, read-only file index built with Tokio and Axum.
//!
//! # Architecture Overview
//!
//! ```text
//!                        ┌────────────────────────────────────────────┐
//!                        │                FILE GATEWAY                │
//!                        │                                            │
//!     Client Request     │  ┌─────────┐    ┌──────────┐              │
//!     ───────────────────┼─▶│  http   │───▶│   fs     │              │
//!                        │  │ server  │    │ resolve  │              │
//!                        │  └────┬────┘    └────┬─────┘              │
//!                        │       │              │                     │
//!                        │       ▼              ▼                     │
//!                        │  ┌─────────┐    ┌──────────┐              │
//!                        │  │security │    │ listing  │              │
//!                        │  │ tracker │    │ + stream │              │
//!                        │  └─────────┘    └────┬─────┘              │
//!     Client Response    │                      │                     │
//!     ◀──────────────────┼──────────────────────┘                     │
//!                        │                                            │
//!                        │  ┌──────────────────────────────────────┐  │
//!                        │  │        Cross-Cutting Concerns        │  │
//!                        │  │  ┌─────────┐  ┌───────────────────┐  │  │
//!                        │  │  │ config  │  │   observability   │  │  │
//!                        │  │  └─────────┘  └───────────────────┘  │  │
//!                        │  └──────────────────────────────────────┘  │
//!                        └────────────────────────────────────────────┘
//! ```

// Core subsystems
pub mod config;
pub mod fs;
pub mod http;
pub mod observability;
pub mod security;

use std::path::PathBuf;

use clap::Parser;
use tokio::net::TcpListener;

use crate::config::GatewayConfig;
use crate::http::HttpServer;

/// Command-line arguments.
#[derive(Debug, Parser)]
#[command(name = "file-gateway", about = "Public read-only file index")]
struct Args {
    /// Path to a TOML configuration file.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Override the served root directory.
    #[arg(long)]
    root: Option<PathBuf>,

    /// Override the bind address.
    #[arg(long)]
    bind: Option<String>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    // Load configuration, falling back to defaults when no file is given.
    let mut config = match &args.config {
        Some(path) => config::load_config(path)?,
        None => GatewayConfig::default(),
    };
    if let Some(root) = args.root {
        config.serve.root = root.display().to_string();
    }
    if let Some(bind) = args.bind {
        config.listener.bind_address = bind;
    }

    observability::logging::init(&config.observability.log_filter);

    tracing::info!("file-gateway v0.1.0 starting");
    tracing::info!(
        bind_address = %config.listener.bind_address,
        root = %config.serve.root,
        window_secs = config.rate_limit.window_secs,
        "Configuration loaded"
    );

    // Bind TCP listener
    let listener = TcpListener::bind(&config.listener.bind_address).await?;
    let local_addr = listener.local_addr()?;

    tracing::info!(
        address = %local_addr,
        "Listening for connections"
    );

    // Create and run HTTP server
    let server = HttpServer::new(config)?;
    server.run(listener).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
