//! SimpleHost - A Minimal HTTP File Relay
//!
//! This is the main entry point for the SimpleHost server.
//! It creates the storage directory, builds the relay and serves it over HTTP.

use anyhow::Context;
use clap::Parser;
use simplehost::http::router;
use simplehost::relay::{FileRelay, RelayConfig, DEFAULT_STORAGE_DIR};
use std::path::PathBuf;
use tokio::net::TcpListener;
use tokio::signal;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

/// Server configuration
#[derive(Debug, Parser)]
#[command(name = "simplehost", version, about = "A minimal HTTP file relay")]
struct Config {
    /// Host to bind to
    #[arg(short = 'H', long, env = "SIMPLEHOST_HOST", default_value = simplehost::DEFAULT_HOST)]
    host: String,

    /// Port to listen on
    #[arg(short, long, env = "SIMPLEHOST_PORT", default_value_t = simplehost::DEFAULT_PORT)]
    port: u16,

    /// Directory uploads are stored in
    #[arg(short, long, env = "SIMPLEHOST_STORAGE_DIR", default_value = DEFAULT_STORAGE_DIR)]
    storage_dir: PathBuf,
}

impl Config {
    /// Returns the bind address as a string
    fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    fn relay_config(&self) -> RelayConfig {
        RelayConfig {
            storage_root: self.storage_dir.clone(),
            ..Default::default()
        }
    }
}

fn print_banner(config: &Config) {
    println!(
        r#"
SimpleHost v{} - Minimal HTTP File Relay
──────────────────────────────────────────
Server started on http://{}
Storing uploads in {}
Links expire after 1 hour.

Use Ctrl+C to shutdown gracefully.
"#,
        simplehost::VERSION,
        config.bind_address(),
        config.storage_dir.display()
    );
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::parse();

    // Set up logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .init();

    tokio::fs::create_dir_all(&config.storage_dir)
        .await
        .with_context(|| {
            format!(
                "failed to create storage directory {}",
                config.storage_dir.display()
            )
        })?;

    let relay = FileRelay::new(config.relay_config());
    info!(storage = %config.storage_dir.display(), "File relay initialized");

    let listener = TcpListener::bind(config.bind_address())
        .await
        .with_context(|| format!("failed to bind {}", config.bind_address()))?;

    print_banner(&config);
    info!("Listening on {}", config.bind_address());

    axum::serve(listener, router(relay))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    info!("Server shutdown complete");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = signal::ctrl_c().await {
        warn!(error = %e, "Failed to install Ctrl+C handler");
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received, stopping server...");
}
