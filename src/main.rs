//! flecha to-do demo server.
//!
//! Serves an in-memory to-do list:
//!
//! ```text
//! POST   /todos            { "title": ... }
//! GET    /todos
//! GET    /todos/:todoId
//! PUT    /todos/:todoId    { "title"?: ..., "completed"?: ... }
//! DELETE /todos/:todoId
//! POST   /empty-body
//! ```

mod todo;

use clap::Parser;
use std::path::PathBuf;

use flecha::config::{loader, ServerConfig};
use flecha::lifecycle::{signals, startup, Shutdown};
use flecha::observability::logging;

use crate::todo::{routes, store::TodoStore};

#[derive(Parser)]
#[command(name = "flecha-todo")]
#[command(about = "To-do list demo for the flecha routing layer", long_about = None)]
struct Cli {
    /// Path to a TOML configuration file.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Listener port; overrides the config file and the PORT env var.
    #[arg(short, long)]
    port: Option<u16>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => loader::load_config(path)?,
        None => ServerConfig::default(),
    };
    loader::apply_env_overrides(&mut config)?;
    if let Some(port) = cli.port {
        loader::apply_port_override(&mut config, Some(&port.to_string()))?;
    }

    logging::init(&config.observability);
    tracing::info!("flecha-todo v{} starting", env!("CARGO_PKG_VERSION"));

    tracing::info!(
        bind_address = %config.listener.bind_address,
        body_limit_bytes = config.limits.body_limit_bytes,
        request_timeout_secs = ?config.timeouts.request_secs,
        "Configuration loaded"
    );

    let router = routes::router(TodoStore::seeded())?;

    let shutdown = Shutdown::new();
    signals::forward_to(shutdown.clone());
    startup::serve(&router, config, shutdown).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
