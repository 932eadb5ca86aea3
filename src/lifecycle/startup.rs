//! Startup orchestration.
//!
//! # Responsibilities
//! - Compile the route table
//! - Start the metrics endpoint when enabled
//! - Bind the listener and serve until shutdown
//!
//! # Design Decisions
//! - Fail fast: any startup error is fatal
//! - Listener binds last (traffic only when routes are ready)

use std::net::SocketAddr;
use thiserror::Error;
use tokio::net::TcpListener;

use crate::config::ServerConfig;
use crate::http::HttpServer;
use crate::lifecycle::Shutdown;
use crate::observability::metrics;
use crate::routing::{ActivationError, Router};

#[derive(Debug, Error)]
pub enum StartupError {
    #[error("route table rejected: {0}")]
    Activation(#[from] ActivationError),

    #[error("failed to bind {address}: {source}")]
    Bind {
        address: String,
        #[source]
        source: std::io::Error,
    },

    #[error("server error: {0}")]
    Io(#[from] std::io::Error),
}

/// Compile `router`, bind the configured address and serve until `shutdown` fires.
pub async fn serve(
    router: &Router,
    config: ServerConfig,
    shutdown: Shutdown,
) -> Result<(), StartupError> {
    tracing::info!(routes = router.len(), "Setting up routes");
    let server = HttpServer::new(router, config.clone())?;

    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse::<SocketAddr>() {
            Ok(addr) => metrics::init_metrics(addr),
            Err(_) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            ),
        }
    }

    let address = config.listener.bind_address;
    let listener = TcpListener::bind(&address)
        .await
        .map_err(|source| StartupError::Bind {
            address: address.clone(),
            source,
        })?;

    tracing::info!(address = %address, "Listening for connections");
    server.run(listener, shutdown.subscribe()).await?;
    Ok(())
}
