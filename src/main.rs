//! cloud-fanout-gateway server entry point.
//!
//! Builds every cloud client, then serves the HTTP routes until Ctrl-C or
//! SIGTERM. Any construction or bind failure exits non-zero.

use anyhow::Context;
use tracing_subscriber::EnvFilter;

use cloud_fanout_gateway::api;
use cloud_fanout_gateway::app_state::{AppState, ResourceTargets};
use cloud_fanout_gateway::clients::ClientRegistry;
use cloud_fanout_gateway::config::{GatewayConfig, LogFormat};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load configuration
    let config = GatewayConfig::from_env()?;

    // Initialize tracing
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    match config.log_format {
        LogFormat::Json => tracing_subscriber::fmt()
            .with_env_filter(filter)
            .json()
            .init(),
        LogFormat::Text => tracing_subscriber::fmt().with_env_filter(filter).init(),
    }

    // Build clients before anything can serve a request
    let clients = ClientRegistry::connect(&config)
        .await
        .context("cannot start cloud clients")?;

    let state = AppState::new(clients, ResourceTargets::from_config(&config));

    // Start server
    if config.port_defaulted {
        tracing::info!(port = config.port, "Defaulting to port {}", config.port);
    }
    let addr = config.listen_addr();
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("cannot listen on {addr}"))?;
    tracing::info!(%addr, "Listening on port {}", config.port);

    api::serve(listener, state, shutdown_signal()).await?;
    Ok(())
}

/// Resolves on Ctrl-C or, on Unix, SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "cannot listen for ctrl-c");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "cannot listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }
    tracing::info!("shutting down");
}
