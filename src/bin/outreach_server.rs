//! # Outreach Server
//!
//! Standalone HTTP server for the outreach dispatch core.
//!
//! ## Usage
//!
//! ```bash
//! OUTREACH_DATABASE__URL=postgresql://localhost/outreach \
//! OUTREACH_FORWARDING__WEBHOOK_URL=https://sender.example/batches \
//! cargo run --bin outreach-server
//! ```

use anyhow::Context;
use std::sync::Arc;
use std::time::Duration;
use tokio::signal;
use tracing::{error, info, warn};

use outreach_dispatch::config::ConfigManager;
use outreach_dispatch::database::{DatabaseConnection, DatabaseMigrations, PgOutreachStore};
use outreach_dispatch::forwarding::{sender_from_config, ForwardQueue};
use outreach_dispatch::logging;
use outreach_dispatch::outreach::OutreachServices;
use outreach_dispatch::web::{create_app, AppState};

const WORKER_DRAIN_TIMEOUT: Duration = Duration::from_secs(30);

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    logging::init_structured_logging();

    info!(
        version = env!("CARGO_PKG_VERSION"),
        build = if cfg!(debug_assertions) { "debug" } else { "release" },
        "Starting outreach server"
    );

    let config = ConfigManager::load().context("failed to load configuration")?;

    let connection = DatabaseConnection::connect(&config.database)
        .await
        .context("failed to connect to database")?;
    if config.database.run_migrations {
        DatabaseMigrations::run_all(connection.pool())
            .await
            .context("failed to run migrations")?;
    }
    let store = Arc::new(PgOutreachStore::new(connection.pool().clone()));

    let sender = sender_from_config(&config.forwarding).context("failed to build forward sender")?;
    let (forward_queue, forward_worker) = ForwardQueue::spawn(sender, &config.forwarding);

    let services = OutreachServices::new(store, forward_queue, &config.dispatch);
    let app = create_app(AppState::new(services, config.web.clone()));

    let listener = tokio::net::TcpListener::bind(&config.web.bind_address)
        .await
        .with_context(|| format!("failed to bind {}", config.web.bind_address))?;
    info!(bind_address = %config.web.bind_address, "Outreach server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    // The router owned the last queue handles; the worker drains what is left and stops
    info!("HTTP server stopped, draining forward queue");
    match tokio::time::timeout(WORKER_DRAIN_TIMEOUT, forward_worker).await {
        Ok(Ok(())) => info!("Forward queue drained"),
        Ok(Err(e)) => error!(error = %e, "Forward worker terminated abnormally"),
        Err(_) => warn!("Timed out draining forward queue"),
    }

    connection.close().await;
    info!("Outreach server shutdown complete");
    Ok(())
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM)
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!(error = %e, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("Received Ctrl+C"),
        _ = terminate => info!("Received SIGTERM"),
    }
}
