//! # Stocky API Server
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Stocky API Server                                │
//! │                                                                         │
//! │  Web client ───► HTTP (5000) ───► axum routes ───► SQLite              │
//! │                                       │                                 │
//! │                                       ▼                                 │
//! │                                 SMTP (optional)                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::net::SocketAddr;

use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use stocky_api::{app, ApiConfig, AppState, Mailer};
use stocky_db::{Database, DbConfig};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new("stocky_api=info,stocky_db=info,tower_http=info")
        }))
        .with_target(true)
        .init();

    info!("Starting Stocky API server...");

    let config = ApiConfig::load()?;
    info!(
        port = config.port,
        database = %config.database_path,
        smtp = config.smtp.host.is_some(),
        "Configuration loaded"
    );
    if config.uses_dev_secrets() {
        warn!("JWT secrets are the built-in development values; set STOCKY_JWT_ACCESS_SECRET and STOCKY_JWT_REFRESH_SECRET");
    }

    let db = Database::new(DbConfig::new(&config.database_path)).await?;
    info!("Database ready");

    let mailer = Mailer::new(&config.smtp)?;
    if !mailer.is_enabled() {
        info!("SMTP not configured; notifications will be skipped");
    }

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    let state = AppState::new(db.clone(), config, mailer);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(%addr, "Listening");

    axum::serve(listener, app(state))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    db.close().await;
    info!("Server shutdown complete");
    Ok(())
}

/// Graceful shutdown signal handler.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!(error = %e, "Failed to listen for Ctrl+C");
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
                error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutdown signal received, starting graceful shutdown...");
}
