pub mod api;
pub mod config;
pub mod connection; // Patient → doctor request / accept
pub mod core_state;
pub mod db;
pub mod enrichment; // Upload + OCR + summary gateway
pub mod identity;
pub mod meet;
pub mod models;
pub mod payment;
pub mod submission; // Visit / prescription / test forms

use std::sync::Arc;

use thiserror::Error;
use tracing_subscriber::EnvFilter;

#[derive(Error, Debug)]
pub enum StartupError {
    #[error(transparent)]
    Config(#[from] config::ConfigError),

    #[error("Failed to open store: {0}")]
    Store(#[from] db::DatabaseError),

    #[error(transparent)]
    Server(#[from] api::ServerError),
}

/// Initialize tracing, load configuration, open the store and serve until
/// Ctrl-C or SIGTERM.
pub async fn run() -> Result<(), StartupError> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(config::default_log_filter())),
        )
        .init();

    tracing::info!("{} starting v{}", config::APP_NAME, config::APP_VERSION);

    let config = config::AppConfig::from_env()?;
    for name in config.missing_secrets() {
        tracing::warn!(variable = name, "Secret not configured; dependent calls will fail");
    }

    let store = db::Store::open(&config.db_url)?;
    tracing::info!(db_url = %config.db_url, "Store opened");

    let collaborators = core_state::Collaborators::from_config(&config);
    let core = Arc::new(core_state::CoreState::new(store, collaborators));

    let mut server = api::start_server(core, config.socket_addr()).await?;
    tracing::info!(addr = %server.addr, "Listening");

    shutdown_signal().await;
    server.shutdown();
    server.stopped().await;
    tracing::info!("Shutdown complete");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to listen for Ctrl-C: {e}");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to listen for SIGTERM: {e}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => tracing::info!("Ctrl-C received"),
        _ = terminate => tracing::info!("SIGTERM received"),
    }
}
