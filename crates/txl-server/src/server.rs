use std::sync::Arc;

use tokio::net::TcpListener;
use txl_ledger::Ledger;
use txl_store::FileRecordLog;

use crate::config::ServerConfig;
use crate::error::{ServerError, ServerResult};
use crate::handler::AppState;
use crate::router::build_router;

/// TXL ledger server.
///
/// Owns the one ledger instance for the process and hands it to every
/// request through the router state.
pub struct TxlServer {
    config: ServerConfig,
    ledger: Arc<Ledger>,
}

impl TxlServer {
    pub fn new(config: ServerConfig, ledger: Arc<Ledger>) -> Self {
        Self { config, ledger }
    }

    /// Open the file-backed ledger under `config.data_dir`.
    pub fn open(config: ServerConfig) -> ServerResult<Self> {
        let log = FileRecordLog::open_in(&config.data_dir, config.log_config())?;
        let ledger = Ledger::open(Arc::new(log))?;
        Ok(Self::new(config, Arc::new(ledger)))
    }

    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    pub fn ledger(&self) -> &Arc<Ledger> {
        &self.ledger
    }

    /// Build the router (useful for testing).
    pub fn router(&self) -> axum::Router {
        build_router(AppState::new(
            Arc::clone(&self.ledger),
            self.config.storage_timeout(),
        ))
    }

    /// Start serving requests until Ctrl-C.
    pub async fn serve(self) -> ServerResult<()> {
        let app = self.router();
        let listener = TcpListener::bind(&self.config.bind_addr).await?;
        tracing::info!(
            bind = %self.config.bind_addr,
            data_dir = %self.config.data_dir.display(),
            "TXL server listening"
        );
        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown_signal())
            .await
            .map_err(|e| ServerError::Internal(e.to_string()))
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %e, "failed to install Ctrl-C handler");
        std::future::pending::<()>().await;
    }
    tracing::info!("shutdown signal received");
}
