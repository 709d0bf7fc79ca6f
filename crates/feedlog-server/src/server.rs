use tokio::net::TcpListener;

use crate::config::ServerConfig;
use crate::daemon::MemoryDaemon;
use crate::error::{ServerError, ServerResult};
use crate::router::build_router;

/// Serves a [`MemoryDaemon`] over HTTP.
pub struct FeedServer {
    config: ServerConfig,
    daemon: MemoryDaemon,
}

impl FeedServer {
    pub fn new(config: ServerConfig) -> Self {
        let daemon = MemoryDaemon::new(config.clone());
        Self { config, daemon }
    }

    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    /// The daemon behind this server. Clones share state.
    pub fn daemon(&self) -> &MemoryDaemon {
        &self.daemon
    }

    /// Build the router (useful for testing).
    pub fn router(&self) -> axum::Router {
        build_router(self.daemon.clone())
    }

    /// Start serving requests.
    pub async fn serve(self) -> ServerResult<()> {
        let app = self.router();
        let listener = TcpListener::bind(self.config.bind_addr).await?;
        tracing::info!(addr = %self.config.bind_addr, "feed daemon listening");
        axum::serve(listener, app)
            .await
            .map_err(|e| ServerError::Internal(e.to_string()))
    }
}
