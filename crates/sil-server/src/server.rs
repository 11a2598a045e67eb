use tokio::net::TcpListener;

use crate::config::ServerConfig;
use crate::error::{ServerError, ServerResult};
use crate::router::build_router;
use crate::state::AppState;

/// SIL HTTP server.
pub struct SilServer {
    config: ServerConfig,
    state: AppState,
}

impl SilServer {
    pub fn new(config: ServerConfig, state: AppState) -> Self {
        Self { config, state }
    }

    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    /// Build the router (useful for testing).
    pub fn router(&self) -> axum::Router {
        build_router(self.state.clone())
    }

    /// Start serving requests.
    pub async fn serve(self) -> ServerResult<()> {
        let app = build_router(self.state);
        let listener = TcpListener::bind(&self.config.bind_addr).await?;
        tracing::info!("SIL server listening on {}", self.config.bind_addr);
        axum::serve(listener, app)
            .await
            .map_err(|e| ServerError::Internal(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn server_construction() {
        let config = ServerConfig::default();
        let (state, _directory) = AppState::in_memory(&config);
        let server = SilServer::new(config, state);
        assert_eq!(
            server.config().bind_addr,
            "127.0.0.1:8642".parse().unwrap()
        );
    }

    #[test]
    fn router_builds() {
        let config = ServerConfig::default();
        let (state, _directory) = AppState::in_memory(&config);
        let server = SilServer::new(config, state);
        let _router = server.router();
    }
}
