use std::net::SocketAddr;
use std::path::Path;

use serde::{Deserialize, Serialize};

use sil_ledger::ConfirmMode;

use crate::error::{ServerError, ServerResult};

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub bind_addr: SocketAddr,
    /// Bearer token for the admin surface. `None` locks the admin routes
    /// entirely; the public verify endpoint is unaffected.
    pub admin_token: Option<String>,
    /// Actor attributed to ledger writes made through the admin token.
    pub admin_actor_id: i64,
    pub confirm_mode: ConfirmMode,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: "127.0.0.1:8642".parse().unwrap(),
            admin_token: None,
            admin_actor_id: 1,
            confirm_mode: ConfirmMode::Sync,
        }
    }
}

impl ServerConfig {
    pub fn from_toml_str(raw: &str) -> ServerResult<Self> {
        toml::from_str(raw).map_err(|e| ServerError::Config(e.to_string()))
    }

    pub fn load(path: impl AsRef<Path>) -> ServerResult<Self> {
        let raw = std::fs::read_to_string(path)?;
        Self::from_toml_str(&raw)
    }
}
