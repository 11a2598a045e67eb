//! HTTP server for the School-records Integrity Ledger (SIL).
//!
//! Serves the `/blockchain` REST surface: transaction listing and retry,
//! certificate CRUD and registration, public certificate verification,
//! verification history, and aggregate stats. Everything except the
//! public verify endpoint sits behind an admin bearer token.

pub mod auth;
pub mod config;
pub mod error;
pub mod handlers;
pub mod response;
pub mod router;
pub mod server;
pub mod state;

pub use auth::{AllowAllAuth, AuthProvider, Credentials, DisabledAuth, Identity, StaticTokenAuth};
pub use config::ServerConfig;
pub use error::{ApiError, ServerError, ServerResult};
pub use response::{ApiResponse, PagedResponse};
pub use router::build_router;
pub use server::SilServer;
pub use state::AppState;
