use std::sync::Arc;

use sil_domain::{
    CertificateStore, Directory, InMemoryCertificateStore, InMemoryDirectory,
};
use sil_ledger::{
    InMemoryLedger, LedgerRecorder, LedgerStore, LocalConfirmation, RetryCoordinator,
};
use sil_verify::{CertificateVerifier, InMemoryVerificationLog, VerificationLog};

use crate::auth::{AllowAllAuth, AuthProvider, DisabledAuth, StaticTokenAuth};
use crate::config::ServerConfig;

/// Shared application state: every handler works through these trait
/// objects, so backends can be swapped without touching the HTTP layer.
#[derive(Clone)]
pub struct AppState {
    pub ledger: Arc<dyn LedgerStore>,
    pub recorder: Arc<LedgerRecorder>,
    pub retry: Arc<RetryCoordinator>,
    pub certificates: Arc<dyn CertificateStore>,
    pub verifications: Arc<dyn VerificationLog>,
    pub verifier: Arc<CertificateVerifier>,
    pub directory: Arc<dyn Directory>,
    pub auth: Arc<dyn AuthProvider>,
}

impl AppState {
    /// Wire up the full in-memory stack from a config. The directory is
    /// returned alongside so callers can seed it.
    pub fn in_memory(config: &ServerConfig) -> (Self, Arc<InMemoryDirectory>) {
        let directory = Arc::new(InMemoryDirectory::new());
        let ledger: Arc<dyn LedgerStore> = Arc::new(InMemoryLedger::new());
        let certificates: Arc<dyn CertificateStore> = Arc::new(InMemoryCertificateStore::new());
        let verifications: Arc<dyn VerificationLog> = Arc::new(InMemoryVerificationLog::new());

        let recorder = Arc::new(
            LedgerRecorder::new(ledger.clone(), directory.clone()).with_mode(config.confirm_mode),
        );
        let retry = Arc::new(RetryCoordinator::new(
            ledger.clone(),
            Arc::new(LocalConfirmation),
        ));
        let verifier = Arc::new(CertificateVerifier::new(
            certificates.clone(),
            verifications.clone(),
            directory.clone(),
        ));

        let auth: Arc<dyn AuthProvider> = match &config.admin_token {
            Some(token) => Arc::new(StaticTokenAuth::new(token.clone(), config.admin_actor_id)),
            None => Arc::new(DisabledAuth),
        };

        let state = Self {
            ledger,
            recorder,
            retry,
            certificates,
            verifications,
            verifier,
            directory: directory.clone(),
            auth,
        };
        (state, directory)
    }

    /// In-memory stack with an allow-all admin session. For tests.
    pub fn in_memory_open(config: &ServerConfig) -> (Self, Arc<InMemoryDirectory>) {
        let (mut state, directory) = Self::in_memory(config);
        state.auth = Arc::new(AllowAllAuth::new(config.admin_actor_id));
        (state, directory)
    }
}
