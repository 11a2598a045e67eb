use sil_types::TxId;
use thiserror::Error;

/// Errors produced by ledger operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LedgerError {
    #[error("transaction {0} not found")]
    NotFound(TxId),

    #[error("store error: {0}")]
    Store(String),

    #[error("canonicalization error: {0}")]
    Canonical(#[from] sil_canonical::CanonicalError),

    #[error("domain error: {0}")]
    Domain(#[from] sil_domain::DomainError),

    #[error("confirmation backend error: {0}")]
    Confirmation(String),
}
