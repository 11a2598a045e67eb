use thiserror::Error;

/// Errors produced by verification operations.
///
/// A fingerprint mismatch is NOT an error; it is a successful
/// verification with a negative answer.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum VerifyError {
    #[error("certificate not found: {0}")]
    CertificateNotFound(String),

    #[error("verification record {0} not found")]
    RecordNotFound(u64),

    #[error("canonicalization error: {0}")]
    Canonical(#[from] sil_canonical::CanonicalError),

    #[error("domain error: {0}")]
    Domain(#[from] sil_domain::DomainError),

    #[error("store error: {0}")]
    Store(String),
}

pub type VerifyResult<T> = Result<T, VerifyError>;
