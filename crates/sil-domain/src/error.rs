use thiserror::Error;

/// Errors produced by domain stores and lookups.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DomainError {
    #[error("{entity} {id} not found")]
    NotFound { entity: &'static str, id: u64 },

    #[error("certificate number already in use: {0}")]
    DuplicateCertificateNumber(String),

    #[error("store error: {0}")]
    Store(String),
}

pub type DomainResult<T> = Result<T, DomainError>;
