use thiserror::Error;

/// Errors from canonicalization and hashing.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum CanonicalError {
    #[error("snapshot serialization error: {0}")]
    Serialization(String),
}
