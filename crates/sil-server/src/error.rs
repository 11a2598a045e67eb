use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use thiserror::Error;

use crate::response::ApiResponse;

/// Server lifecycle errors (startup, configuration).
#[derive(Debug, Error)]
pub enum ServerError {
    #[error("configuration error: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("internal error: {0}")]
    Internal(String),
}

pub type ServerResult<T> = Result<T, ServerError>;

/// Request-level errors, mapped onto the HTTP taxonomy: validation → 400,
/// unauthorized → 401, not-found → 404, everything else → 500.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ApiError {
    #[error("{0}")]
    Validation(String),

    #[error("{0}")]
    Unauthorized(String),

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Internal(String),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::Validation(_) => StatusCode::BAD_REQUEST,
            Self::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if matches!(self, Self::Internal(_)) {
            tracing::error!(%self, "request failed");
        }
        (self.status(), Json(ApiResponse::<()>::failure(self.to_string()))).into_response()
    }
}

impl From<sil_ledger::LedgerError> for ApiError {
    fn from(error: sil_ledger::LedgerError) -> Self {
        use sil_ledger::LedgerError;
        match error {
            LedgerError::NotFound(id) => Self::NotFound(format!("transaction {id} not found")),
            LedgerError::Domain(domain) => domain.into(),
            other => Self::Internal(other.to_string()),
        }
    }
}

impl From<sil_domain::DomainError> for ApiError {
    fn from(error: sil_domain::DomainError) -> Self {
        use sil_domain::DomainError;
        match error {
            DomainError::NotFound { entity, id } => Self::NotFound(format!("{entity} {id} not found")),
            DomainError::DuplicateCertificateNumber(number) => {
                Self::Validation(format!("certificate number already in use: {number}"))
            }
            DomainError::Store(message) => Self::Internal(message),
        }
    }
}

impl From<sil_verify::VerifyError> for ApiError {
    fn from(error: sil_verify::VerifyError) -> Self {
        use sil_verify::VerifyError;
        match error {
            VerifyError::CertificateNotFound(number) => {
                Self::NotFound(format!("certificate not found: {number}"))
            }
            VerifyError::RecordNotFound(id) => {
                Self::NotFound(format!("verification record {id} not found"))
            }
            VerifyError::Domain(domain) => domain.into(),
            other => Self::Internal(other.to_string()),
        }
    }
}

impl From<sil_types::TypeError> for ApiError {
    fn from(error: sil_types::TypeError) -> Self {
        Self::Validation(error.to_string())
    }
}
