use axum::extract::{Path, Query, State};
use axum::Json;
use chrono::NaiveDate;
use serde::Deserialize;

use sil_types::{page, PageRequest, SortOrder};
use sil_verify::{VerificationFilter, VerificationOutcome, VerificationRecord, VerificationSortKey};

use crate::error::ApiError;
use crate::handlers::non_empty;
use crate::response::{ApiResponse, PagedResponse};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct VerifyRequest {
    pub certificate_number: String,
    pub verified_by_name: Option<String>,
}

/// `POST /blockchain/verify`, the public certificate check. No
/// authentication: third parties holding only a certificate number are
/// the intended callers.
pub async fn verify_certificate(
    State(state): State<AppState>,
    Json(request): Json<VerifyRequest>,
) -> Result<Json<ApiResponse<VerificationOutcome>>, ApiError> {
    let number = request.certificate_number.trim();
    if number.is_empty() {
        return Err(ApiError::Validation("certificate_number is required".into()));
    }
    let verified_by = request
        .verified_by_name
        .as_deref()
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .unwrap_or("Anonymous");

    let outcome = state.verifier.verify_certificate(number, verified_by)?;
    let message = if outcome.matched {
        "Certificate data matches its fingerprint"
    } else {
        "Certificate data does not match its fingerprint"
    };
    Ok(Json(ApiResponse::ok_with_message(outcome, message)))
}

#[derive(Debug, Default, Deserialize)]
pub struct VerificationHistoryQuery {
    pub search: Option<String>,
    pub certificate_id: Option<i64>,
    pub verified_by_name: Option<String>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub sort_by: Option<String>,
    pub sort_order: Option<String>,
    pub page: Option<u32>,
    pub per_page: Option<u32>,
}

impl VerificationHistoryQuery {
    fn into_filter(self) -> Result<VerificationFilter, ApiError> {
        let sort_by = non_empty(self.sort_by)
            .map(|s| s.parse::<VerificationSortKey>())
            .transpose()?
            .unwrap_or_default();
        let sort_order = non_empty(self.sort_order)
            .map(|s| s.parse::<SortOrder>())
            .transpose()?
            .unwrap_or_default();

        Ok(VerificationFilter {
            search: non_empty(self.search),
            certificate_id: self.certificate_id,
            verified_by_name: non_empty(self.verified_by_name),
            start_date: self.start_date,
            end_date: self.end_date,
            sort_by,
            sort_order,
            page: PageRequest::new(
                self.page.unwrap_or(1),
                self.per_page.unwrap_or(page::DEFAULT_PER_PAGE),
            ),
        })
    }
}

/// `GET /blockchain/verifications`
pub async fn list_verifications(
    State(state): State<AppState>,
    Query(query): Query<VerificationHistoryQuery>,
) -> Result<Json<PagedResponse<VerificationRecord>>, ApiError> {
    let filter = query.into_filter()?;
    let page = state.verifications.list(&filter)?;
    Ok(Json(PagedResponse::from_page(page)))
}

/// `DELETE /blockchain/verifications/{id}`
pub async fn delete_verification(
    State(state): State<AppState>,
    Path(id): Path<u64>,
) -> Result<Json<ApiResponse<()>>, ApiError> {
    state.verifications.delete(id)?;
    Ok(Json(ApiResponse::message("Verification record deleted")))
}
