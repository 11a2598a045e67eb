use axum::extract::{Path, Query, State};
use axum::{Extension, Json};
use chrono::NaiveDate;
use serde::Deserialize;

use sil_domain::{
    Certificate, CertificateFilter, CertificateSortKey, CertificateUpdate, NewCertificate,
};
use sil_ledger::CallerContext;
use sil_types::{page, CertificateType, PageRequest, SortOrder};

use crate::auth::Identity;
use crate::error::ApiError;
use crate::handlers::non_empty;
use crate::response::{ApiResponse, PagedResponse};
use crate::state::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct CertificateListQuery {
    pub search: Option<String>,
    #[serde(rename = "type")]
    pub certificate_type: Option<String>,
    pub student_id: Option<i64>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub sort_by: Option<String>,
    pub sort_order: Option<String>,
    pub page: Option<u32>,
    pub per_page: Option<u32>,
}

impl CertificateListQuery {
    fn into_filter(self) -> Result<CertificateFilter, ApiError> {
        let certificate_type = non_empty(self.certificate_type)
            .map(|s| s.parse::<CertificateType>())
            .transpose()?;
        let sort_by = non_empty(self.sort_by)
            .map(|s| s.parse::<CertificateSortKey>())
            .transpose()?
            .unwrap_or_default();
        let sort_order = non_empty(self.sort_order)
            .map(|s| s.parse::<SortOrder>())
            .transpose()?
            .unwrap_or_default();

        Ok(CertificateFilter {
            search: non_empty(self.search),
            certificate_type,
            student_id: self.student_id,
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

/// `GET /blockchain/certificates`
pub async fn list_certificates(
    State(state): State<AppState>,
    Query(query): Query<CertificateListQuery>,
) -> Result<Json<PagedResponse<Certificate>>, ApiError> {
    let filter = query.into_filter()?;
    let page = state.certificates.list(&filter)?;
    Ok(Json(PagedResponse::from_page(page)))
}

/// `GET /blockchain/certificates/{id}`
pub async fn get_certificate(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<ApiResponse<Certificate>>, ApiError> {
    let certificate = state
        .certificates
        .get(id)?
        .ok_or_else(|| ApiError::NotFound(format!("certificate {id} not found")))?;
    Ok(Json(ApiResponse::ok(certificate)))
}

fn validate_new(new: &NewCertificate) -> Result<(), ApiError> {
    if new.certificate_number.trim().is_empty() {
        return Err(ApiError::Validation("certificate_number is required".into()));
    }
    if new.title.trim().is_empty() {
        return Err(ApiError::Validation("title is required".into()));
    }
    Ok(())
}

/// `POST /blockchain/certificates`
pub async fn create_certificate(
    State(state): State<AppState>,
    Json(new): Json<NewCertificate>,
) -> Result<Json<ApiResponse<Certificate>>, ApiError> {
    validate_new(&new)?;
    let certificate = state.certificates.create(new)?;
    Ok(Json(ApiResponse::ok_with_message(
        certificate,
        "Certificate created",
    )))
}

/// `PUT /blockchain/certificates/{id}`
pub async fn update_certificate(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(changes): Json<CertificateUpdate>,
) -> Result<Json<ApiResponse<Certificate>>, ApiError> {
    if let Some(title) = &changes.title {
        if title.trim().is_empty() {
            return Err(ApiError::Validation("title must not be empty".into()));
        }
    }
    let certificate = state.certificates.update(id, changes)?;
    Ok(Json(ApiResponse::ok_with_message(
        certificate,
        "Certificate updated",
    )))
}

/// `DELETE /blockchain/certificates/{id}`
pub async fn delete_certificate(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<ApiResponse<()>>, ApiError> {
    state.certificates.delete(id)?;
    Ok(Json(ApiResponse::message("Certificate deleted")))
}

/// `POST /blockchain/certificates/{id}/register`
///
/// Explicit (re)fingerprinting: computes the digest over current state,
/// stamps it on the certificate, and appends the matching ledger
/// transaction attributed to the calling admin.
pub async fn register_certificate(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Path(id): Path<i64>,
) -> Result<Json<ApiResponse<Certificate>>, ApiError> {
    let context = match identity.actor_id {
        Some(actor_id) => CallerContext::authenticated(actor_id),
        None => CallerContext::anonymous(),
    };
    let (certificate, _outcome) =
        state
            .recorder
            .register_certificate(state.certificates.as_ref(), id, &context)?;
    Ok(Json(ApiResponse::ok_with_message(
        certificate,
        "Certificate registered on the integrity ledger",
    )))
}
