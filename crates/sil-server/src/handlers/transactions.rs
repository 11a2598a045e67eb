use axum::extract::{Path, Query, State};
use axum::Json;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use sil_domain::{Actor, Certificate};
use sil_ledger::{LedgerTransaction, TransactionFilter, TxSortKey};
use sil_types::{page, Fingerprint, PageRequest, SortOrder, TxId, TxKind, TxStatus};

use crate::error::ApiError;
use crate::handlers::non_empty;
use crate::response::{ApiResponse, PagedResponse};
use crate::state::AppState;

/// Transaction as served to clients: the row plus computed processing
/// times, the resolved initiator, and (on the detail view) the related
/// certificate summary.
#[derive(Clone, Debug, Serialize)]
pub struct TransactionView {
    pub id: TxId,
    pub transaction_hash: Fingerprint,
    pub transaction_type: TxKind,
    pub initiated_by: i64,
    pub status: TxStatus,
    pub submitted_at: DateTime<Utc>,
    pub confirmed_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub processing_time_seconds: Option<i64>,
    pub processing_time_human: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub initiator: Option<Actor>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub certificate: Option<Certificate>,
}

impl TransactionView {
    fn build(
        state: &AppState,
        tx: LedgerTransaction,
        with_certificate: bool,
    ) -> Result<Self, ApiError> {
        let initiator = state.directory.actor(tx.initiated_by)?;
        let certificate = if with_certificate {
            state.certificates.find_by_fingerprint(&tx.hash)?
        } else {
            None
        };
        Ok(Self {
            id: tx.id,
            transaction_hash: tx.hash,
            transaction_type: tx.kind,
            initiated_by: tx.initiated_by,
            status: tx.status,
            submitted_at: tx.submitted_at,
            confirmed_at: tx.confirmed_at,
            created_at: tx.created_at,
            updated_at: tx.updated_at,
            processing_time_seconds: tx.processing_time_seconds(),
            processing_time_human: tx.processing_time_human(),
            initiator,
            certificate,
        })
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct TransactionListQuery {
    pub search: Option<String>,
    pub status: Option<String>,
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub user_id: Option<i64>,
    pub recent: Option<bool>,
    pub days: Option<u32>,
    pub sort_by: Option<String>,
    pub sort_order: Option<String>,
    pub page: Option<u32>,
    pub per_page: Option<u32>,
}

impl TransactionListQuery {
    fn into_filter(self) -> Result<TransactionFilter, ApiError> {
        let status = non_empty(self.status)
            .map(|s| s.parse::<TxStatus>())
            .transpose()?;
        let kind = non_empty(self.kind)
            .map(|s| s.parse::<TxKind>())
            .transpose()?;
        let sort_by = non_empty(self.sort_by)
            .map(|s| s.parse::<TxSortKey>())
            .transpose()?
            .unwrap_or_default();
        let sort_order = non_empty(self.sort_order)
            .map(|s| s.parse::<SortOrder>())
            .transpose()?
            .unwrap_or_default();
        let recent_days = if self.recent.unwrap_or(false) {
            Some(self.days.unwrap_or(7))
        } else {
            None
        };

        Ok(TransactionFilter {
            search: non_empty(self.search),
            status,
            kind,
            initiated_by: self.user_id,
            recent_days,
            sort_by,
            sort_order,
            page: PageRequest::new(
                self.page.unwrap_or(1),
                self.per_page.unwrap_or(page::DEFAULT_PER_PAGE),
            ),
        })
    }
}

/// `GET /blockchain/transactions`
pub async fn list_transactions(
    State(state): State<AppState>,
    Query(query): Query<TransactionListQuery>,
) -> Result<Json<PagedResponse<TransactionView>>, ApiError> {
    let filter = query.into_filter()?;
    let page = state.ledger.list(&filter)?;

    let mut views = Vec::with_capacity(page.items.len());
    for tx in page.items {
        views.push(TransactionView::build(&state, tx, false)?);
    }

    Ok(Json(PagedResponse {
        success: true,
        data: views,
        pagination: page.pagination,
    }))
}

/// `GET /blockchain/transactions/{id}`
pub async fn get_transaction(
    State(state): State<AppState>,
    Path(id): Path<u64>,
) -> Result<Json<ApiResponse<TransactionView>>, ApiError> {
    let tx = state
        .ledger
        .get(TxId(id))?
        .ok_or_else(|| ApiError::NotFound(format!("transaction {id} not found")))?;
    let view = TransactionView::build(&state, tx, true)?;
    Ok(Json(ApiResponse::ok(view)))
}

/// `POST /blockchain/transactions/{id}/retry`
pub async fn retry_transaction(
    State(state): State<AppState>,
    Path(id): Path<u64>,
) -> Result<Json<ApiResponse<TransactionView>>, ApiError> {
    let tx = state.retry.retry(TxId(id))?;
    let view = TransactionView::build(&state, tx, false)?;
    Ok(Json(ApiResponse::ok_with_message(
        view,
        "Transaction retry completed",
    )))
}

/// `DELETE /blockchain/transactions/{id}`
pub async fn delete_transaction(
    State(state): State<AppState>,
    Path(id): Path<u64>,
) -> Result<Json<ApiResponse<()>>, ApiError> {
    state.ledger.delete(TxId(id))?;
    Ok(Json(ApiResponse::message("Transaction deleted")))
}
