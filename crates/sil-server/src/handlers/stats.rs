use axum::extract::State;
use axum::Json;
use serde::Serialize;

use crate::error::ApiError;
use crate::response::ApiResponse;
use crate::state::AppState;

/// Combined transaction and certificate statistics.
#[derive(Clone, Debug, Serialize)]
pub struct BlockchainStats {
    pub total_transactions: u64,
    pub pending_count: u64,
    pub confirmed_count: u64,
    pub failed_count: u64,
    pub success_rate: f64,
    pub average_processing_time: Option<f64>,
    pub total_certificates: u64,
    pub verified_certificates: u64,
    pub pending_certificates: u64,
}

/// `GET /blockchain/stats`
pub async fn get_stats(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<BlockchainStats>>, ApiError> {
    let ledger = state.ledger.stats()?;
    let certificates = state.certificates.counts()?;

    Ok(Json(ApiResponse::ok(BlockchainStats {
        total_transactions: ledger.total_transactions,
        pending_count: ledger.pending_count,
        confirmed_count: ledger.confirmed_count,
        failed_count: ledger.failed_count,
        success_rate: ledger.success_rate,
        average_processing_time: ledger.average_processing_seconds,
        total_certificates: certificates.total,
        verified_certificates: certificates.registered,
        pending_certificates: certificates.unregistered,
    })))
}
