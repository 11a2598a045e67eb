use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use sil_types::{Fingerprint, Page, TxId, TxKind, TxStatus};

use crate::error::LedgerError;
use crate::filter::TransactionFilter;
use crate::transaction::LedgerTransaction;

/// Input for appending a transaction.
#[derive(Clone, Debug)]
pub struct NewTransaction {
    pub hash: Fingerprint,
    pub kind: TxKind,
    pub initiated_by: i64,
    pub status: TxStatus,
    pub submitted_at: DateTime<Utc>,
    pub confirmed_at: Option<DateTime<Utc>>,
}

/// Result of a status compare-and-swap.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CasOutcome {
    /// The transition was applied; the returned row reflects it.
    Applied(LedgerTransaction),
    /// The row was not in an expected state; the returned row is the
    /// current (winning) state, unchanged by this call.
    Lost(LedgerTransaction),
}

impl CasOutcome {
    pub fn into_transaction(self) -> LedgerTransaction {
        match self {
            Self::Applied(tx) | Self::Lost(tx) => tx,
        }
    }
}

/// Aggregate transaction statistics.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct LedgerStats {
    pub total_transactions: u64,
    pub pending_count: u64,
    pub confirmed_count: u64,
    pub failed_count: u64,
    /// Percentage of transactions confirmed, rounded to two decimals.
    pub success_rate: f64,
    pub average_processing_seconds: Option<f64>,
}

/// Store boundary for ledger transactions.
///
/// `hash`, `kind`, and `initiated_by` are append-only: no store operation
/// may change them. `compare_and_set_status` is the only mutation path and
/// touches `status`/`confirmed_at` alone.
pub trait LedgerStore: Send + Sync {
    fn append(&self, new: NewTransaction) -> Result<LedgerTransaction, LedgerError>;

    fn get(&self, id: TxId) -> Result<Option<LedgerTransaction>, LedgerError>;

    fn list(&self, filter: &TransactionFilter) -> Result<Page<LedgerTransaction>, LedgerError>;

    fn delete(&self, id: TxId) -> Result<(), LedgerError>;

    /// Atomically transition `id` to `new_status` if its current status is
    /// one of `expected`. The winner of a concurrent race gets `Applied`;
    /// losers get `Lost` with the winner's resulting row.
    fn compare_and_set_status(
        &self,
        id: TxId,
        expected: &[TxStatus],
        new_status: TxStatus,
        confirmed_at: Option<DateTime<Utc>>,
    ) -> Result<CasOutcome, LedgerError>;

    fn stats(&self) -> Result<LedgerStats, LedgerError>;
}
