use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use sil_types::{Fingerprint, TxId, TxKind, TxStatus};

/// One ledger transaction: a fingerprinting event with lifecycle status.
///
/// `hash`, `kind`, and `initiated_by` are immutable after creation. Only
/// `status` and `confirmed_at` change, and only through the retry/confirm
/// transition; the store's compare-and-swap is the single mutation path.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerTransaction {
    pub id: TxId,
    pub hash: Fingerprint,
    pub kind: TxKind,
    pub initiated_by: i64,
    pub status: TxStatus,
    pub submitted_at: DateTime<Utc>,
    pub confirmed_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl LedgerTransaction {
    /// Seconds between submission and confirmation, if confirmed.
    pub fn processing_time_seconds(&self) -> Option<i64> {
        self.confirmed_at
            .map(|confirmed| (confirmed - self.submitted_at).num_seconds().max(0))
    }

    /// Human-readable processing time ("14s", "2m 30s", "1h 5m"), or the
    /// current status for unconfirmed transactions.
    pub fn processing_time_human(&self) -> String {
        match self.processing_time_seconds() {
            None => self.status.to_string(),
            Some(secs) if secs < 60 => format!("{secs}s"),
            Some(secs) if secs < 3600 => format!("{}m {}s", secs / 60, secs % 60),
            Some(secs) => format!("{}h {}m", secs / 3600, (secs % 3600) / 60),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn tx(confirm_after_secs: Option<i64>) -> LedgerTransaction {
        let submitted = Utc.with_ymd_and_hms(2025, 1, 10, 8, 0, 0).unwrap();
        LedgerTransaction {
            id: TxId(1),
            hash: Fingerprint::from_digest([1; 32]),
            kind: TxKind::AttendanceCreation,
            initiated_by: 9,
            status: if confirm_after_secs.is_some() {
                TxStatus::Confirmed
            } else {
                TxStatus::Pending
            },
            submitted_at: submitted,
            confirmed_at: confirm_after_secs.map(|s| submitted + chrono::Duration::seconds(s)),
            created_at: submitted,
            updated_at: submitted,
        }
    }

    #[test]
    fn processing_time_for_confirmed() {
        assert_eq!(tx(Some(14)).processing_time_seconds(), Some(14));
        assert_eq!(tx(Some(14)).processing_time_human(), "14s");
        assert_eq!(tx(Some(150)).processing_time_human(), "2m 30s");
        assert_eq!(tx(Some(3900)).processing_time_human(), "1h 5m");
    }

    #[test]
    fn processing_time_for_unconfirmed_shows_status() {
        assert_eq!(tx(None).processing_time_seconds(), None);
        assert_eq!(tx(None).processing_time_human(), "pending");
    }

    #[test]
    fn serde_roundtrip() {
        let original = tx(Some(5));
        let json = serde_json::to_string(&original).unwrap();
        let parsed: LedgerTransaction = serde_json::from_str(&json).unwrap();
        assert_eq!(original, parsed);
    }
}
