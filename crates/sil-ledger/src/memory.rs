use std::collections::BTreeMap;
use std::sync::RwLock;

use chrono::{DateTime, Duration, Utc};

use sil_types::{Page, SortOrder, TxId, TxStatus};

use crate::error::LedgerError;
use crate::filter::{TransactionFilter, TxSortKey};
use crate::traits::{CasOutcome, LedgerStats, LedgerStore, NewTransaction};
use crate::transaction::LedgerTransaction;

/// In-memory ledger implementation for tests, local demos, and embedding.
#[derive(Default)]
pub struct InMemoryLedger {
    inner: RwLock<LedgerState>,
}

#[derive(Default)]
struct LedgerState {
    next_id: u64,
    transactions: BTreeMap<u64, LedgerTransaction>,
}

impl InMemoryLedger {
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> Result<std::sync::RwLockReadGuard<'_, LedgerState>, LedgerError> {
        self.inner
            .read()
            .map_err(|_| LedgerError::Store("ledger lock poisoned".into()))
    }

    fn write(&self) -> Result<std::sync::RwLockWriteGuard<'_, LedgerState>, LedgerError> {
        self.inner
            .write()
            .map_err(|_| LedgerError::Store("ledger lock poisoned".into()))
    }

    fn matches(filter: &TransactionFilter, tx: &LedgerTransaction, now: DateTime<Utc>) -> bool {
        if let Some(search) = &filter.search {
            let needle = search.to_lowercase();
            let hit = tx.hash.to_hex().contains(&needle)
                || tx.kind.as_str().contains(&needle)
                || tx.initiated_by.to_string() == needle;
            if !hit {
                return false;
            }
        }
        if let Some(status) = filter.status {
            if tx.status != status {
                return false;
            }
        }
        if let Some(kind) = filter.kind {
            if tx.kind != kind {
                return false;
            }
        }
        if let Some(initiator) = filter.initiated_by {
            if tx.initiated_by != initiator {
                return false;
            }
        }
        if let Some(days) = filter.recent_days {
            if tx.submitted_at < now - Duration::days(days as i64) {
                return false;
            }
        }
        true
    }
}

impl LedgerStore for InMemoryLedger {
    fn append(&self, new: NewTransaction) -> Result<LedgerTransaction, LedgerError> {
        let mut state = self.write()?;
        state.next_id += 1;
        let now = Utc::now();
        let tx = LedgerTransaction {
            id: TxId(state.next_id),
            hash: new.hash,
            kind: new.kind,
            initiated_by: new.initiated_by,
            status: new.status,
            submitted_at: new.submitted_at,
            confirmed_at: new.confirmed_at,
            created_at: now,
            updated_at: now,
        };
        state.transactions.insert(tx.id.0, tx.clone());
        Ok(tx)
    }

    fn get(&self, id: TxId) -> Result<Option<LedgerTransaction>, LedgerError> {
        Ok(self.read()?.transactions.get(&id.0).cloned())
    }

    fn list(&self, filter: &TransactionFilter) -> Result<Page<LedgerTransaction>, LedgerError> {
        let state = self.read()?;
        let now = Utc::now();
        let mut matched: Vec<LedgerTransaction> = state
            .transactions
            .values()
            .filter(|tx| Self::matches(filter, tx, now))
            .cloned()
            .collect();

        matched.sort_by(|a, b| {
            let ordering = match filter.sort_by {
                TxSortKey::Id => a.id.cmp(&b.id),
                TxSortKey::SubmittedAt => a.submitted_at.cmp(&b.submitted_at),
                TxSortKey::ConfirmedAt => a.confirmed_at.cmp(&b.confirmed_at),
                TxSortKey::Status => a.status.as_str().cmp(b.status.as_str()),
                TxSortKey::Kind => a.kind.as_str().cmp(b.kind.as_str()),
            };
            match filter.sort_order {
                SortOrder::Asc => ordering,
                SortOrder::Desc => ordering.reverse(),
            }
        });

        Ok(Page::from_items(matched, filter.page))
    }

    fn delete(&self, id: TxId) -> Result<(), LedgerError> {
        let mut state = self.write()?;
        state
            .transactions
            .remove(&id.0)
            .map(|_| ())
            .ok_or(LedgerError::NotFound(id))
    }

    fn compare_and_set_status(
        &self,
        id: TxId,
        expected: &[TxStatus],
        new_status: TxStatus,
        confirmed_at: Option<DateTime<Utc>>,
    ) -> Result<CasOutcome, LedgerError> {
        let mut state = self.write()?;
        let tx = state
            .transactions
            .get_mut(&id.0)
            .ok_or(LedgerError::NotFound(id))?;

        if !expected.contains(&tx.status) {
            return Ok(CasOutcome::Lost(tx.clone()));
        }

        tx.status = new_status;
        if let Some(at) = confirmed_at {
            tx.confirmed_at = Some(at);
        }
        tx.updated_at = Utc::now();
        Ok(CasOutcome::Applied(tx.clone()))
    }

    fn stats(&self) -> Result<LedgerStats, LedgerError> {
        let state = self.read()?;
        let total = state.transactions.len() as u64;
        let mut pending = 0u64;
        let mut confirmed = 0u64;
        let mut failed = 0u64;
        let mut processing: Vec<i64> = Vec::new();

        for tx in state.transactions.values() {
            match tx.status {
                TxStatus::Pending => pending += 1,
                TxStatus::Confirmed => confirmed += 1,
                TxStatus::Failed => failed += 1,
            }
            if let Some(secs) = tx.processing_time_seconds() {
                processing.push(secs);
            }
        }

        let success_rate = if total == 0 {
            0.0
        } else {
            ((confirmed as f64 / total as f64) * 10_000.0).round() / 100.0
        };
        let average_processing_seconds = if processing.is_empty() {
            None
        } else {
            Some(processing.iter().sum::<i64>() as f64 / processing.len() as f64)
        };

        Ok(LedgerStats {
            total_transactions: total,
            pending_count: pending,
            confirmed_count: confirmed,
            failed_count: failed,
            success_rate,
            average_processing_seconds,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sil_types::{Fingerprint, PageRequest, TxKind};

    fn new_tx(kind: TxKind, status: TxStatus, seed: u8) -> NewTransaction {
        let now = Utc::now();
        NewTransaction {
            hash: Fingerprint::from_digest([seed; 32]),
            kind,
            initiated_by: 9,
            status,
            submitted_at: now,
            confirmed_at: status.is_confirmed().then_some(now),
        }
    }

    #[test]
    fn append_assigns_sequential_ids() {
        let ledger = InMemoryLedger::new();
        let a = ledger
            .append(new_tx(TxKind::AttendanceCreation, TxStatus::Confirmed, 1))
            .unwrap();
        let b = ledger
            .append(new_tx(TxKind::GradeCreation, TxStatus::Confirmed, 2))
            .unwrap();
        assert_eq!(a.id, TxId(1));
        assert_eq!(b.id, TxId(2));
    }

    #[test]
    fn get_unknown_id_is_none() {
        let ledger = InMemoryLedger::new();
        assert!(ledger.get(TxId(404)).unwrap().is_none());
    }

    #[test]
    fn delete_unknown_id_errors() {
        let ledger = InMemoryLedger::new();
        assert_eq!(
            ledger.delete(TxId(404)).unwrap_err(),
            LedgerError::NotFound(TxId(404))
        );
    }

    #[test]
    fn cas_applies_when_status_expected() {
        let ledger = InMemoryLedger::new();
        let tx = ledger
            .append(new_tx(TxKind::GradeCreation, TxStatus::Pending, 1))
            .unwrap();

        let outcome = ledger
            .compare_and_set_status(
                tx.id,
                &[TxStatus::Pending, TxStatus::Failed],
                TxStatus::Confirmed,
                Some(Utc::now()),
            )
            .unwrap();

        match outcome {
            CasOutcome::Applied(updated) => {
                assert_eq!(updated.status, TxStatus::Confirmed);
                assert!(updated.confirmed_at.is_some());
            }
            CasOutcome::Lost(_) => panic!("expected the transition to apply"),
        }
    }

    #[test]
    fn cas_loses_against_confirmed_row() {
        let ledger = InMemoryLedger::new();
        let tx = ledger
            .append(new_tx(TxKind::GradeCreation, TxStatus::Confirmed, 1))
            .unwrap();
        let confirmed_at = tx.confirmed_at;

        let outcome = ledger
            .compare_and_set_status(
                tx.id,
                &[TxStatus::Pending, TxStatus::Failed],
                TxStatus::Confirmed,
                Some(Utc::now()),
            )
            .unwrap();

        match outcome {
            CasOutcome::Lost(current) => {
                assert_eq!(current.status, TxStatus::Confirmed);
                assert_eq!(current.confirmed_at, confirmed_at);
            }
            CasOutcome::Applied(_) => panic!("confirmed row must not transition"),
        }
    }

    #[test]
    fn cas_preserves_hash_kind_initiator() {
        let ledger = InMemoryLedger::new();
        let tx = ledger
            .append(new_tx(TxKind::AttendanceUpdate, TxStatus::Failed, 7))
            .unwrap();

        let updated = ledger
            .compare_and_set_status(tx.id, &[TxStatus::Failed], TxStatus::Confirmed, Some(Utc::now()))
            .unwrap()
            .into_transaction();

        assert_eq!(updated.hash, tx.hash);
        assert_eq!(updated.kind, tx.kind);
        assert_eq!(updated.initiated_by, tx.initiated_by);
    }

    #[test]
    fn list_filters_by_status_and_kind() {
        let ledger = InMemoryLedger::new();
        ledger
            .append(new_tx(TxKind::AttendanceCreation, TxStatus::Confirmed, 1))
            .unwrap();
        ledger
            .append(new_tx(TxKind::GradeCreation, TxStatus::Pending, 2))
            .unwrap();
        ledger
            .append(new_tx(TxKind::GradeCreation, TxStatus::Confirmed, 3))
            .unwrap();

        let page = ledger
            .list(&TransactionFilter {
                status: Some(TxStatus::Confirmed),
                ..Default::default()
            })
            .unwrap();
        assert_eq!(page.pagination.total, 2);

        let page = ledger
            .list(&TransactionFilter {
                kind: Some(TxKind::GradeCreation),
                status: Some(TxStatus::Pending),
                ..Default::default()
            })
            .unwrap();
        assert_eq!(page.pagination.total, 1);
    }

    #[test]
    fn list_free_text_search_matches_hash_prefix() {
        let ledger = InMemoryLedger::new();
        let tx = ledger
            .append(new_tx(TxKind::CertificateCreation, TxStatus::Confirmed, 0xAB))
            .unwrap();

        let page = ledger
            .list(&TransactionFilter {
                search: Some(tx.hash.short_hex()),
                ..Default::default()
            })
            .unwrap();
        assert_eq!(page.pagination.total, 1);

        let page = ledger
            .list(&TransactionFilter {
                search: Some("certificate_creation".into()),
                ..Default::default()
            })
            .unwrap();
        assert_eq!(page.pagination.total, 1);
    }

    #[test]
    fn list_sorts_descending_by_default_key() {
        let ledger = InMemoryLedger::new();
        for seed in 1..=3 {
            ledger
                .append(new_tx(TxKind::AttendanceCreation, TxStatus::Confirmed, seed))
                .unwrap();
        }

        let page = ledger
            .list(&TransactionFilter {
                sort_order: SortOrder::Desc,
                page: PageRequest::new(1, 2),
                ..Default::default()
            })
            .unwrap();
        assert_eq!(page.items[0].id, TxId(3));
        assert_eq!(page.items.len(), 2);
        assert_eq!(page.pagination.last_page, 2);
    }

    #[test]
    fn stats_counts_and_success_rate() {
        let ledger = InMemoryLedger::new();
        ledger
            .append(new_tx(TxKind::AttendanceCreation, TxStatus::Confirmed, 1))
            .unwrap();
        ledger
            .append(new_tx(TxKind::GradeCreation, TxStatus::Confirmed, 2))
            .unwrap();
        ledger
            .append(new_tx(TxKind::GradeUpdate, TxStatus::Failed, 3))
            .unwrap();
        ledger
            .append(new_tx(TxKind::CertificateCreation, TxStatus::Pending, 4))
            .unwrap();

        let stats = ledger.stats().unwrap();
        assert_eq!(stats.total_transactions, 4);
        assert_eq!(stats.confirmed_count, 2);
        assert_eq!(stats.failed_count, 1);
        assert_eq!(stats.pending_count, 1);
        assert_eq!(stats.success_rate, 50.0);
        assert!(stats.average_processing_seconds.is_some());
    }

    #[test]
    fn stats_on_empty_ledger() {
        let ledger = InMemoryLedger::new();
        let stats = ledger.stats().unwrap();
        assert_eq!(stats.total_transactions, 0);
        assert_eq!(stats.success_rate, 0.0);
        assert!(stats.average_processing_seconds.is_none());
    }
}
