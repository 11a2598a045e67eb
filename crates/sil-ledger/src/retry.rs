use std::sync::Arc;

use chrono::Utc;

use sil_types::{TxId, TxStatus};

use crate::error::LedgerError;
use crate::traits::{CasOutcome, LedgerStore};
use crate::transaction::LedgerTransaction;

/// The external confirmation step a retry re-attempts.
pub trait ConfirmationBackend: Send + Sync {
    fn confirm(&self, transaction: &LedgerTransaction) -> Result<(), LedgerError>;
}

/// Default backend: durable local persistence is the confirmation, so
/// confirming always succeeds.
pub struct LocalConfirmation;

impl ConfirmationBackend for LocalConfirmation {
    fn confirm(&self, _transaction: &LedgerTransaction) -> Result<(), LedgerError> {
        Ok(())
    }
}

/// Advances non-terminal transactions toward a terminal state.
///
/// State machine: `Confirmed` is terminal; retrying it is a no-op that
/// returns the row unchanged. `Pending` and `Failed` re-attempt the
/// confirmation backend and transition via per-row compare-and-swap, so
/// two concurrent retries cannot double-confirm; the loser observes the
/// winner's resulting state.
pub struct RetryCoordinator {
    store: Arc<dyn LedgerStore>,
    backend: Arc<dyn ConfirmationBackend>,
}

impl RetryCoordinator {
    pub fn new(store: Arc<dyn LedgerStore>, backend: Arc<dyn ConfirmationBackend>) -> Self {
        Self { store, backend }
    }

    /// Retry one transaction. `Err(NotFound)` for an unknown id.
    pub fn retry(&self, id: TxId) -> Result<LedgerTransaction, LedgerError> {
        let transaction = self.store.get(id)?.ok_or(LedgerError::NotFound(id))?;

        if transaction.status.is_confirmed() {
            return Ok(transaction);
        }

        match self.backend.confirm(&transaction) {
            Ok(()) => {
                let outcome = self.store.compare_and_set_status(
                    id,
                    &[TxStatus::Pending, TxStatus::Failed],
                    TxStatus::Confirmed,
                    Some(Utc::now()),
                )?;
                if let CasOutcome::Lost(_) = &outcome {
                    tracing::debug!(%id, "concurrent retry already settled this transaction");
                }
                Ok(outcome.into_transaction())
            }
            Err(error) => {
                tracing::warn!(%id, %error, "confirmation failed; transaction marked failed");
                let outcome = self.store.compare_and_set_status(
                    id,
                    &[TxStatus::Pending, TxStatus::Failed],
                    TxStatus::Failed,
                    None,
                )?;
                Ok(outcome.into_transaction())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::InMemoryLedger;
    use crate::traits::NewTransaction;
    use sil_types::{Fingerprint, TxKind};

    fn ledger_with(status: TxStatus) -> (Arc<InMemoryLedger>, TxId) {
        let ledger = Arc::new(InMemoryLedger::new());
        let now = Utc::now();
        let tx = ledger
            .append(NewTransaction {
                hash: Fingerprint::from_digest([1; 32]),
                kind: TxKind::GradeCreation,
                initiated_by: 9,
                status,
                submitted_at: now,
                confirmed_at: status.is_confirmed().then_some(now),
            })
            .unwrap();
        (ledger, tx.id)
    }

    struct RefusingBackend;

    impl ConfirmationBackend for RefusingBackend {
        fn confirm(&self, _transaction: &LedgerTransaction) -> Result<(), LedgerError> {
            Err(LedgerError::Confirmation("backend unavailable".into()))
        }
    }

    #[test]
    fn retry_on_confirmed_is_idempotent() {
        let (ledger, id) = ledger_with(TxStatus::Confirmed);
        let before = ledger.get(id).unwrap().unwrap();

        let coordinator = RetryCoordinator::new(ledger, Arc::new(LocalConfirmation));
        let after = coordinator.retry(id).unwrap();

        assert_eq!(after.status, TxStatus::Confirmed);
        assert_eq!(after.confirmed_at, before.confirmed_at);
        assert_eq!(after.updated_at, before.updated_at);
    }

    #[test]
    fn retry_confirms_pending() {
        let (ledger, id) = ledger_with(TxStatus::Pending);
        let coordinator = RetryCoordinator::new(ledger.clone(), Arc::new(LocalConfirmation));

        let after = coordinator.retry(id).unwrap();
        assert_eq!(after.status, TxStatus::Confirmed);
        assert!(after.confirmed_at.is_some());
    }

    #[test]
    fn retry_confirms_failed() {
        let (ledger, id) = ledger_with(TxStatus::Failed);
        let coordinator = RetryCoordinator::new(ledger, Arc::new(LocalConfirmation));

        let after = coordinator.retry(id).unwrap();
        assert_eq!(after.status, TxStatus::Confirmed);
    }

    #[test]
    fn backend_failure_marks_failed_never_pending() {
        let (ledger, id) = ledger_with(TxStatus::Pending);
        let coordinator = RetryCoordinator::new(ledger.clone(), Arc::new(RefusingBackend));

        let after = coordinator.retry(id).unwrap();
        assert_eq!(after.status, TxStatus::Failed);
        assert!(after.confirmed_at.is_none());

        // Still retryable afterwards, and a healthy backend recovers it.
        let recovered = RetryCoordinator::new(ledger, Arc::new(LocalConfirmation))
            .retry(id)
            .unwrap();
        assert_eq!(recovered.status, TxStatus::Confirmed);
    }

    #[test]
    fn unknown_id_is_not_found() {
        let ledger: Arc<InMemoryLedger> = Arc::new(InMemoryLedger::new());
        let coordinator = RetryCoordinator::new(ledger, Arc::new(LocalConfirmation));
        assert_eq!(
            coordinator.retry(TxId(404)).unwrap_err(),
            LedgerError::NotFound(TxId(404))
        );
    }

    #[test]
    fn losing_a_race_returns_the_winners_state() {
        let (ledger, id) = ledger_with(TxStatus::Pending);

        // Simulate a concurrent retry winning between our read and CAS.
        let winner_at = Utc::now();
        ledger
            .compare_and_set_status(
                id,
                &[TxStatus::Pending],
                TxStatus::Confirmed,
                Some(winner_at),
            )
            .unwrap();

        let coordinator = RetryCoordinator::new(ledger, Arc::new(LocalConfirmation));
        let observed = coordinator.retry(id).unwrap();
        assert_eq!(observed.status, TxStatus::Confirmed);
        assert_eq!(observed.confirmed_at, Some(winner_at));
    }

    #[test]
    fn concurrent_retries_confirm_exactly_once() {
        let (ledger, id) = ledger_with(TxStatus::Pending);
        let coordinator = Arc::new(RetryCoordinator::new(
            ledger.clone(),
            Arc::new(LocalConfirmation),
        ));

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let coordinator = coordinator.clone();
                std::thread::spawn(move || coordinator.retry(id).unwrap())
            })
            .collect();

        let results: Vec<LedgerTransaction> =
            handles.into_iter().map(|h| h.join().unwrap()).collect();

        let final_state = ledger.get(id).unwrap().unwrap();
        assert_eq!(final_state.status, TxStatus::Confirmed);
        // Every caller observed the same single confirmation timestamp.
        for result in results {
            assert_eq!(result.status, TxStatus::Confirmed);
            assert_eq!(result.confirmed_at, final_state.confirmed_at);
        }
    }
}
