use std::sync::Arc;

use chrono::Utc;

use sil_domain::{
    fingerprint_record, Attendance, Canonicalize, Certificate, CertificateStore, Directory,
    DomainError, Grade, RelationResolver,
};
use sil_types::{Fingerprint, TxKind, TxStatus};

use crate::error::LedgerError;
use crate::initiator::{CallerContext, InitiatorResolver, Provenance};
use crate::traits::{LedgerStore, NewTransaction};
use crate::transaction::LedgerTransaction;

/// How appended transactions reach `Confirmed`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConfirmMode {
    /// The durable local write is the confirmation: transactions are born
    /// `Confirmed` with `confirmed_at = submitted_at`.
    #[default]
    Sync,
    /// An external confirmation step is modeled as asynchronous:
    /// transactions are born `Pending` and advance via retry.
    Async,
}

/// What happened to the ledger side of a domain write.
///
/// The domain write itself has already succeeded by the time the recorder
/// runs; every variant here is informational, never a failure of the
/// caller's operation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RecordOutcome {
    /// Fingerprinted, attributed, and appended.
    Recorded(LedgerTransaction),
    /// The initiator fallback chain was exhausted; no transaction created.
    SkippedNoInitiator,
    /// Fingerprinting failed before persistence; no transaction created.
    FingerprintFailed,
    /// The store rejected the append; logged and swallowed.
    LedgerWriteFailed,
}

impl RecordOutcome {
    pub fn is_recorded(&self) -> bool {
        matches!(self, Self::Recorded(_))
    }

    pub fn transaction(&self) -> Option<&LedgerTransaction> {
        match self {
            Self::Recorded(tx) => Some(tx),
            _ => None,
        }
    }
}

/// Drives the append side of the ledger as a best-effort side effect of
/// domain writes: canonicalize → hash → resolve initiator → append.
///
/// Fire-and-log: nothing in here propagates an error back to the domain
/// write that triggered it.
pub struct LedgerRecorder {
    store: Arc<dyn LedgerStore>,
    directory: Arc<dyn Directory>,
    mode: ConfirmMode,
}

impl LedgerRecorder {
    pub fn new(store: Arc<dyn LedgerStore>, directory: Arc<dyn Directory>) -> Self {
        Self {
            store,
            directory,
            mode: ConfirmMode::Sync,
        }
    }

    pub fn with_mode(mut self, mode: ConfirmMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn mode(&self) -> ConfirmMode {
        self.mode
    }

    /// Record a saved attendance entry. Call after the entry is durably
    /// persisted so the fingerprint reflects the saved state.
    pub fn record_attendance(
        &self,
        attendance: &Attendance,
        context: &CallerContext,
        is_update: bool,
    ) -> RecordOutcome {
        let kind = if is_update {
            TxKind::AttendanceUpdate
        } else {
            TxKind::AttendanceCreation
        };
        self.record(
            attendance,
            attendance.id,
            kind,
            Provenance::class_subject(attendance.class_subject_id),
            context,
        )
    }

    /// Record a saved grade entry.
    pub fn record_grade(&self, grade: &Grade, context: &CallerContext, is_update: bool) -> RecordOutcome {
        let kind = if is_update {
            TxKind::GradeUpdate
        } else {
            TxKind::GradeCreation
        };
        self.record(
            grade,
            grade.id,
            kind,
            Provenance::class_subject(grade.class_subject_id),
            context,
        )
    }

    /// Fingerprint a certificate, stamp the digest onto it, and append the
    /// matching transaction. Re-registering an already registered
    /// certificate appends a `certificate_update`.
    ///
    /// Unlike the attendance/grade paths this returns `Err` for an unknown
    /// certificate id; there is nothing to register. The transaction
    /// append itself stays fire-and-log.
    pub fn register_certificate(
        &self,
        certificates: &dyn CertificateStore,
        certificate_id: i64,
        context: &CallerContext,
    ) -> Result<(Certificate, RecordOutcome), LedgerError> {
        let certificate = certificates
            .get(certificate_id)?
            .ok_or(DomainError::NotFound {
                entity: "certificate",
                id: certificate_id as u64,
            })?;
        let is_update = certificate.is_registered();

        let mut relations = RelationResolver::new(self.directory.as_ref());
        let hash = fingerprint_record(&certificate, &mut relations)?;
        let stamped = certificates.set_fingerprint(certificate.id, hash, Utc::now())?;

        let kind = if is_update {
            TxKind::CertificateUpdate
        } else {
            TxKind::CertificateCreation
        };
        let outcome = self.append_attributed(
            hash,
            stamped.id,
            kind,
            Provenance::teacher(stamped.issued_by),
            context,
            &mut relations,
        );
        Ok((stamped, outcome))
    }

    fn record<R: Canonicalize>(
        &self,
        record: &R,
        record_id: i64,
        kind: TxKind,
        provenance: Provenance,
        context: &CallerContext,
    ) -> RecordOutcome {
        let mut relations = RelationResolver::new(self.directory.as_ref());
        let hash = match fingerprint_record(record, &mut relations) {
            Ok(hash) => hash,
            Err(error) => {
                tracing::warn!(
                    record_id,
                    kind = %kind,
                    %error,
                    "fingerprinting failed; no ledger transaction created"
                );
                return RecordOutcome::FingerprintFailed;
            }
        };
        self.append_attributed(hash, record_id, kind, provenance, context, &mut relations)
    }

    fn append_attributed(
        &self,
        hash: Fingerprint,
        record_id: i64,
        kind: TxKind,
        provenance: Provenance,
        context: &CallerContext,
        relations: &mut RelationResolver<'_>,
    ) -> RecordOutcome {
        let resolver = InitiatorResolver::new(self.directory.as_ref());
        let Some(initiated_by) = resolver.resolve(context, &provenance, relations) else {
            tracing::debug!(record_id, kind = %kind, "no initiator resolvable; ledger entry skipped");
            return RecordOutcome::SkippedNoInitiator;
        };

        let now = Utc::now();
        let (status, confirmed_at) = match self.mode {
            ConfirmMode::Sync => (TxStatus::Confirmed, Some(now)),
            ConfirmMode::Async => (TxStatus::Pending, None),
        };

        match self.store.append(NewTransaction {
            hash,
            kind,
            initiated_by,
            status,
            submitted_at: now,
            confirmed_at,
        }) {
            Ok(tx) => RecordOutcome::Recorded(tx),
            Err(error) => {
                tracing::warn!(
                    record_id,
                    kind = %kind,
                    %error,
                    "failed to append ledger transaction"
                );
                RecordOutcome::LedgerWriteFailed
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::TransactionFilter;
    use crate::memory::InMemoryLedger;
    use crate::traits::CasOutcome;
    use chrono::{DateTime, NaiveDate, TimeZone};
    use sil_domain::{
        Actor, ClassSubject, InMemoryCertificateStore, InMemoryDirectory, NewCertificate, Student,
        Subject, Teacher,
    };
    use sil_types::{AttendanceStatus, CertificateType, Page, Role, TxId};

    fn seeded_directory() -> Arc<InMemoryDirectory> {
        let directory = InMemoryDirectory::new();
        directory.insert_actor(Actor {
            id: 100,
            name: "Site Admin".into(),
            email: "admin@school.test".into(),
            role: Role::Admin,
        });
        directory.insert_actor(Actor {
            id: 9,
            name: "Ramon Ilagan".into(),
            email: "ramon@school.test".into(),
            role: Role::Teacher,
        });
        directory.insert_student(Student {
            id: 42,
            student_number: "S-0042".into(),
            first_name: "Jane".into(),
            last_name: "Cruz".into(),
        });
        directory.insert_subject(Subject {
            id: 3,
            code: "NAV-101".into(),
            name: "Basic Navigation".into(),
        });
        directory.insert_teacher(Teacher {
            id: 5,
            actor_id: Some(9),
            first_name: "Ramon".into(),
            last_name: "Ilagan".into(),
        });
        directory.insert_class_subject(ClassSubject {
            id: 7,
            subject_id: 3,
            teacher_id: Some(5),
        });
        Arc::new(directory)
    }

    fn attendance() -> Attendance {
        let at = Utc.with_ymd_and_hms(2025, 1, 10, 8, 30, 0).unwrap();
        Attendance {
            id: 1,
            student_id: 42,
            class_subject_id: 7,
            attendance_date: NaiveDate::from_ymd_opt(2025, 1, 10).unwrap(),
            status: AttendanceStatus::Present,
            created_at: at,
            updated_at: at,
        }
    }

    #[test]
    fn sync_mode_births_confirmed_transactions() {
        let store = Arc::new(InMemoryLedger::new());
        let recorder = LedgerRecorder::new(store.clone(), seeded_directory());

        let outcome =
            recorder.record_attendance(&attendance(), &CallerContext::authenticated(55), false);

        let tx = outcome.transaction().expect("transaction recorded");
        assert_eq!(tx.kind, TxKind::AttendanceCreation);
        assert_eq!(tx.initiated_by, 55);
        assert_eq!(tx.status, TxStatus::Confirmed);
        assert_eq!(tx.confirmed_at, Some(tx.submitted_at));
    }

    #[test]
    fn async_mode_births_pending_transactions() {
        let store = Arc::new(InMemoryLedger::new());
        let recorder =
            LedgerRecorder::new(store, seeded_directory()).with_mode(ConfirmMode::Async);

        let outcome =
            recorder.record_attendance(&attendance(), &CallerContext::authenticated(55), true);

        let tx = outcome.transaction().expect("transaction recorded");
        assert_eq!(tx.kind, TxKind::AttendanceUpdate);
        assert_eq!(tx.status, TxStatus::Pending);
        assert!(tx.confirmed_at.is_none());
    }

    #[test]
    fn anonymous_write_attributes_to_class_teacher() {
        let store = Arc::new(InMemoryLedger::new());
        let recorder = LedgerRecorder::new(store, seeded_directory());

        let outcome = recorder.record_attendance(&attendance(), &CallerContext::anonymous(), false);
        assert_eq!(outcome.transaction().map(|tx| tx.initiated_by), Some(9));
    }

    #[test]
    fn exhausted_initiator_chain_skips_entry() {
        let store = Arc::new(InMemoryLedger::new());
        let directory = Arc::new(InMemoryDirectory::new());
        let recorder = LedgerRecorder::new(store.clone(), directory);

        let outcome = recorder.record_attendance(&attendance(), &CallerContext::anonymous(), false);
        assert_eq!(outcome, RecordOutcome::SkippedNoInitiator);
        assert_eq!(
            store.list(&TransactionFilter::default()).unwrap().pagination.total,
            0
        );
    }

    struct FailingLedger;

    impl LedgerStore for FailingLedger {
        fn append(&self, _new: NewTransaction) -> Result<LedgerTransaction, LedgerError> {
            Err(LedgerError::Store("disk full".into()))
        }
        fn get(&self, _id: TxId) -> Result<Option<LedgerTransaction>, LedgerError> {
            Ok(None)
        }
        fn list(&self, _filter: &TransactionFilter) -> Result<Page<LedgerTransaction>, LedgerError> {
            Err(LedgerError::Store("disk full".into()))
        }
        fn delete(&self, _id: TxId) -> Result<(), LedgerError> {
            Err(LedgerError::Store("disk full".into()))
        }
        fn compare_and_set_status(
            &self,
            id: TxId,
            _expected: &[TxStatus],
            _new_status: TxStatus,
            _confirmed_at: Option<DateTime<Utc>>,
        ) -> Result<CasOutcome, LedgerError> {
            Err(LedgerError::NotFound(id))
        }
        fn stats(&self) -> Result<crate::traits::LedgerStats, LedgerError> {
            Err(LedgerError::Store("disk full".into()))
        }
    }

    #[test]
    fn store_failure_is_swallowed_into_outcome() {
        let recorder = LedgerRecorder::new(Arc::new(FailingLedger), seeded_directory());

        let outcome =
            recorder.record_attendance(&attendance(), &CallerContext::authenticated(55), false);
        assert_eq!(outcome, RecordOutcome::LedgerWriteFailed);
        assert!(!outcome.is_recorded());
    }

    #[test]
    fn register_certificate_stamps_and_appends() {
        let store = Arc::new(InMemoryLedger::new());
        let recorder = LedgerRecorder::new(store.clone(), seeded_directory());
        let certificates = InMemoryCertificateStore::new();
        let created = certificates
            .create(NewCertificate {
                certificate_number: "CERT-0001".into(),
                student_id: 42,
                issued_by: 5,
                certificate_type: CertificateType::Completion,
                title: "Basic Safety Training".into(),
                date_issued: NaiveDate::from_ymd_opt(2025, 1, 15).unwrap(),
            })
            .unwrap();

        let (stamped, outcome) = recorder
            .register_certificate(&certificates, created.id, &CallerContext::authenticated(100))
            .unwrap();

        assert!(stamped.is_registered());
        let tx = outcome.transaction().expect("transaction recorded");
        assert_eq!(tx.kind, TxKind::CertificateCreation);
        assert_eq!(Some(tx.hash), stamped.fingerprint);

        // Registering again is an update.
        let (_, outcome) = recorder
            .register_certificate(&certificates, created.id, &CallerContext::authenticated(100))
            .unwrap();
        assert_eq!(
            outcome.transaction().map(|tx| tx.kind),
            Some(TxKind::CertificateUpdate)
        );
    }

    #[test]
    fn register_unknown_certificate_is_an_error() {
        let recorder = LedgerRecorder::new(Arc::new(InMemoryLedger::new()), seeded_directory());
        let certificates = InMemoryCertificateStore::new();

        let err = recorder
            .register_certificate(&certificates, 404, &CallerContext::authenticated(1))
            .unwrap_err();
        assert!(matches!(
            err,
            LedgerError::Domain(DomainError::NotFound { .. })
        ));
    }

    #[test]
    fn grade_updates_record_the_update_kind() {
        let store = Arc::new(InMemoryLedger::new());
        let recorder = LedgerRecorder::new(store, seeded_directory());
        let at = Utc.with_ymd_and_hms(2025, 3, 1, 10, 0, 0).unwrap();
        let grade = Grade {
            id: 11,
            student_id: 42,
            class_subject_id: 7,
            academic_year_id: 1,
            semester_id: 2,
            prelim_grade: Some(85.0),
            midterm_grade: Some(88.0),
            final_grade: Some(90.0),
            final_rating: Some(87.9),
            remarks: Some("Passed".into()),
            created_at: at,
            updated_at: at,
        };

        let outcome = recorder.record_grade(&grade, &CallerContext::anonymous(), true);
        assert_eq!(
            outcome.transaction().map(|tx| tx.kind),
            Some(TxKind::GradeUpdate)
        );
    }
}
