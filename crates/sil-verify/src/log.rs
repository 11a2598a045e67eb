use std::collections::BTreeMap;
use std::sync::RwLock;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use sil_types::{Page, PageRequest, SortOrder, TypeError};

use crate::error::{VerifyError, VerifyResult};

/// One verification attempt against a certificate. Immutable once written;
/// persisted regardless of whether the check matched.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerificationRecord {
    pub id: u64,
    pub certificate_id: i64,
    /// Free-text identity of whoever performed the check; verifiers may be
    /// unauthenticated external parties.
    pub verified_by_name: String,
    pub verified_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

/// Input for appending a verification record.
#[derive(Clone, Debug)]
pub struct NewVerification {
    pub certificate_id: i64,
    pub verified_by_name: String,
    pub verified_at: DateTime<Utc>,
}

/// Sortable verification history columns.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum VerificationSortKey {
    #[default]
    Id,
    VerifiedAt,
}

impl std::str::FromStr for VerificationSortKey {
    type Err = TypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "id" => Ok(Self::Id),
            "verified_at" => Ok(Self::VerifiedAt),
            other => Err(TypeError::UnknownKind(other.to_string())),
        }
    }
}

/// Verification history filter.
#[derive(Clone, Debug, Default)]
pub struct VerificationFilter {
    pub search: Option<String>,
    pub certificate_id: Option<i64>,
    pub verified_by_name: Option<String>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub sort_by: VerificationSortKey,
    pub sort_order: SortOrder,
    pub page: PageRequest,
}

/// Store boundary for the verification history.
pub trait VerificationLog: Send + Sync {
    fn append(&self, new: NewVerification) -> VerifyResult<VerificationRecord>;

    fn get(&self, id: u64) -> VerifyResult<Option<VerificationRecord>>;

    fn list(&self, filter: &VerificationFilter) -> VerifyResult<Page<VerificationRecord>>;

    fn delete(&self, id: u64) -> VerifyResult<()>;

    fn count(&self) -> VerifyResult<u64>;
}

/// In-memory verification log.
#[derive(Default)]
pub struct InMemoryVerificationLog {
    inner: RwLock<LogState>,
}

#[derive(Default)]
struct LogState {
    next_id: u64,
    records: BTreeMap<u64, VerificationRecord>,
}

impl InMemoryVerificationLog {
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> VerifyResult<std::sync::RwLockReadGuard<'_, LogState>> {
        self.inner
            .read()
            .map_err(|_| VerifyError::Store("verification log lock poisoned".into()))
    }

    fn write(&self) -> VerifyResult<std::sync::RwLockWriteGuard<'_, LogState>> {
        self.inner
            .write()
            .map_err(|_| VerifyError::Store("verification log lock poisoned".into()))
    }

    fn matches(filter: &VerificationFilter, record: &VerificationRecord) -> bool {
        if let Some(search) = &filter.search {
            let needle = search.to_lowercase();
            if !record.verified_by_name.to_lowercase().contains(&needle) {
                return false;
            }
        }
        if let Some(certificate_id) = filter.certificate_id {
            if record.certificate_id != certificate_id {
                return false;
            }
        }
        if let Some(name) = &filter.verified_by_name {
            if !record
                .verified_by_name
                .eq_ignore_ascii_case(name)
            {
                return false;
            }
        }
        let verified_on = record.verified_at.date_naive();
        if let Some(start) = filter.start_date {
            if verified_on < start {
                return false;
            }
        }
        if let Some(end) = filter.end_date {
            if verified_on > end {
                return false;
            }
        }
        true
    }
}

impl VerificationLog for InMemoryVerificationLog {
    fn append(&self, new: NewVerification) -> VerifyResult<VerificationRecord> {
        let mut state = self.write()?;
        state.next_id += 1;
        let record = VerificationRecord {
            id: state.next_id,
            certificate_id: new.certificate_id,
            verified_by_name: new.verified_by_name,
            verified_at: new.verified_at,
            created_at: Utc::now(),
        };
        state.records.insert(record.id, record.clone());
        Ok(record)
    }

    fn get(&self, id: u64) -> VerifyResult<Option<VerificationRecord>> {
        Ok(self.read()?.records.get(&id).cloned())
    }

    fn list(&self, filter: &VerificationFilter) -> VerifyResult<Page<VerificationRecord>> {
        let state = self.read()?;
        let mut matched: Vec<VerificationRecord> = state
            .records
            .values()
            .filter(|record| Self::matches(filter, record))
            .cloned()
            .collect();

        matched.sort_by(|a, b| {
            let ordering = match filter.sort_by {
                VerificationSortKey::Id => a.id.cmp(&b.id),
                VerificationSortKey::VerifiedAt => a.verified_at.cmp(&b.verified_at),
            };
            match filter.sort_order {
                SortOrder::Asc => ordering,
                SortOrder::Desc => ordering.reverse(),
            }
        });

        Ok(Page::from_items(matched, filter.page))
    }

    fn delete(&self, id: u64) -> VerifyResult<()> {
        let mut state = self.write()?;
        state
            .records
            .remove(&id)
            .map(|_| ())
            .ok_or(VerifyError::RecordNotFound(id))
    }

    fn count(&self) -> VerifyResult<u64> {
        Ok(self.read()?.records.len() as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_verification(certificate_id: i64, name: &str) -> NewVerification {
        NewVerification {
            certificate_id,
            verified_by_name: name.into(),
            verified_at: Utc::now(),
        }
    }

    #[test]
    fn append_assigns_sequential_ids() {
        let log = InMemoryVerificationLog::new();
        let a = log.append(new_verification(1, "Jane Q.")).unwrap();
        let b = log.append(new_verification(1, "Crew Agency")).unwrap();
        assert_eq!(a.id, 1);
        assert_eq!(b.id, 2);
        assert_eq!(log.count().unwrap(), 2);
    }

    #[test]
    fn list_filters_by_certificate_and_name() {
        let log = InMemoryVerificationLog::new();
        log.append(new_verification(1, "Jane Q.")).unwrap();
        log.append(new_verification(2, "Jane Q.")).unwrap();
        log.append(new_verification(1, "Crew Agency")).unwrap();

        let page = log
            .list(&VerificationFilter {
                certificate_id: Some(1),
                ..Default::default()
            })
            .unwrap();
        assert_eq!(page.pagination.total, 2);

        let page = log
            .list(&VerificationFilter {
                verified_by_name: Some("jane q.".into()),
                ..Default::default()
            })
            .unwrap();
        assert_eq!(page.pagination.total, 2);

        let page = log
            .list(&VerificationFilter {
                search: Some("agency".into()),
                ..Default::default()
            })
            .unwrap();
        assert_eq!(page.pagination.total, 1);
    }

    #[test]
    fn delete_removes_record() {
        let log = InMemoryVerificationLog::new();
        let record = log.append(new_verification(1, "Jane Q.")).unwrap();
        log.delete(record.id).unwrap();
        assert!(log.get(record.id).unwrap().is_none());
        assert_eq!(
            log.delete(record.id).unwrap_err(),
            VerifyError::RecordNotFound(record.id)
        );
    }

    #[test]
    fn date_window_filters_history() {
        let log = InMemoryVerificationLog::new();
        log.append(NewVerification {
            certificate_id: 1,
            verified_by_name: "Old Check".into(),
            verified_at: "2024-06-01T10:00:00Z".parse().unwrap(),
        })
        .unwrap();
        log.append(NewVerification {
            certificate_id: 1,
            verified_by_name: "New Check".into(),
            verified_at: "2025-06-01T10:00:00Z".parse().unwrap(),
        })
        .unwrap();

        let page = log
            .list(&VerificationFilter {
                start_date: NaiveDate::from_ymd_opt(2025, 1, 1),
                ..Default::default()
            })
            .unwrap();
        assert_eq!(page.pagination.total, 1);
        assert_eq!(page.items[0].verified_by_name, "New Check");
    }
}
