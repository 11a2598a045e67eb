use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use sil_types::{CertificateType, Fingerprint, Page, PageRequest, SortOrder, TypeError};

use crate::error::DomainResult;
use crate::records::Certificate;

/// Fields for creating a certificate.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct NewCertificate {
    pub certificate_number: String,
    pub student_id: i64,
    pub issued_by: i64,
    pub certificate_type: CertificateType,
    pub title: String,
    pub date_issued: NaiveDate,
}

/// Partial update of a certificate's business fields.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct CertificateUpdate {
    pub student_id: Option<i64>,
    pub issued_by: Option<i64>,
    pub certificate_type: Option<CertificateType>,
    pub title: Option<String>,
    pub date_issued: Option<NaiveDate>,
}

/// Sortable certificate listing columns.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum CertificateSortKey {
    #[default]
    Id,
    CertificateNumber,
    DateIssued,
    CreatedAt,
}

impl std::str::FromStr for CertificateSortKey {
    type Err = TypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "id" => Ok(Self::Id),
            "certificate_number" => Ok(Self::CertificateNumber),
            "date_issued" => Ok(Self::DateIssued),
            "created_at" => Ok(Self::CreatedAt),
            other => Err(TypeError::UnknownKind(other.to_string())),
        }
    }
}

/// Certificate listing filter. A read-side concern: everything here is
/// optional and compositional.
#[derive(Clone, Debug, Default)]
pub struct CertificateFilter {
    pub search: Option<String>,
    pub certificate_type: Option<CertificateType>,
    pub student_id: Option<i64>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub sort_by: CertificateSortKey,
    pub sort_order: SortOrder,
    pub page: PageRequest,
}

/// Aggregate certificate counts for the stats endpoint.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CertificateCounts {
    pub total: u64,
    pub registered: u64,
    pub unregistered: u64,
}

/// Write/read boundary for certificates.
pub trait CertificateStore: Send + Sync {
    fn create(&self, new: NewCertificate) -> DomainResult<Certificate>;

    fn update(&self, id: i64, changes: CertificateUpdate) -> DomainResult<Certificate>;

    fn delete(&self, id: i64) -> DomainResult<()>;

    fn get(&self, id: i64) -> DomainResult<Option<Certificate>>;

    fn get_by_number(&self, number: &str) -> DomainResult<Option<Certificate>>;

    fn find_by_fingerprint(&self, fingerprint: &Fingerprint) -> DomainResult<Option<Certificate>>;

    fn list(&self, filter: &CertificateFilter) -> DomainResult<Page<Certificate>>;

    /// Stamp the ledger fingerprint onto a certificate.
    ///
    /// Not a business change: `updated_at` stays put, so a later
    /// re-verification canonicalizes exactly the state that was hashed.
    fn set_fingerprint(
        &self,
        id: i64,
        fingerprint: Fingerprint,
        at: DateTime<Utc>,
    ) -> DomainResult<Certificate>;

    fn counts(&self) -> DomainResult<CertificateCounts>;
}
