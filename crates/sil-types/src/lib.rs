//! Foundation types for the School-records Integrity Ledger (SIL).
//!
//! This crate provides the shared vocabulary used throughout the SIL
//! system. Every other SIL crate depends on `sil-types`.
//!
//! # Key Types
//!
//! - [`Fingerprint`] — 256-bit record digest, persisted as 64-char lowercase hex
//! - [`TxId`] — Numeric ledger transaction identifier
//! - [`TxKind`] — What kind of domain event a transaction records
//! - [`TxStatus`] — Transaction lifecycle: pending, confirmed, failed
//! - [`Role`] — Actor role used by initiator attribution and authorization
//! - [`AttendanceStatus`] / [`CertificateType`] — Domain enumerations shared on the wire

pub mod error;
pub mod fingerprint;
pub mod kind;
pub mod page;
pub mod role;
pub mod status;

pub use error::TypeError;
pub use fingerprint::Fingerprint;
pub use kind::TxKind;
pub use page::{Page, PageRequest, Pagination, SortOrder};
pub use role::{AttendanceStatus, CertificateType, Role};
pub use status::TxStatus;

/// Numeric identifier of a ledger transaction.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, serde::Serialize, serde::Deserialize,
)]
#[serde(transparent)]
pub struct TxId(pub u64);

impl std::fmt::Display for TxId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}
