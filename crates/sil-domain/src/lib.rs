//! Domain records for the School-records Integrity Ledger (SIL).
//!
//! This crate owns the fingerprintable records (attendance entries, grade
//! entries, certificates) and the related entities that contribute to
//! their canonical identity (students, subjects, terms, actors). It
//! provides:
//! - Record and related-entity types
//! - The [`Directory`] lookup boundary with an in-memory implementation
//! - [`Canonicalize`]: per-record canonical snapshot assembly over an
//!   explicit, cached [`RelationResolver`]
//! - The [`CertificateStore`] boundary with filters and pagination

pub mod canonicalize;
pub mod directory;
pub mod error;
pub mod memory;
pub mod records;
pub mod store;

pub use canonicalize::{fingerprint_record, Canonicalize, RelationResolver};
pub use directory::Directory;
pub use error::{DomainError, DomainResult};
pub use memory::{InMemoryCertificateStore, InMemoryDirectory};
pub use records::{
    AcademicYear, Actor, Attendance, Certificate, ClassSubject, Grade, Semester, Student, Subject,
    Teacher,
};
pub use store::{
    CertificateCounts, CertificateFilter, CertificateSortKey, CertificateStore, CertificateUpdate,
    NewCertificate,
};
