use sil_types::Role;

use crate::error::DomainResult;
use crate::records::{AcademicYear, Actor, ClassSubject, Semester, Student, Subject, Teacher};

/// Read boundary for the related entities that contribute to a record's
/// canonical identity, plus the actor roster used by initiator resolution.
///
/// All lookups are by id and return `Ok(None)` for unknown ids; errors are
/// reserved for the storage layer itself.
pub trait Directory: Send + Sync {
    fn student(&self, id: i64) -> DomainResult<Option<Student>>;

    fn teacher(&self, id: i64) -> DomainResult<Option<Teacher>>;

    fn subject(&self, id: i64) -> DomainResult<Option<Subject>>;

    fn class_subject(&self, id: i64) -> DomainResult<Option<ClassSubject>>;

    fn academic_year(&self, id: i64) -> DomainResult<Option<AcademicYear>>;

    fn semester(&self, id: i64) -> DomainResult<Option<Semester>>;

    fn actor(&self, id: i64) -> DomainResult<Option<Actor>>;

    /// The lowest-id actor holding `role`. Used as the last step of the
    /// initiator fallback chain.
    fn first_actor_with_role(&self, role: Role) -> DomainResult<Option<Actor>>;
}
