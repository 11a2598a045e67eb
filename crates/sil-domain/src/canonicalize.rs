use std::collections::HashMap;

use sil_canonical::{CanonicalError, FingerprintHasher, Snapshot};
use sil_types::Fingerprint;

use crate::directory::Directory;
use crate::error::DomainResult;
use crate::records::{
    AcademicYear, Attendance, Certificate, ClassSubject, Grade, Semester, Student, Subject, Teacher,
};

/// Explicit, cached resolution of the related-entity fields a canonical
/// snapshot needs.
///
/// One resolver is built per canonicalization context. Every lookup goes
/// through a per-entity cache, so repeated canonicalization of the same
/// record through the same resolver never refetches, including negative
/// results. Lookup failures degrade to `None` (the dependent snapshot
/// fields become null); they never abort canonicalization.
pub struct RelationResolver<'a> {
    directory: &'a dyn Directory,
    students: HashMap<i64, Option<Student>>,
    teachers: HashMap<i64, Option<Teacher>>,
    subjects: HashMap<i64, Option<Subject>>,
    class_subjects: HashMap<i64, Option<ClassSubject>>,
    academic_years: HashMap<i64, Option<AcademicYear>>,
    semesters: HashMap<i64, Option<Semester>>,
}

impl<'a> RelationResolver<'a> {
    pub fn new(directory: &'a dyn Directory) -> Self {
        Self {
            directory,
            students: HashMap::new(),
            teachers: HashMap::new(),
            subjects: HashMap::new(),
            class_subjects: HashMap::new(),
            academic_years: HashMap::new(),
            semesters: HashMap::new(),
        }
    }

    fn cached<T: Clone>(
        cache: &mut HashMap<i64, Option<T>>,
        id: i64,
        fetch: impl FnOnce() -> DomainResult<Option<T>>,
    ) -> Option<T> {
        cache
            .entry(id)
            .or_insert_with(|| match fetch() {
                Ok(found) => found,
                Err(error) => {
                    tracing::debug!(id, %error, "relation lookup failed; field degrades to null");
                    None
                }
            })
            .clone()
    }

    pub fn student(&mut self, id: i64) -> Option<Student> {
        Self::cached(&mut self.students, id, || self.directory.student(id))
    }

    pub fn teacher(&mut self, id: i64) -> Option<Teacher> {
        Self::cached(&mut self.teachers, id, || self.directory.teacher(id))
    }

    pub fn subject(&mut self, id: i64) -> Option<Subject> {
        Self::cached(&mut self.subjects, id, || self.directory.subject(id))
    }

    pub fn class_subject(&mut self, id: i64) -> Option<ClassSubject> {
        Self::cached(&mut self.class_subjects, id, || {
            self.directory.class_subject(id)
        })
    }

    pub fn academic_year(&mut self, id: i64) -> Option<AcademicYear> {
        Self::cached(&mut self.academic_years, id, || {
            self.directory.academic_year(id)
        })
    }

    pub fn semester(&mut self, id: i64) -> Option<Semester> {
        Self::cached(&mut self.semesters, id, || self.directory.semester(id))
    }

    pub fn student_name(&mut self, id: i64) -> Option<String> {
        self.student(id).map(|s| s.full_name())
    }

    /// The subject taught in a class-subject relation.
    pub fn subject_of_class(&mut self, class_subject_id: i64) -> Option<Subject> {
        let subject_id = self.class_subject(class_subject_id)?.subject_id;
        self.subject(subject_id)
    }

    /// The teacher assigned to a class-subject relation.
    pub fn teacher_of_class(&mut self, class_subject_id: i64) -> Option<Teacher> {
        let teacher_id = self.class_subject(class_subject_id)?.teacher_id?;
        self.teacher(teacher_id)
    }

    /// The actor account behind a class-subject's teacher, if any. Used by
    /// the initiator fallback chain.
    pub fn class_teacher_actor_id(&mut self, class_subject_id: i64) -> Option<i64> {
        self.teacher_of_class(class_subject_id)?.actor_id
    }
}

/// A record that can be reduced to a canonical snapshot and fingerprinted.
pub trait Canonicalize {
    /// The domain-separated hasher for this record type.
    const HASHER: FingerprintHasher;

    /// Assemble the canonical snapshot. Must not mutate the record; all
    /// related data goes through `resolver`.
    fn canonicalize(&self, resolver: &mut RelationResolver<'_>) -> Snapshot;
}

/// Canonicalize and hash a record in one step.
pub fn fingerprint_record<R: Canonicalize>(
    record: &R,
    resolver: &mut RelationResolver<'_>,
) -> Result<Fingerprint, CanonicalError> {
    R::HASHER.hash_snapshot(&record.canonicalize(resolver))
}

impl Canonicalize for Attendance {
    const HASHER: FingerprintHasher = FingerprintHasher::ATTENDANCE;

    fn canonicalize(&self, resolver: &mut RelationResolver<'_>) -> Snapshot {
        let subject = resolver.subject_of_class(self.class_subject_id);
        let mut snapshot = Snapshot::new();
        snapshot
            .set("attendance_id", self.id)
            .set("student_id", self.student_id)
            .set("student_name", resolver.student_name(self.student_id))
            .set("class_subject_id", self.class_subject_id)
            .set("subject_code", subject.as_ref().map(|s| s.code.clone()))
            .set("subject_name", subject.map(|s| s.name))
            .set(
                "attendance_date",
                self.attendance_date.format("%Y-%m-%d").to_string(),
            )
            .set("status", self.status.as_str())
            .set("created_at", self.created_at.to_rfc3339())
            .set("updated_at", self.updated_at.to_rfc3339())
            // Capture instant of the durable write the fingerprint reflects.
            .set("captured_at", self.updated_at.to_rfc3339());
        snapshot
    }
}

impl Canonicalize for Grade {
    const HASHER: FingerprintHasher = FingerprintHasher::GRADE;

    fn canonicalize(&self, resolver: &mut RelationResolver<'_>) -> Snapshot {
        let subject = resolver.subject_of_class(self.class_subject_id);
        let mut snapshot = Snapshot::new();
        snapshot
            .set("grade_id", self.id)
            .set("student_id", self.student_id)
            .set("student_name", resolver.student_name(self.student_id))
            .set("class_subject_id", self.class_subject_id)
            .set("subject_code", subject.as_ref().map(|s| s.code.clone()))
            .set("subject_name", subject.map(|s| s.name))
            .set("academic_year_id", self.academic_year_id)
            .set(
                "academic_year",
                resolver
                    .academic_year(self.academic_year_id)
                    .map(|y| y.year_name),
            )
            .set("semester_id", self.semester_id)
            .set(
                "semester",
                resolver.semester(self.semester_id).map(|s| s.semester_name),
            )
            .set("prelim_grade", self.prelim_grade)
            .set("midterm_grade", self.midterm_grade)
            .set("final_grade", self.final_grade)
            .set("final_rating", self.final_rating)
            .set("remarks", self.remarks.clone())
            .set("created_at", self.created_at.to_rfc3339())
            .set("updated_at", self.updated_at.to_rfc3339())
            .set("captured_at", self.updated_at.to_rfc3339());
        snapshot
    }
}

impl Canonicalize for Certificate {
    const HASHER: FingerprintHasher = FingerprintHasher::CERTIFICATE;

    fn canonicalize(&self, resolver: &mut RelationResolver<'_>) -> Snapshot {
        let mut snapshot = Snapshot::new();
        snapshot
            .set("certificate_id", self.id)
            .set("certificate_number", self.certificate_number.clone())
            .set("student_id", self.student_id)
            .set("student_name", resolver.student_name(self.student_id))
            .set("issued_by", self.issued_by)
            .set(
                "issuer_name",
                resolver.teacher(self.issued_by).map(|t| t.full_name()),
            )
            .set("certificate_type", self.certificate_type.as_str())
            .set("title", self.title.clone())
            .set(
                "date_issued",
                self.date_issued.format("%Y-%m-%d").to_string(),
            )
            .set("created_at", self.created_at.to_rfc3339())
            .set("updated_at", self.updated_at.to_rfc3339())
            .set("captured_at", self.updated_at.to_rfc3339());
        snapshot
    }
}
