use std::collections::BTreeMap;
use std::sync::RwLock;

use chrono::{DateTime, Utc};

use sil_types::{Fingerprint, Page, Role, SortOrder};

use crate::directory::Directory;
use crate::error::{DomainError, DomainResult};
use crate::records::{
    AcademicYear, Actor, Certificate, ClassSubject, Semester, Student, Subject, Teacher,
};
use crate::store::{
    CertificateCounts, CertificateFilter, CertificateSortKey, CertificateStore, CertificateUpdate,
    NewCertificate,
};

/// In-memory directory for tests, local demos, and embedding.
#[derive(Default)]
pub struct InMemoryDirectory {
    inner: RwLock<DirectoryState>,
}

#[derive(Default)]
struct DirectoryState {
    actors: BTreeMap<i64, Actor>,
    students: BTreeMap<i64, Student>,
    teachers: BTreeMap<i64, Teacher>,
    subjects: BTreeMap<i64, Subject>,
    class_subjects: BTreeMap<i64, ClassSubject>,
    academic_years: BTreeMap<i64, AcademicYear>,
    semesters: BTreeMap<i64, Semester>,
}

impl InMemoryDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> DomainResult<std::sync::RwLockReadGuard<'_, DirectoryState>> {
        self.inner
            .read()
            .map_err(|_| DomainError::Store("directory lock poisoned".into()))
    }

    fn write(&self) -> DomainResult<std::sync::RwLockWriteGuard<'_, DirectoryState>> {
        self.inner
            .write()
            .map_err(|_| DomainError::Store("directory lock poisoned".into()))
    }

    pub fn insert_actor(&self, actor: Actor) {
        if let Ok(mut state) = self.write() {
            state.actors.insert(actor.id, actor);
        }
    }

    pub fn insert_student(&self, student: Student) {
        if let Ok(mut state) = self.write() {
            state.students.insert(student.id, student);
        }
    }

    pub fn insert_teacher(&self, teacher: Teacher) {
        if let Ok(mut state) = self.write() {
            state.teachers.insert(teacher.id, teacher);
        }
    }

    pub fn insert_subject(&self, subject: Subject) {
        if let Ok(mut state) = self.write() {
            state.subjects.insert(subject.id, subject);
        }
    }

    pub fn insert_class_subject(&self, class_subject: ClassSubject) {
        if let Ok(mut state) = self.write() {
            state.class_subjects.insert(class_subject.id, class_subject);
        }
    }

    pub fn insert_academic_year(&self, year: AcademicYear) {
        if let Ok(mut state) = self.write() {
            state.academic_years.insert(year.id, year);
        }
    }

    pub fn insert_semester(&self, semester: Semester) {
        if let Ok(mut state) = self.write() {
            state.semesters.insert(semester.id, semester);
        }
    }
}

impl Directory for InMemoryDirectory {
    fn student(&self, id: i64) -> DomainResult<Option<Student>> {
        Ok(self.read()?.students.get(&id).cloned())
    }

    fn teacher(&self, id: i64) -> DomainResult<Option<Teacher>> {
        Ok(self.read()?.teachers.get(&id).cloned())
    }

    fn subject(&self, id: i64) -> DomainResult<Option<Subject>> {
        Ok(self.read()?.subjects.get(&id).cloned())
    }

    fn class_subject(&self, id: i64) -> DomainResult<Option<ClassSubject>> {
        Ok(self.read()?.class_subjects.get(&id).cloned())
    }

    fn academic_year(&self, id: i64) -> DomainResult<Option<AcademicYear>> {
        Ok(self.read()?.academic_years.get(&id).cloned())
    }

    fn semester(&self, id: i64) -> DomainResult<Option<Semester>> {
        Ok(self.read()?.semesters.get(&id).cloned())
    }

    fn actor(&self, id: i64) -> DomainResult<Option<Actor>> {
        Ok(self.read()?.actors.get(&id).cloned())
    }

    fn first_actor_with_role(&self, role: Role) -> DomainResult<Option<Actor>> {
        // BTreeMap iteration order makes "first" the lowest id.
        Ok(self
            .read()?
            .actors
            .values()
            .find(|actor| actor.role == role)
            .cloned())
    }
}

/// In-memory certificate store.
#[derive(Default)]
pub struct InMemoryCertificateStore {
    inner: RwLock<CertificateState>,
}

#[derive(Default)]
struct CertificateState {
    next_id: i64,
    certificates: BTreeMap<i64, Certificate>,
}

impl InMemoryCertificateStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> DomainResult<std::sync::RwLockReadGuard<'_, CertificateState>> {
        self.inner
            .read()
            .map_err(|_| DomainError::Store("certificate store lock poisoned".into()))
    }

    fn write(&self) -> DomainResult<std::sync::RwLockWriteGuard<'_, CertificateState>> {
        self.inner
            .write()
            .map_err(|_| DomainError::Store("certificate store lock poisoned".into()))
    }

    fn matches(filter: &CertificateFilter, certificate: &Certificate) -> bool {
        if let Some(search) = &filter.search {
            let needle = search.to_lowercase();
            let hit = certificate
                .certificate_number
                .to_lowercase()
                .contains(&needle)
                || certificate.title.to_lowercase().contains(&needle);
            if !hit {
                return false;
            }
        }
        if let Some(kind) = filter.certificate_type {
            if certificate.certificate_type != kind {
                return false;
            }
        }
        if let Some(student_id) = filter.student_id {
            if certificate.student_id != student_id {
                return false;
            }
        }
        if let Some(start) = filter.start_date {
            if certificate.date_issued < start {
                return false;
            }
        }
        if let Some(end) = filter.end_date {
            if certificate.date_issued > end {
                return false;
            }
        }
        true
    }
}

impl CertificateStore for InMemoryCertificateStore {
    fn create(&self, new: NewCertificate) -> DomainResult<Certificate> {
        let mut state = self.write()?;
        let duplicate = state
            .certificates
            .values()
            .any(|c| c.certificate_number == new.certificate_number);
        if duplicate {
            return Err(DomainError::DuplicateCertificateNumber(
                new.certificate_number,
            ));
        }

        state.next_id += 1;
        let now = Utc::now();
        let certificate = Certificate {
            id: state.next_id,
            certificate_number: new.certificate_number,
            student_id: new.student_id,
            issued_by: new.issued_by,
            certificate_type: new.certificate_type,
            title: new.title,
            date_issued: new.date_issued,
            fingerprint: None,
            fingerprinted_at: None,
            created_at: now,
            updated_at: now,
        };
        state.certificates.insert(certificate.id, certificate.clone());
        Ok(certificate)
    }

    fn update(&self, id: i64, changes: CertificateUpdate) -> DomainResult<Certificate> {
        let mut state = self.write()?;
        let certificate = state
            .certificates
            .get_mut(&id)
            .ok_or(DomainError::NotFound {
                entity: "certificate",
                id: id as u64,
            })?;

        if let Some(student_id) = changes.student_id {
            certificate.student_id = student_id;
        }
        if let Some(issued_by) = changes.issued_by {
            certificate.issued_by = issued_by;
        }
        if let Some(kind) = changes.certificate_type {
            certificate.certificate_type = kind;
        }
        if let Some(title) = changes.title {
            certificate.title = title;
        }
        if let Some(date_issued) = changes.date_issued {
            certificate.date_issued = date_issued;
        }
        certificate.updated_at = Utc::now();
        Ok(certificate.clone())
    }

    fn delete(&self, id: i64) -> DomainResult<()> {
        let mut state = self.write()?;
        state
            .certificates
            .remove(&id)
            .map(|_| ())
            .ok_or(DomainError::NotFound {
                entity: "certificate",
                id: id as u64,
            })
    }

    fn get(&self, id: i64) -> DomainResult<Option<Certificate>> {
        Ok(self.read()?.certificates.get(&id).cloned())
    }

    fn get_by_number(&self, number: &str) -> DomainResult<Option<Certificate>> {
        Ok(self
            .read()?
            .certificates
            .values()
            .find(|c| c.certificate_number == number)
            .cloned())
    }

    fn find_by_fingerprint(&self, fingerprint: &Fingerprint) -> DomainResult<Option<Certificate>> {
        Ok(self
            .read()?
            .certificates
            .values()
            .find(|c| c.fingerprint.as_ref() == Some(fingerprint))
            .cloned())
    }

    fn list(&self, filter: &CertificateFilter) -> DomainResult<Page<Certificate>> {
        let state = self.read()?;
        let mut matched: Vec<Certificate> = state
            .certificates
            .values()
            .filter(|c| Self::matches(filter, c))
            .cloned()
            .collect();

        matched.sort_by(|a, b| {
            let ordering = match filter.sort_by {
                CertificateSortKey::Id => a.id.cmp(&b.id),
                CertificateSortKey::CertificateNumber => {
                    a.certificate_number.cmp(&b.certificate_number)
                }
                CertificateSortKey::DateIssued => a.date_issued.cmp(&b.date_issued),
                CertificateSortKey::CreatedAt => a.created_at.cmp(&b.created_at),
            };
            match filter.sort_order {
                SortOrder::Asc => ordering,
                SortOrder::Desc => ordering.reverse(),
            }
        });

        Ok(Page::from_items(matched, filter.page))
    }

    fn set_fingerprint(
        &self,
        id: i64,
        fingerprint: Fingerprint,
        at: DateTime<Utc>,
    ) -> DomainResult<Certificate> {
        let mut state = self.write()?;
        let certificate = state
            .certificates
            .get_mut(&id)
            .ok_or(DomainError::NotFound {
                entity: "certificate",
                id: id as u64,
            })?;
        certificate.fingerprint = Some(fingerprint);
        certificate.fingerprinted_at = Some(at);
        // updated_at untouched: the stamp must not invalidate the hash.
        Ok(certificate.clone())
    }

    fn counts(&self) -> DomainResult<CertificateCounts> {
        let state = self.read()?;
        let total = state.certificates.len() as u64;
        let registered = state
            .certificates
            .values()
            .filter(|c| c.is_registered())
            .count() as u64;
        Ok(CertificateCounts {
            total,
            registered,
            unregistered: total - registered,
        })
    }
}
