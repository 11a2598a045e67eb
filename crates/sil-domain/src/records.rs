use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use sil_types::{AttendanceStatus, CertificateType, Fingerprint, Role};

/// A user account that can be attributed as a transaction initiator.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Actor {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub role: Role,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Student {
    pub id: i64,
    pub student_number: String,
    pub first_name: String,
    pub last_name: String,
}

impl Student {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

/// A teaching staff member. `actor_id` links into the account roster when
/// the teacher has a login.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Teacher {
    pub id: i64,
    pub actor_id: Option<i64>,
    pub first_name: String,
    pub last_name: String,
}

impl Teacher {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Subject {
    pub id: i64,
    pub code: String,
    pub name: String,
}

/// A subject taught to a class section, optionally by a specific teacher.
/// Attendance and grade entries hang off this relation.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassSubject {
    pub id: i64,
    pub subject_id: i64,
    pub teacher_id: Option<i64>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AcademicYear {
    pub id: i64,
    pub year_name: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Semester {
    pub id: i64,
    pub semester_name: String,
}

/// One attendance entry: a student's status for a class subject on a date.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attendance {
    pub id: i64,
    pub student_id: i64,
    pub class_subject_id: i64,
    pub attendance_date: NaiveDate,
    pub status: AttendanceStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// One grade entry for a student in a class subject and term.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Grade {
    pub id: i64,
    pub student_id: i64,
    pub class_subject_id: i64,
    pub academic_year_id: i64,
    pub semester_id: i64,
    pub prelim_grade: Option<f64>,
    pub midterm_grade: Option<f64>,
    pub final_grade: Option<f64>,
    pub final_rating: Option<f64>,
    pub remarks: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Grade {
    /// Weighted term rating: prelim 30%, midterm 30%, final 40%.
    pub fn computed_final_rating(&self) -> Option<f64> {
        match (self.prelim_grade, self.midterm_grade, self.final_grade) {
            (Some(prelim), Some(midterm), Some(fin)) => {
                let rating = prelim * 0.3 + midterm * 0.3 + fin * 0.4;
                Some((rating * 100.0).round() / 100.0)
            }
            _ => None,
        }
    }
}

/// An issued certificate. `fingerprint` is stamped by the ledger when the
/// certificate is registered; `None` means not yet registered.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Certificate {
    pub id: i64,
    pub certificate_number: String,
    pub student_id: i64,
    pub issued_by: i64,
    pub certificate_type: CertificateType,
    pub title: String,
    pub date_issued: NaiveDate,
    pub fingerprint: Option<Fingerprint>,
    pub fingerprinted_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Certificate {
    pub fn is_registered(&self) -> bool {
        self.fingerprint.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn student_full_name() {
        let student = Student {
            id: 1,
            student_number: "S-0042".into(),
            first_name: "Jane".into(),
            last_name: "Cruz".into(),
        };
        assert_eq!(student.full_name(), "Jane Cruz");
    }

    #[test]
    fn final_rating_requires_all_three_terms() {
        let mut grade = Grade {
            id: 1,
            student_id: 1,
            class_subject_id: 1,
            academic_year_id: 1,
            semester_id: 1,
            prelim_grade: Some(80.0),
            midterm_grade: Some(90.0),
            final_grade: None,
            final_rating: None,
            remarks: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        assert_eq!(grade.computed_final_rating(), None);

        grade.final_grade = Some(85.0);
        assert_eq!(grade.computed_final_rating(), Some(85.0));
    }

    #[test]
    fn rating_rounds_to_two_decimals() {
        let grade = Grade {
            id: 1,
            student_id: 1,
            class_subject_id: 1,
            academic_year_id: 1,
            semester_id: 1,
            prelim_grade: Some(81.25),
            midterm_grade: Some(77.5),
            final_grade: Some(88.33),
            final_rating: None,
            remarks: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        // 81.25*0.3 + 77.5*0.3 + 88.33*0.4 = 82.957
        assert_eq!(grade.computed_final_rating(), Some(82.96));
    }

    #[test]
    fn certificate_registration_flag() {
        let cert = Certificate {
            id: 1,
            certificate_number: "CERT-0001".into(),
            student_id: 1,
            issued_by: 1,
            certificate_type: CertificateType::Completion,
            title: "Basic Safety Training".into(),
            date_issued: NaiveDate::from_ymd_opt(2025, 1, 10).unwrap(),
            fingerprint: None,
            fingerprinted_at: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        assert!(!cert.is_registered());
    }
}
