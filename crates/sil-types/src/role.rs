use std::fmt;

use serde::{Deserialize, Serialize};

/// Role held by an actor in the school-records system.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    Teacher,
    Student,
    Parent,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Admin => f.write_str("admin"),
            Self::Teacher => f.write_str("teacher"),
            Self::Student => f.write_str("student"),
            Self::Parent => f.write_str("parent"),
        }
    }
}

/// Attendance entry status. Wire names keep the capitalized form used by
/// the records UI ("Present", "Absent", ...).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AttendanceStatus {
    Present,
    Absent,
    Late,
    Excused,
}

impl AttendanceStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Present => "Present",
            Self::Absent => "Absent",
            Self::Late => "Late",
            Self::Excused => "Excused",
        }
    }
}

impl fmt::Display for AttendanceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Certificate category.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CertificateType {
    Completion,
    Achievement,
    #[serde(rename = "Maritime Certificate")]
    MaritimeCertificate,
}

impl CertificateType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Completion => "Completion",
            Self::Achievement => "Achievement",
            Self::MaritimeCertificate => "Maritime Certificate",
        }
    }
}

impl fmt::Display for CertificateType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for CertificateType {
    type Err = crate::error::TypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Completion" => Ok(Self::Completion),
            "Achievement" => Ok(Self::Achievement),
            "Maritime Certificate" => Ok(Self::MaritimeCertificate),
            other => Err(crate::error::TypeError::UnknownKind(other.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn role_wire_names() {
        assert_eq!(serde_json::to_string(&Role::Admin).unwrap(), "\"admin\"");
        assert_eq!(
            serde_json::from_str::<Role>("\"teacher\"").unwrap(),
            Role::Teacher
        );
    }

    #[test]
    fn attendance_status_keeps_capitalized_form() {
        assert_eq!(
            serde_json::to_string(&AttendanceStatus::Present).unwrap(),
            "\"Present\""
        );
        assert_eq!(AttendanceStatus::Excused.as_str(), "Excused");
    }

    #[test]
    fn maritime_certificate_wire_name_has_space() {
        assert_eq!(
            serde_json::to_string(&CertificateType::MaritimeCertificate).unwrap(),
            "\"Maritime Certificate\""
        );
        assert_eq!(
            serde_json::from_str::<CertificateType>("\"Maritime Certificate\"").unwrap(),
            CertificateType::MaritimeCertificate
        );
    }
}
