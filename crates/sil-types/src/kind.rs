use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::TypeError;

/// What kind of domain event a ledger transaction records.
///
/// Wire representation is snake_case (`attendance_creation`, ...), matching
/// the persisted transaction rows and the HTTP filter parameters.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TxKind {
    AttendanceCreation,
    AttendanceUpdate,
    GradeCreation,
    GradeUpdate,
    CertificateCreation,
    CertificateUpdate,
    Verification,
}

impl TxKind {
    pub const ALL: [TxKind; 7] = [
        TxKind::AttendanceCreation,
        TxKind::AttendanceUpdate,
        TxKind::GradeCreation,
        TxKind::GradeUpdate,
        TxKind::CertificateCreation,
        TxKind::CertificateUpdate,
        TxKind::Verification,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::AttendanceCreation => "attendance_creation",
            Self::AttendanceUpdate => "attendance_update",
            Self::GradeCreation => "grade_creation",
            Self::GradeUpdate => "grade_update",
            Self::CertificateCreation => "certificate_creation",
            Self::CertificateUpdate => "certificate_update",
            Self::Verification => "verification",
        }
    }
}

impl fmt::Display for TxKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TxKind {
    type Err = TypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .find(|kind| kind.as_str() == s)
            .copied()
            .ok_or_else(|| TypeError::UnknownKind(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wire_names_are_snake_case() {
        let json = serde_json::to_string(&TxKind::AttendanceCreation).unwrap();
        assert_eq!(json, "\"attendance_creation\"");
        let json = serde_json::to_string(&TxKind::CertificateUpdate).unwrap();
        assert_eq!(json, "\"certificate_update\"");
    }

    #[test]
    fn parse_roundtrip_for_all_kinds() {
        for kind in TxKind::ALL {
            assert_eq!(kind.as_str().parse::<TxKind>().unwrap(), kind);
        }
    }

    #[test]
    fn unknown_kind_rejected() {
        let err = "certificate_revocation".parse::<TxKind>().unwrap_err();
        assert_eq!(
            err,
            TypeError::UnknownKind("certificate_revocation".into())
        );
    }

    #[test]
    fn display_matches_wire_name() {
        assert_eq!(format!("{}", TxKind::GradeUpdate), "grade_update");
    }
}
