use sil_types::Fingerprint;

use crate::error::CanonicalError;
use crate::snapshot::Snapshot;

/// Domain-separated BLAKE3 fingerprint hasher.
///
/// Each hasher carries a domain tag (e.g., `"sil-attendance-v1"`) that is
/// prepended to every hash computation. This prevents cross-record-type
/// collisions: an attendance snapshot and a grade snapshot with identical
/// content produce different fingerprints.
pub struct FingerprintHasher {
    domain: &'static str,
}

impl FingerprintHasher {
    /// Hasher for attendance entries.
    pub const ATTENDANCE: Self = Self {
        domain: "sil-attendance-v1",
    };
    /// Hasher for grade entries.
    pub const GRADE: Self = Self {
        domain: "sil-grade-v1",
    };
    /// Hasher for certificates.
    pub const CERTIFICATE: Self = Self {
        domain: "sil-certificate-v1",
    };

    /// Create a hasher with a custom domain tag.
    pub const fn new(domain: &'static str) -> Self {
        Self { domain }
    }

    /// Hash a canonical snapshot. Pure: no side effects, no I/O.
    ///
    /// The only failure path is snapshot serialization, which cannot occur
    /// for the constrained value set snapshots are built from; an error
    /// here means the canonicalizer produced something it should not have.
    pub fn hash_snapshot(&self, snapshot: &Snapshot) -> Result<Fingerprint, CanonicalError> {
        Ok(self.hash_bytes(&snapshot.canonical_json()?))
    }

    /// Hash raw bytes with domain separation.
    pub fn hash_bytes(&self, data: &[u8]) -> Fingerprint {
        let mut hasher = blake3::Hasher::new();
        hasher.update(self.domain.as_bytes());
        hasher.update(b":");
        hasher.update(data);
        Fingerprint::from_digest(*hasher.finalize().as_bytes())
    }

    /// The domain tag used by this hasher.
    pub fn domain(&self) -> &str {
        self.domain
    }
}
