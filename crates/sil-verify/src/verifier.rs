use subtle::ConstantTimeEq;

use sil_domain::{fingerprint_record, Canonicalize, Directory, RelationResolver};
use sil_types::Fingerprint;

use crate::error::VerifyResult;

/// Constant-time fingerprint equality. Verification guards tamper
/// detection, so the comparison must not leak where the digests diverge.
pub(crate) fn fingerprints_match(a: &Fingerprint, b: &Fingerprint) -> bool {
    a.as_bytes().ct_eq(b.as_bytes()).into()
}

/// Recomputes record fingerprints and compares them against stored ones.
/// Read-only: verifying a record has no side effects.
pub struct Verifier<'a> {
    directory: &'a dyn Directory,
}

impl<'a> Verifier<'a> {
    pub fn new(directory: &'a dyn Directory) -> Self {
        Self { directory }
    }

    /// Recompute `record`'s fingerprint from its current state and compare
    /// it byte-for-byte against `claimed`.
    pub fn verify<R: Canonicalize>(&self, record: &R, claimed: &Fingerprint) -> VerifyResult<bool> {
        let mut relations = RelationResolver::new(self.directory);
        let current = fingerprint_record(record, &mut relations)?;
        Ok(fingerprints_match(&current, claimed))
    }
}
