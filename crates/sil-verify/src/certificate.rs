use std::sync::Arc;

use chrono::Utc;
use serde::{Deserialize, Serialize};

use sil_domain::{fingerprint_record, Certificate, CertificateStore, Directory, RelationResolver};

use crate::error::{VerifyError, VerifyResult};
use crate::log::{NewVerification, VerificationLog, VerificationRecord};
use crate::verifier::fingerprints_match;

/// The result of one certificate verification call.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct VerificationOutcome {
    pub certificate: Certificate,
    pub verification_record: VerificationRecord,
    pub matched: bool,
}

/// The public certificate check: anyone holding a certificate number can
/// ask whether the certificate's data still matches its fingerprint.
pub struct CertificateVerifier {
    certificates: Arc<dyn CertificateStore>,
    log: Arc<dyn VerificationLog>,
    directory: Arc<dyn Directory>,
}

impl CertificateVerifier {
    pub fn new(
        certificates: Arc<dyn CertificateStore>,
        log: Arc<dyn VerificationLog>,
        directory: Arc<dyn Directory>,
    ) -> Self {
        Self {
            certificates,
            log,
            directory,
        }
    }

    /// Verify a certificate by its external number.
    ///
    /// Unknown numbers fail with `CertificateNotFound` and leave no
    /// verification record; there is nothing to attempt against. For a
    /// known certificate the attempt is always persisted, matched or not.
    /// A certificate that was never registered verifies as unmatched.
    pub fn verify_certificate(
        &self,
        certificate_number: &str,
        verified_by_name: &str,
    ) -> VerifyResult<VerificationOutcome> {
        let certificate = self
            .certificates
            .get_by_number(certificate_number)?
            .ok_or_else(|| VerifyError::CertificateNotFound(certificate_number.to_string()))?;

        let matched = match &certificate.fingerprint {
            Some(stored) => {
                let current = self.recompute(&certificate)?;
                fingerprints_match(&current, stored)
            }
            None => false,
        };

        let verification_record = self.log.append(NewVerification {
            certificate_id: certificate.id,
            verified_by_name: verified_by_name.to_string(),
            verified_at: Utc::now(),
        })?;

        tracing::info!(
            certificate_number,
            verified_by_name,
            matched,
            "certificate verification recorded"
        );

        Ok(VerificationOutcome {
            certificate,
            verification_record,
            matched,
        })
    }

    fn recompute(&self, certificate: &Certificate) -> VerifyResult<sil_types::Fingerprint> {
        let mut relations = RelationResolver::new(self.directory.as_ref());
        Ok(fingerprint_record(certificate, &mut relations)?)
    }
}
