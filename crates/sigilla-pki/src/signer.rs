use std::{io::Read, sync::Arc};

use sigilla_crypto::CryptoProvider;
use x509_cert::{certificate::Certificate, der::Encode};

use crate::{
    error::{PkiError, Result},
    scheme::Scheme,
    trust::CaTrustContext,
};

/// Detached signing and verification under the active scheme.
///
/// Signing always uses the CA key through a fresh provider call; there is
/// no reusable signing state. Verification checks the CA certificate first
/// and then each upstream certificate, short-circuiting on the first match.
/// A signature that simply does not match yields `Ok(false)`; errors are
/// reserved for I/O and malformed input.
pub struct SignatureEngine {
    trust: Arc<CaTrustContext>,
    provider: Arc<dyn CryptoProvider>,
    scheme: Scheme,
}

impl SignatureEngine {
    pub fn new(trust: Arc<CaTrustContext>, provider: Arc<dyn CryptoProvider>, scheme: Scheme) -> Self {
        Self {
            trust,
            provider,
            scheme,
        }
    }

    /// Sign the full content of `source` with the CA key
    pub fn sign(&self, source: &mut dyn Read) -> Result<Vec<u8>> {
        let mut content = Vec::new();
        source
            .read_to_end(&mut content)
            .map_err(|e| PkiError::Signing(format!("failed to read content: {e}")))?;
        self.provider
            .sign(
                self.trust.private_key(),
                self.scheme.signature_algorithm(),
                &content,
            )
            .map_err(|e| PkiError::Signing(e.to_string()))
    }

    /// Check a detached signature against the trust set
    pub fn verify(&self, source: &mut dyn Read, signature: &[u8]) -> Result<bool> {
        let mut content = Vec::new();
        source
            .read_to_end(&mut content)
            .map_err(|e| PkiError::Verification(format!("failed to read content: {e}")))?;

        let ca_spki = self
            .trust
            .ca_spki_der()
            .map_err(|e| PkiError::Verification(e.to_string()))?;
        let mut candidates = vec![ca_spki];
        for cert in self.trust.upstream() {
            candidates.push(spki_of(cert)?);
        }

        for spki in candidates {
            // certs in the trust set may carry keys of other algorithms;
            // those can never have produced this signature
            match self.provider.public_key_from_spki_der(&spki) {
                Ok(algorithm) if algorithm == self.scheme.key_algorithm() => {}
                _ => continue,
            }
            let matched = self
                .provider
                .verify(
                    &spki,
                    self.scheme.signature_algorithm(),
                    &content,
                    signature,
                )
                .map_err(|e| PkiError::Verification(e.to_string()))?;
            if matched {
                return Ok(true);
            }
        }
        Ok(false)
    }
}

fn spki_of(cert: &Certificate) -> Result<Vec<u8>> {
    cert.tbs_certificate
        .subject_public_key_info
        .to_der()
        .map_err(|e| PkiError::Verification(format!("invalid certificate public key: {e}")))
}
