use sigilla_crypto::{KeyAlgorithm, SignatureAlgorithm};

use crate::error::{PkiError, Result};

/// A named combination of key and signature algorithm.
///
/// The scheme is fixed at key generation time; certificates and detached
/// signatures produced under it always use its signature algorithm, and the
/// constructor rejects a signature algorithm that cannot be driven by the
/// key algorithm.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Scheme {
    name: String,
    key_algorithm: KeyAlgorithm,
    key_size: Option<u32>,
    signature_algorithm: SignatureAlgorithm,
}

impl Scheme {
    pub fn new(
        name: impl Into<String>,
        key_algorithm: KeyAlgorithm,
        key_size: Option<u32>,
        signature_algorithm: SignatureAlgorithm,
    ) -> Result<Self> {
        if signature_algorithm.key_algorithm() != key_algorithm {
            return Err(PkiError::Config(format!(
                "signature algorithm {} cannot be used with {} keys",
                signature_algorithm.name(),
                key_algorithm.name()
            )));
        }
        Ok(Self {
            name: name.into(),
            key_algorithm,
            key_size,
            signature_algorithm,
        })
    }

    /// The historical RSA/SHA-256 scheme all existing deployments run
    pub fn legacy() -> Self {
        Self {
            name: "legacy".to_string(),
            key_algorithm: KeyAlgorithm::Rsa,
            key_size: Some(4096),
            signature_algorithm: SignatureAlgorithm::Sha256WithRsa,
        }
    }

    /// Post-quantum ML-DSA-65 scheme
    pub fn ml_dsa_65() -> Self {
        Self {
            name: "ml-dsa-65".to_string(),
            key_algorithm: KeyAlgorithm::MlDsa65,
            key_size: None,
            signature_algorithm: SignatureAlgorithm::MlDsa65,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn key_algorithm(&self) -> KeyAlgorithm {
        self.key_algorithm
    }

    pub fn key_size(&self) -> Option<u32> {
        self.key_size
    }

    pub fn signature_algorithm(&self) -> SignatureAlgorithm {
        self.signature_algorithm
    }
}
