use pkcs8::{spki::SubjectPublicKeyInfoRef, PrivateKeyInfo};

use crate::{
    algorithm::{KeyAlgorithm, SignatureAlgorithm},
    asymmetric::{mldsa, rsa},
    error::{Error, Result},
    material::{KeyPairMaterial, PrivateKeyMaterial},
};

/// Backend seam for all key and signature operations.
///
/// The rest of the system holds `Arc<dyn CryptoProvider>` and never touches
/// algorithm crates directly, so swapping or adding a backend touches only
/// this module. Implementations must be stateless with respect to signing:
/// every `sign` call builds a fresh single-use signing state.
pub trait CryptoProvider: Send + Sync {
    /// Generate a key pair. `key_size` is required for RSA and ignored for
    /// fixed-parameter algorithms.
    fn generate_key_pair(
        &self,
        algorithm: KeyAlgorithm,
        key_size: Option<u32>,
    ) -> Result<KeyPairMaterial>;

    /// Decode and normalize a PKCS#8 DER private key of any supported
    /// algorithm
    fn private_key_from_pkcs8_der(&self, der: &[u8]) -> Result<PrivateKeyMaterial>;

    /// Decode a PKCS#1 DER RSA private key (legacy `RSA PRIVATE KEY` body)
    fn private_key_from_pkcs1_der(&self, der: &[u8]) -> Result<PrivateKeyMaterial>;

    /// Validate an SPKI DER public key and report its algorithm
    fn public_key_from_spki_der(&self, der: &[u8]) -> Result<KeyAlgorithm>;

    /// Derive the SPKI DER public half of a private key
    fn public_key_for(&self, private: &PrivateKeyMaterial) -> Result<Vec<u8>>;

    /// Produce a detached signature over `message`
    fn sign(
        &self,
        private: &PrivateKeyMaterial,
        algorithm: SignatureAlgorithm,
        message: &[u8],
    ) -> Result<Vec<u8>>;

    /// Check a detached signature against an SPKI DER public key.
    /// `Ok(false)` means a well-formed signature that does not match;
    /// errors are reserved for malformed inputs.
    fn verify(
        &self,
        spki_der: &[u8],
        algorithm: SignatureAlgorithm,
        message: &[u8],
        signature: &[u8],
    ) -> Result<bool>;
}

/// Provider backed by the RustCrypto and PQClean crates
#[derive(Debug, Default, Clone, Copy)]
pub struct RustCryptoProvider;

impl RustCryptoProvider {
    pub fn new() -> Self {
        Self
    }
}

fn check_signer(algorithm: SignatureAlgorithm, key: KeyAlgorithm) -> Result<()> {
    if algorithm.key_algorithm() != key {
        return Err(Error::AlgorithmError(format!(
            "signature algorithm {} requires a {} key, got {}",
            algorithm.name(),
            algorithm.key_algorithm().name(),
            key.name()
        )));
    }
    Ok(())
}

impl CryptoProvider for RustCryptoProvider {
    fn generate_key_pair(
        &self,
        algorithm: KeyAlgorithm,
        key_size: Option<u32>,
    ) -> Result<KeyPairMaterial> {
        match algorithm {
            KeyAlgorithm::Rsa => {
                let bits = key_size.unwrap_or(rsa::DEFAULT_KEY_SIZE);
                let key = rsa::Rsa::generate(bits)?;
                Ok(KeyPairMaterial::new(
                    key.to_spki_der()?,
                    PrivateKeyMaterial::new(KeyAlgorithm::Rsa, key.to_pkcs8_der()?),
                ))
            }
            KeyAlgorithm::MlDsa65 => {
                let key = mldsa::MlDsa::generate();
                Ok(KeyPairMaterial::new(
                    key.to_spki_der()?,
                    PrivateKeyMaterial::new(KeyAlgorithm::MlDsa65, key.to_pkcs8_der()?),
                ))
            }
        }
    }

    fn private_key_from_pkcs8_der(&self, der: &[u8]) -> Result<PrivateKeyMaterial> {
        let info = PrivateKeyInfo::try_from(der)
            .map_err(|e| Error::EncodingError(format!("Invalid PKCS#8: {e}")))?;
        let algorithm = KeyAlgorithm::from_oid(&info.algorithm.oid)?;
        // re-encode through the algorithm type so the stored form is normalized
        let normalized = match algorithm {
            KeyAlgorithm::Rsa => rsa::Rsa::from_pkcs8_der(der)?.to_pkcs8_der()?,
            KeyAlgorithm::MlDsa65 => mldsa::MlDsa::from_pkcs8_der(der)?.to_pkcs8_der()?,
        };
        Ok(PrivateKeyMaterial::new(algorithm, normalized))
    }

    fn private_key_from_pkcs1_der(&self, der: &[u8]) -> Result<PrivateKeyMaterial> {
        let key = rsa::Rsa::from_pkcs1_der(der)?;
        Ok(PrivateKeyMaterial::new(
            KeyAlgorithm::Rsa,
            key.to_pkcs8_der()?,
        ))
    }

    fn public_key_from_spki_der(&self, der: &[u8]) -> Result<KeyAlgorithm> {
        let spki = SubjectPublicKeyInfoRef::try_from(der)
            .map_err(|e| Error::EncodingError(format!("Invalid SPKI: {e}")))?;
        KeyAlgorithm::from_oid(&spki.algorithm.oid)
    }

    fn public_key_for(&self, private: &PrivateKeyMaterial) -> Result<Vec<u8>> {
        match private.algorithm() {
            KeyAlgorithm::Rsa => rsa::Rsa::from_pkcs8_der(private.pkcs8_der())?.to_spki_der(),
            KeyAlgorithm::MlDsa65 => {
                mldsa::MlDsa::from_pkcs8_der(private.pkcs8_der())?.to_spki_der()
            }
        }
    }

    fn sign(
        &self,
        private: &PrivateKeyMaterial,
        algorithm: SignatureAlgorithm,
        message: &[u8],
    ) -> Result<Vec<u8>> {
        check_signer(algorithm, private.algorithm())?;
        match algorithm {
            SignatureAlgorithm::Sha256WithRsa => {
                rsa::Rsa::from_pkcs8_der(private.pkcs8_der())?.sign(message)
            }
            SignatureAlgorithm::MlDsa65 => {
                Ok(mldsa::MlDsa::from_pkcs8_der(private.pkcs8_der())?.sign(message))
            }
        }
    }

    fn verify(
        &self,
        spki_der: &[u8],
        algorithm: SignatureAlgorithm,
        message: &[u8],
        signature: &[u8],
    ) -> Result<bool> {
        let key_algorithm = self.public_key_from_spki_der(spki_der)?;
        check_signer(algorithm, key_algorithm)?;
        match algorithm {
            SignatureAlgorithm::Sha256WithRsa => {
                rsa::verify_with_spki_der(spki_der, message, signature)
            }
            SignatureAlgorithm::MlDsa65 => mldsa::verify_with_spki_der(spki_der, message, signature),
        }
    }
}
