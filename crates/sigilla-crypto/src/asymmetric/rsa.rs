use rsa::{
    pkcs1::DecodeRsaPrivateKey,
    pkcs8::{DecodePrivateKey, DecodePublicKey, EncodePrivateKey, EncodePublicKey},
    Pkcs1v15Sign, RsaPrivateKey, RsaPublicKey,
};
use sha2::{Digest, Sha256};

use crate::error::{Error, Result};

/// Default modulus size for the legacy RSA scheme
pub const DEFAULT_KEY_SIZE: u32 = 4096;

/// RSA key pair with SHA-256 PKCS#1 v1.5 signing
pub struct Rsa {
    inner: RsaPrivateKey,
}

impl Rsa {
    /// Generate a new key pair with the given modulus size in bits
    pub fn generate(bits: u32) -> Result<Self> {
        let mut rng = rand::thread_rng();
        let inner = RsaPrivateKey::new(&mut rng, bits as usize)
            .map_err(|e| Error::KeyError(format!("Failed to generate RSA key: {e}")))?;
        Ok(Self { inner })
    }

    /// Decode from PKCS#8 DER (RFC 5208 PrivateKeyInfo)
    pub fn from_pkcs8_der(der: &[u8]) -> Result<Self> {
        let inner = RsaPrivateKey::from_pkcs8_der(der)
            .map_err(|e| Error::EncodingError(format!("Invalid RSA PKCS#8: {e}")))?;
        Ok(Self { inner })
    }

    /// Decode from PKCS#1 DER (RFC 8017 RSAPrivateKey), the body of a
    /// legacy `RSA PRIVATE KEY` PEM block
    pub fn from_pkcs1_der(der: &[u8]) -> Result<Self> {
        let inner = RsaPrivateKey::from_pkcs1_der(der)
            .map_err(|e| Error::EncodingError(format!("Invalid RSA PKCS#1: {e}")))?;
        Ok(Self { inner })
    }

    pub fn to_pkcs8_der(&self) -> Result<Vec<u8>> {
        let doc = self
            .inner
            .to_pkcs8_der()
            .map_err(|e| Error::EncodingError(format!("Failed to encode PKCS#8: {e}")))?;
        Ok(doc.as_bytes().to_vec())
    }

    pub fn to_spki_der(&self) -> Result<Vec<u8>> {
        let doc = self
            .inner
            .to_public_key()
            .to_public_key_der()
            .map_err(|e| Error::EncodingError(format!("Failed to encode SPKI: {e}")))?;
        Ok(doc.as_bytes().to_vec())
    }

    /// Sign a message with SHA-256 and PKCS#1 v1.5 padding.
    ///
    /// A fresh RNG handle is taken per call; no signing state is reused.
    pub fn sign(&self, message: &[u8]) -> Result<Vec<u8>> {
        let digest = Sha256::digest(message);
        let mut rng = rand::thread_rng();
        self.inner
            .sign_with_rng(&mut rng, Pkcs1v15Sign::new::<Sha256>(), &digest)
            .map_err(|e| Error::SignatureError(format!("RSA signing failed: {e}")))
    }
}

/// Verify a SHA-256 PKCS#1 v1.5 signature against an SPKI DER public key.
///
/// Returns `Ok(false)` on a well-formed but non-matching signature; errors
/// are reserved for malformed inputs.
pub fn verify_with_spki_der(spki_der: &[u8], message: &[u8], signature: &[u8]) -> Result<bool> {
    let public_key = RsaPublicKey::from_public_key_der(spki_der)
        .map_err(|e| Error::EncodingError(format!("Invalid RSA SPKI: {e}")))?;
    let digest = Sha256::digest(message);
    Ok(public_key
        .verify(Pkcs1v15Sign::new::<Sha256>(), &digest, signature)
        .is_ok())
}
