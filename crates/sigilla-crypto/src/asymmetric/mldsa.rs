use pkcs8::{
    der::{asn1::BitString, Encode},
    spki::{AlgorithmIdentifierOwned, SubjectPublicKeyInfoOwned, SubjectPublicKeyInfoRef},
    AlgorithmIdentifierRef, PrivateKeyInfo,
};
use pqcrypto_mldsa::mldsa65;
use pqcrypto_traits::sign::{DetachedSignature, PublicKey, SecretKey};

use crate::{
    algorithm::ID_ML_DSA_65,
    error::{Error, Result},
};

/// ML-DSA-65 key pair (FIPS 204).
///
/// PQClean's secret key type has no public-key accessor, so the PKCS#8
/// encoding always carries the public half in the OneAsymmetricKey
/// `publicKey` field and decoding requires it.
pub struct MlDsa {
    public: mldsa65::PublicKey,
    secret: mldsa65::SecretKey,
}

impl MlDsa {
    pub fn generate() -> Self {
        let (public, secret) = mldsa65::keypair();
        Self { public, secret }
    }

    pub fn from_pkcs8_der(der: &[u8]) -> Result<Self> {
        let info = PrivateKeyInfo::try_from(der)
            .map_err(|e| Error::EncodingError(format!("Invalid ML-DSA PKCS#8: {e}")))?;
        if info.algorithm.oid != ID_ML_DSA_65 {
            return Err(Error::AlgorithmError(format!(
                "not an ML-DSA-65 key: {}",
                info.algorithm.oid
            )));
        }
        let public_bytes = info.public_key.ok_or_else(|| {
            Error::EncodingError("ML-DSA PKCS#8 is missing the public key component".to_string())
        })?;
        let secret = mldsa65::SecretKey::from_bytes(info.private_key)
            .map_err(|e| Error::KeyError(format!("Invalid ML-DSA secret key: {e}")))?;
        let public = mldsa65::PublicKey::from_bytes(public_bytes)
            .map_err(|e| Error::KeyError(format!("Invalid ML-DSA public key: {e}")))?;
        Ok(Self { public, secret })
    }

    pub fn to_pkcs8_der(&self) -> Result<Vec<u8>> {
        let info = PrivateKeyInfo {
            algorithm: AlgorithmIdentifierRef {
                oid: ID_ML_DSA_65,
                parameters: None,
            },
            private_key: self.secret.as_bytes(),
            public_key: Some(self.public.as_bytes()),
        };
        info.to_der()
            .map_err(|e| Error::EncodingError(format!("Failed to encode PKCS#8: {e}")))
    }

    pub fn to_spki_der(&self) -> Result<Vec<u8>> {
        let spki = SubjectPublicKeyInfoOwned {
            algorithm: AlgorithmIdentifierOwned {
                oid: ID_ML_DSA_65,
                parameters: None,
            },
            subject_public_key: BitString::from_bytes(self.public.as_bytes())
                .map_err(|e| Error::EncodingError(format!("Failed to encode SPKI: {e}")))?,
        };
        spki.to_der()
            .map_err(|e| Error::EncodingError(format!("Failed to encode SPKI: {e}")))
    }

    /// Detached signature over the full message
    pub fn sign(&self, message: &[u8]) -> Vec<u8> {
        mldsa65::detached_sign(message, &self.secret)
            .as_bytes()
            .to_vec()
    }
}

/// Verify a detached ML-DSA-65 signature against an SPKI DER public key.
///
/// Returns `Ok(false)` on a non-matching signature; errors are reserved
/// for malformed keys.
pub fn verify_with_spki_der(spki_der: &[u8], message: &[u8], signature: &[u8]) -> Result<bool> {
    let spki = SubjectPublicKeyInfoRef::try_from(spki_der)
        .map_err(|e| Error::EncodingError(format!("Invalid SPKI: {e}")))?;
    if spki.algorithm.oid != ID_ML_DSA_65 {
        return Err(Error::AlgorithmError(format!(
            "not an ML-DSA-65 public key: {}",
            spki.algorithm.oid
        )));
    }
    let key_bytes = spki.subject_public_key.raw_bytes();
    let public = mldsa65::PublicKey::from_bytes(key_bytes)
        .map_err(|e| Error::KeyError(format!("Invalid ML-DSA public key: {e}")))?;

    let detached = match mldsa65::DetachedSignature::from_bytes(signature) {
        Ok(sig) => sig,
        // wrong-length signature bytes can never verify
        Err(_) => return Ok(false),
    };
    Ok(mldsa65::verify_detached_signature(&detached, message, &public).is_ok())
}
