use const_oid::{db::rfc5912, ObjectIdentifier};
use pkcs8::spki::AlgorithmIdentifierOwned;

use crate::error::{Error, Result};

/// id-ml-dsa-65 (FIPS 204). Declared locally; const-oid's database predates
/// the final NIST assignments.
pub const ID_ML_DSA_65: ObjectIdentifier = ObjectIdentifier::new_unwrap("2.16.840.1.101.3.4.3.18");

/// Public key algorithm of a key pair
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyAlgorithm {
    Rsa,
    MlDsa65,
}

impl KeyAlgorithm {
    /// Configuration name, matching the names accepted by scheme settings
    pub fn name(&self) -> &'static str {
        match self {
            KeyAlgorithm::Rsa => "RSA",
            KeyAlgorithm::MlDsa65 => "ML-DSA-65",
        }
    }

    pub fn from_name(name: &str) -> Result<Self> {
        match name {
            "RSA" => Ok(KeyAlgorithm::Rsa),
            "ML-DSA-65" => Ok(KeyAlgorithm::MlDsa65),
            other => Err(Error::AlgorithmError(format!(
                "unsupported key algorithm: {other}"
            ))),
        }
    }

    /// OID carried in SPKI / PKCS#8 AlgorithmIdentifiers for this key type
    pub fn oid(&self) -> ObjectIdentifier {
        match self {
            KeyAlgorithm::Rsa => rfc5912::RSA_ENCRYPTION,
            KeyAlgorithm::MlDsa65 => ID_ML_DSA_65,
        }
    }

    pub fn from_oid(oid: &ObjectIdentifier) -> Result<Self> {
        if *oid == rfc5912::RSA_ENCRYPTION {
            Ok(KeyAlgorithm::Rsa)
        } else if *oid == ID_ML_DSA_65 {
            Ok(KeyAlgorithm::MlDsa65)
        } else {
            Err(Error::AlgorithmError(format!(
                "unsupported key algorithm OID: {oid}"
            )))
        }
    }
}

/// Signature algorithm used when issuing certificates and signing content
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SignatureAlgorithm {
    /// sha256WithRSAEncryption (PKCS#1 v1.5)
    Sha256WithRsa,
    /// Pure ML-DSA-65
    MlDsa65,
}

impl SignatureAlgorithm {
    pub fn name(&self) -> &'static str {
        match self {
            SignatureAlgorithm::Sha256WithRsa => "SHA256withRSA",
            SignatureAlgorithm::MlDsa65 => "ML-DSA-65",
        }
    }

    pub fn from_name(name: &str) -> Result<Self> {
        match name {
            "SHA256withRSA" => Ok(SignatureAlgorithm::Sha256WithRsa),
            "ML-DSA-65" => Ok(SignatureAlgorithm::MlDsa65),
            other => Err(Error::AlgorithmError(format!(
                "unsupported signature algorithm: {other}"
            ))),
        }
    }

    /// Key algorithm a signer must hold to produce this signature
    pub fn key_algorithm(&self) -> KeyAlgorithm {
        match self {
            SignatureAlgorithm::Sha256WithRsa => KeyAlgorithm::Rsa,
            SignatureAlgorithm::MlDsa65 => KeyAlgorithm::MlDsa65,
        }
    }

    /// AlgorithmIdentifier for the certificate `signature` fields.
    ///
    /// sha256WithRSAEncryption carries an explicit NULL parameter per
    /// RFC 4055; ML-DSA has absent parameters.
    pub fn algorithm_identifier(&self) -> AlgorithmIdentifierOwned {
        match self {
            SignatureAlgorithm::Sha256WithRsa => AlgorithmIdentifierOwned {
                oid: rfc5912::SHA_256_WITH_RSA_ENCRYPTION,
                parameters: Some(pkcs8::der::Any::null()),
            },
            SignatureAlgorithm::MlDsa65 => AlgorithmIdentifierOwned {
                oid: ID_ML_DSA_65,
                parameters: None,
            },
        }
    }
}
