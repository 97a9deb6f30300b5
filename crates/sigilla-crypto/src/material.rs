use std::fmt;

use crate::algorithm::KeyAlgorithm;

/// A private key normalized to PKCS#8 DER.
///
/// Every decoder path (PKCS#8, PKCS#1, encrypted PEM, legacy records)
/// converges on this representation, so equality is byte equality of the
/// normalized encoding.
#[derive(Clone, PartialEq, Eq)]
pub struct PrivateKeyMaterial {
    algorithm: KeyAlgorithm,
    pkcs8_der: Vec<u8>,
}

impl PrivateKeyMaterial {
    pub fn new(algorithm: KeyAlgorithm, pkcs8_der: Vec<u8>) -> Self {
        Self {
            algorithm,
            pkcs8_der,
        }
    }

    pub fn algorithm(&self) -> KeyAlgorithm {
        self.algorithm
    }

    pub fn pkcs8_der(&self) -> &[u8] {
        &self.pkcs8_der
    }

    pub fn into_pkcs8_der(self) -> Vec<u8> {
        self.pkcs8_der
    }
}

impl fmt::Debug for PrivateKeyMaterial {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PrivateKeyMaterial")
            .field("algorithm", &self.algorithm)
            .field("pkcs8_der_len", &self.pkcs8_der.len())
            .finish()
    }
}

/// A generated key pair: SPKI DER public half plus the private material
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct KeyPairMaterial {
    public_spki_der: Vec<u8>,
    private: PrivateKeyMaterial,
}

impl KeyPairMaterial {
    pub fn new(public_spki_der: Vec<u8>, private: PrivateKeyMaterial) -> Self {
        Self {
            public_spki_der,
            private,
        }
    }

    pub fn algorithm(&self) -> KeyAlgorithm {
        self.private.algorithm()
    }

    pub fn public_spki_der(&self) -> &[u8] {
        &self.public_spki_der
    }

    pub fn private(&self) -> &PrivateKeyMaterial {
        &self.private
    }

    pub fn into_parts(self) -> (Vec<u8>, PrivateKeyMaterial) {
        (self.public_spki_der, self.private)
    }
}
