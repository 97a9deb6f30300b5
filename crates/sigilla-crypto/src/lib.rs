//! Sigilla Cryptography Library
//!
//! Cryptographic provider backends for the sigilla embedded CA: RSA and
//! ML-DSA-65 key pairs, PKCS#8/PKCS#1/SPKI handling, detached signatures,
//! and the legacy OpenSSL PEM ciphers.

pub mod algorithm;
pub mod error;
pub mod material;
pub mod provider;

// Algorithm backends
pub mod asymmetric;
pub mod symmetric;

// Re-export commonly used types for convenience
pub use algorithm::{KeyAlgorithm, SignatureAlgorithm};
pub use error::{Error, Result};
pub use material::{KeyPairMaterial, PrivateKeyMaterial};
pub use provider::{CryptoProvider, RustCryptoProvider};
