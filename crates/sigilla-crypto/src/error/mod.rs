use thiserror::Error;

/// Errors produced by the crypto provider layer
#[derive(Error, Debug)]
pub enum Error {
    /// Key material could not be decoded or generated
    #[error("Key error: {0}")]
    KeyError(String),

    /// Signing or verification could not be carried out
    #[error("Signature error: {0}")]
    SignatureError(String),

    /// DER/PKCS#8/SPKI encoding or decoding failure
    #[error("Encoding error: {0}")]
    EncodingError(String),

    /// Symmetric decryption of legacy key material failed
    #[error("Decryption error: {0}")]
    DecryptionError(String),

    /// Algorithm requested does not match the key or is unsupported
    #[error("Algorithm error: {0}")]
    AlgorithmError(String),
}

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;
