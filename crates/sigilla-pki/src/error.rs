use thiserror::Error;

/// PKI subsystem errors.
///
/// Every variant is fatal to the operation that raised it, never to the
/// process; callers surface these per request.
#[derive(Error, Debug)]
pub enum PkiError {
    /// Input is not recognizable PEM or violates PEM structure
    #[error("Key format error: {0}")]
    KeyFormat(String),

    /// Well-formed PEM whose payload cannot be decoded into a key,
    /// including a missing passphrase for encrypted material
    #[error("Key decode error: {0}")]
    KeyDecode(String),

    /// Certificate assembly or signing failure
    #[error("Certificate build error: {0}")]
    CertificateBuild(String),

    /// Detached signing failure
    #[error("Signing error: {0}")]
    Signing(String),

    /// Verification aborted by I/O or malformed input; a clean signature
    /// mismatch is reported as `Ok(false)`, not as this error
    #[error("Verification error: {0}")]
    Verification(String),

    /// Invalid settings or scheme configuration
    #[error("Configuration error: {0}")]
    Config(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias
pub type Result<T> = std::result::Result<T, PkiError>;
