use thiserror::Error;

/// Key lifecycle and storage errors
#[derive(Error, Debug)]
pub enum Error {
    /// A record for this subject was created concurrently. Retryable: the
    /// caller re-reads and wins by using the stored record.
    #[error("Key pair record already exists for subject: {0}")]
    Conflict(String),

    /// No record for the subject
    #[error("Key pair record not found for subject: {0}")]
    NotFound(String),

    /// Storage backend failure
    #[error("Store error: {0}")]
    StoreError(String),

    /// Key material error from the provider layer
    #[error("Crypto error: {0}")]
    CryptoError(#[from] sigilla_crypto::Error),
}

impl Error {
    /// Whether the operation may simply be retried
    pub fn is_retryable(&self) -> bool {
        matches!(self, Error::Conflict(_))
    }
}

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;
