mod memory;

pub use memory::MemoryKeyPairStore;

use crate::error::Result;

/// Stored key pair for one subject.
///
/// The byte columns are opaque to the store; the manager decides how they
/// are encoded and re-encodes legacy rows in place. There is no explicit
/// format marker, decoding is attempted per format.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyPairRecord {
    pub subject_id: String,
    pub public_key_data: Vec<u8>,
    pub private_key_data: Vec<u8>,
}

impl KeyPairRecord {
    pub fn new(
        subject_id: impl Into<String>,
        public_key_data: Vec<u8>,
        private_key_data: Vec<u8>,
    ) -> Self {
        Self {
            subject_id: subject_id.into(),
            public_key_data,
            private_key_data,
        }
    }
}

/// Persistence collaborator for key pair records.
///
/// `create` must fail with `Error::Conflict` when a record for the subject
/// already exists; the manager resolves the race by re-reading the winner.
pub trait KeyPairStore: Send + Sync {
    fn find(&self, subject_id: &str) -> Result<Option<KeyPairRecord>>;

    fn create(&self, record: KeyPairRecord) -> Result<KeyPairRecord>;

    fn update(&self, record: KeyPairRecord) -> Result<KeyPairRecord>;
}
