//! Sigilla Key - per-subject key pair lifecycle
//!
//! Storage collaborator trait, in-memory reference store, the legacy
//! record envelope, and the get-or-create manager with in-place migration.

pub mod error;
pub mod legacy;
pub mod manager;
pub mod store;

pub use error::{Error, Result};
pub use manager::{KeyPairManager, SubjectKeyPair};
pub use store::{KeyPairRecord, KeyPairStore, MemoryKeyPairStore};
