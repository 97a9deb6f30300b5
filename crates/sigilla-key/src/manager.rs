use std::sync::Arc;

use sigilla_crypto::{CryptoProvider, KeyAlgorithm, PrivateKeyMaterial};
use tracing::{debug, info, warn};

use crate::{
    error::{Error, Result},
    legacy,
    store::{KeyPairRecord, KeyPairStore},
};

/// Usable key pair for one subject
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubjectKeyPair {
    pub algorithm: KeyAlgorithm,
    pub public_key_der: Vec<u8>,
    pub private_key: PrivateKeyMaterial,
}

/// Per-subject key pair lifecycle.
///
/// `get_or_create` is the single entry point: it finds the stored record,
/// decodes it through the ordered strategy list (primary DER, then the
/// legacy envelope), migrates legacy rows in place, regenerates when no
/// strategy decodes, and resolves create races by re-reading the winning
/// record. A record that decodes under any strategy is never regenerated.
pub struct KeyPairManager {
    store: Arc<dyn KeyPairStore>,
    provider: Arc<dyn CryptoProvider>,
    key_algorithm: KeyAlgorithm,
    key_size: Option<u32>,
}

impl KeyPairManager {
    /// `key_algorithm`/`key_size` come from the active scheme and apply to
    /// newly generated pairs only; stored pairs keep their own algorithm.
    pub fn new(
        store: Arc<dyn KeyPairStore>,
        provider: Arc<dyn CryptoProvider>,
        key_algorithm: KeyAlgorithm,
        key_size: Option<u32>,
    ) -> Self {
        Self {
            store,
            provider,
            key_algorithm,
            key_size,
        }
    }

    pub fn get_or_create(&self, subject_id: &str) -> Result<SubjectKeyPair> {
        match self.store.find(subject_id)? {
            Some(record) => self.decode_or_replace(record),
            None => self.create_new(subject_id),
        }
    }

    fn create_new(&self, subject_id: &str) -> Result<SubjectKeyPair> {
        let pair = self.generate()?;
        let record = KeyPairRecord::new(
            subject_id,
            pair.public_key_der.clone(),
            pair.private_key.pkcs8_der().to_vec(),
        );
        match self.store.create(record) {
            Ok(_) => Ok(pair),
            Err(Error::Conflict(_)) => {
                debug!(subject_id, "key pair created concurrently, using the stored record");
                match self.store.find(subject_id)? {
                    Some(record) => self.decode_or_replace(record),
                    // winner vanished between create and find; let the caller retry
                    None => Err(Error::Conflict(subject_id.to_string())),
                }
            }
            Err(e) => Err(e),
        }
    }

    fn decode_or_replace(&self, record: KeyPairRecord) -> Result<SubjectKeyPair> {
        if let Some(pair) = self.decode_primary(&record) {
            return Ok(pair);
        }

        if let Some(pair) = self.decode_legacy(&record) {
            info!(
                subject_id = %record.subject_id,
                "re-encoding legacy key pair record to the primary format"
            );
            self.store.update(KeyPairRecord::new(
                record.subject_id,
                pair.public_key_der.clone(),
                pair.private_key.pkcs8_der().to_vec(),
            ))?;
            return Ok(pair);
        }

        warn!(
            subject_id = %record.subject_id,
            "stored key pair cannot be decoded, generating a replacement"
        );
        let pair = self.generate()?;
        self.store.update(KeyPairRecord::new(
            record.subject_id,
            pair.public_key_der.clone(),
            pair.private_key.pkcs8_der().to_vec(),
        ))?;
        Ok(pair)
    }

    /// Primary format: PKCS#8 DER private column, SPKI DER public column
    fn decode_primary(&self, record: &KeyPairRecord) -> Option<SubjectKeyPair> {
        let private = self
            .provider
            .private_key_from_pkcs8_der(&record.private_key_data)
            .ok()?;
        let public_algorithm = self
            .provider
            .public_key_from_spki_der(&record.public_key_data)
            .ok()?;
        if public_algorithm != private.algorithm() {
            return None;
        }
        Some(SubjectKeyPair {
            algorithm: private.algorithm(),
            public_key_der: record.public_key_data.clone(),
            private_key: private,
        })
    }

    /// Legacy format: JSON envelope per column wrapping the DER payloads
    fn decode_legacy(&self, record: &KeyPairRecord) -> Option<SubjectKeyPair> {
        let (public_algorithm, public_der) = legacy::decode_column(&record.public_key_data)?;
        let (private_algorithm, private_der) = legacy::decode_column(&record.private_key_data)?;
        if public_algorithm != private_algorithm {
            return None;
        }
        let private = self.provider.private_key_from_pkcs8_der(&private_der).ok()?;
        self.provider.public_key_from_spki_der(&public_der).ok()?;
        Some(SubjectKeyPair {
            algorithm: private.algorithm(),
            public_key_der: public_der,
            private_key: private,
        })
    }

    fn generate(&self) -> Result<SubjectKeyPair> {
        let pair = self
            .provider
            .generate_key_pair(self.key_algorithm, self.key_size)?;
        let (public_key_der, private_key) = pair.into_parts();
        Ok(SubjectKeyPair {
            algorithm: private_key.algorithm(),
            public_key_der,
            private_key,
        })
    }
}
