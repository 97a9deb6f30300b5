//! Historical key pair record encoding.
//!
//! Early deployments stored each key column as a JSON envelope with
//! base64 payloads instead of raw DER. The manager still decodes these and
//! re-encodes them to the primary format on first touch; encoding is kept
//! for fixtures.

use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use serde::{Deserialize, Serialize};
use sigilla_crypto::KeyAlgorithm;

/// Format tag carried by every legacy envelope
pub const LEGACY_FORMAT: &str = "sigilla-keypair/1";

#[derive(Debug, Serialize, Deserialize)]
struct LegacyKeyEnvelope {
    format: String,
    algorithm: String,
    key: String,
}

/// Decode one legacy column. Returns the algorithm and raw key bytes, or
/// `None` when the column is not a legacy envelope.
pub fn decode_column(data: &[u8]) -> Option<(KeyAlgorithm, Vec<u8>)> {
    let envelope: LegacyKeyEnvelope = serde_json::from_slice(data).ok()?;
    if envelope.format != LEGACY_FORMAT {
        return None;
    }
    let algorithm = KeyAlgorithm::from_name(&envelope.algorithm).ok()?;
    let key = BASE64.decode(envelope.key.as_bytes()).ok()?;
    Some((algorithm, key))
}

/// Encode a key as a legacy column. Fixture support only; new records are
/// always written in the primary DER format.
pub fn encode_column(algorithm: KeyAlgorithm, key: &[u8]) -> Vec<u8> {
    let envelope = LegacyKeyEnvelope {
        format: LEGACY_FORMAT.to_string(),
        algorithm: algorithm.name().to_string(),
        key: BASE64.encode(key),
    };
    // struct of three strings cannot fail to serialize
    serde_json::to_vec(&envelope).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_column_round_trip() {
        let encoded = encode_column(KeyAlgorithm::Rsa, b"der bytes");
        let (algorithm, key) = decode_column(&encoded).unwrap();
        assert_eq!(algorithm, KeyAlgorithm::Rsa);
        assert_eq!(key, b"der bytes");
    }

    #[test]
    fn test_non_legacy_data_is_none() {
        assert!(decode_column(b"\x30\x82\x01\x00not json").is_none());
        assert!(decode_column(b"{\"format\":\"other/2\",\"algorithm\":\"RSA\",\"key\":\"\"}").is_none());
        assert!(decode_column(b"{}").is_none());
    }
}
