//! Test-only helpers for building a self-signed CA.

use std::{
    str::FromStr,
    time::{Duration, SystemTime},
};

use const_oid::db::rfc5280::{ID_CE_BASIC_CONSTRAINTS, ID_CE_SUBJECT_KEY_IDENTIFIER};
use sha1::{Digest, Sha1};
use sigilla_crypto::{
    CryptoProvider, KeyAlgorithm, PrivateKeyMaterial, RustCryptoProvider, SignatureAlgorithm,
};
use x509_cert::{
    certificate::{Certificate, TbsCertificate, Version},
    der::{
        asn1::{BitString, OctetString},
        Decode, Encode,
    },
    ext::{
        pkix::{BasicConstraints, SubjectKeyIdentifier},
        Extension,
    },
    name::Name,
    serial_number::SerialNumber,
    spki::SubjectPublicKeyInfoOwned,
    time::Validity,
};

use crate::issuer::to_x509_time;

/// Build a self-signed RSA CA certificate. `with_ski` controls whether the
/// certificate carries its own SubjectKeyIdentifier extension, which is what
/// drives the issuer's two AKI derivation paths.
pub fn self_signed_ca(subject: &str, with_ski: bool) -> (Vec<u8>, PrivateKeyMaterial) {
    let provider = RustCryptoProvider::new();
    let pair = provider
        .generate_key_pair(KeyAlgorithm::Rsa, Some(2048))
        .unwrap();
    let spki = SubjectPublicKeyInfoOwned::from_der(pair.public_spki_der()).unwrap();
    let name = Name::from_str(subject).unwrap();

    let mut extensions = vec![Extension {
        extn_id: ID_CE_BASIC_CONSTRAINTS,
        critical: true,
        extn_value: OctetString::new(
            BasicConstraints {
                ca: true,
                path_len_constraint: None,
            }
            .to_der()
            .unwrap(),
        )
        .unwrap(),
    }];
    if with_ski {
        let digest = Sha1::digest(spki.subject_public_key.raw_bytes());
        extensions.push(Extension {
            extn_id: ID_CE_SUBJECT_KEY_IDENTIFIER,
            critical: false,
            extn_value: OctetString::new(
                SubjectKeyIdentifier(OctetString::new(digest.to_vec()).unwrap())
                    .to_der()
                    .unwrap(),
            )
            .unwrap(),
        });
    }

    let now = SystemTime::now();
    let tbs = TbsCertificate {
        version: Version::V3,
        serial_number: SerialNumber::new(&[0x01, 0x02, 0x03]).unwrap(),
        signature: SignatureAlgorithm::Sha256WithRsa.algorithm_identifier(),
        issuer: name.clone(),
        validity: Validity {
            not_before: to_x509_time(now).unwrap(),
            not_after: to_x509_time(now + Duration::from_secs(3600 * 24 * 365)).unwrap(),
        },
        subject: name,
        subject_public_key_info: spki,
        issuer_unique_id: None,
        subject_unique_id: None,
        extensions: Some(extensions),
    };

    let signature = provider
        .sign(
            pair.private(),
            SignatureAlgorithm::Sha256WithRsa,
            &tbs.to_der().unwrap(),
        )
        .unwrap();
    let cert = Certificate {
        tbs_certificate: tbs,
        signature_algorithm: SignatureAlgorithm::Sha256WithRsa.algorithm_identifier(),
        signature: BitString::from_bytes(&signature).unwrap(),
    };
    (cert.to_der().unwrap(), pair.into_parts().1)
}
