use std::{
    sync::Arc,
    time::{SystemTime, UNIX_EPOCH},
};

use const_oid::db::rfc5280::{
    ID_CE_AUTHORITY_KEY_IDENTIFIER, ID_CE_BASIC_CONSTRAINTS, ID_CE_EXT_KEY_USAGE, ID_CE_KEY_USAGE,
    ID_CE_SUBJECT_ALT_NAME, ID_CE_SUBJECT_KEY_IDENTIFIER, ID_KP_CLIENT_AUTH,
};
use sha1::{Digest, Sha1};
use sigilla_crypto::CryptoProvider;
use x509_cert::{
    certificate::{Certificate, TbsCertificate, Version},
    der::{
        asn1::{BitString, GeneralizedTime, OctetString, UtcTime},
        Decode, Encode,
    },
    ext::{
        pkix::{
            name::GeneralName, AuthorityKeyIdentifier, BasicConstraints, ExtendedKeyUsage,
            KeyUsage, KeyUsages, SubjectAltName, SubjectKeyIdentifier,
        },
        Extension,
    },
    serial_number::SerialNumber,
    spki::SubjectPublicKeyInfoOwned,
    time::{Time, Validity},
};

use crate::{
    dn::DistinguishedName,
    error::{PkiError, Result},
    extension::X509Extension,
    pem,
    scheme::Scheme,
    trust::CaTrustContext,
};

// 2050-01-01T00:00:00Z; RFC 5280 4.1.2.5 switches to GeneralizedTime there
const UTC_TIME_CUTOFF_SECS: u64 = 2_524_608_000;

/// A freshly issued certificate together with its final DER encoding
#[derive(Debug, Clone)]
pub struct IssuedCertificate {
    certificate: Certificate,
    der: Vec<u8>,
}

impl IssuedCertificate {
    pub fn certificate(&self) -> &Certificate {
        &self.certificate
    }

    pub fn der(&self) -> &[u8] {
        &self.der
    }

    pub fn to_pem(&self) -> String {
        pem::encode("CERTIFICATE", &self.der)
    }
}

/// Issues end-entity X.509v3 certificates signed by the CA in the trust
/// context.
///
/// Every certificate carries the same mandatory extension set, in a fixed
/// order: key usage, extended key usage (clientAuth), basic constraints
/// (not a CA), subject key identifier, authority key identifier, and, when
/// an alternate name is supplied, a subject alternative name holding both
/// the subject DN and the alternate as directory names (RFC 6125 6.4.4
/// requires the subject itself to appear once a SAN exists). Caller
/// extensions follow, uninterpreted.
pub struct CertificateIssuer {
    trust: Arc<CaTrustContext>,
    provider: Arc<dyn CryptoProvider>,
    scheme: Scheme,
}

impl CertificateIssuer {
    pub fn new(trust: Arc<CaTrustContext>, provider: Arc<dyn CryptoProvider>, scheme: Scheme) -> Self {
        Self {
            trust,
            provider,
            scheme,
        }
    }

    #[allow(clippy::too_many_arguments)]
    pub fn issue(
        &self,
        subject: &DistinguishedName,
        subject_spki_der: &[u8],
        not_before: SystemTime,
        not_after: SystemTime,
        serial: &[u8],
        extensions: &[X509Extension],
        alternate_name: Option<&str>,
    ) -> Result<IssuedCertificate> {
        if not_after <= not_before {
            return Err(PkiError::CertificateBuild(
                "notAfter must be later than notBefore".to_string(),
            ));
        }

        let subject_name = subject.to_name()?;
        let spki = SubjectPublicKeyInfoOwned::from_der(subject_spki_der)
            .map_err(|e| PkiError::CertificateBuild(format!("invalid subject public key: {e}")))?;

        let mut ext_list: Vec<Extension> = Vec::with_capacity(extensions.len() + 6);

        let key_usage = KeyUsage(
            KeyUsages::DigitalSignature | KeyUsages::KeyEncipherment | KeyUsages::DataEncipherment,
        );
        ext_list.push(build_extension(ID_CE_KEY_USAGE, true, &key_usage)?);
        ext_list.push(build_extension(
            ID_CE_EXT_KEY_USAGE,
            false,
            &ExtendedKeyUsage(vec![ID_KP_CLIENT_AUTH]),
        )?);
        ext_list.push(build_extension(
            ID_CE_BASIC_CONSTRAINTS,
            false,
            &BasicConstraints {
                ca: false,
                path_len_constraint: None,
            },
        )?);

        let ski_digest = Sha1::digest(spki.subject_public_key.raw_bytes());
        ext_list.push(build_extension(
            ID_CE_SUBJECT_KEY_IDENTIFIER,
            false,
            &SubjectKeyIdentifier(octet_string(ski_digest.to_vec())?),
        )?);

        // always derived from the actual signing CA, never issuer name+serial
        let aki = AuthorityKeyIdentifier {
            key_identifier: Some(octet_string(self.authority_key_identifier()?)?),
            authority_cert_issuer: None,
            authority_cert_serial_number: None,
        };
        ext_list.push(build_extension(ID_CE_AUTHORITY_KEY_IDENTIFIER, false, &aki)?);

        if let Some(alternate) = alternate_name {
            let alt_dn = DistinguishedName::common_name(alternate);
            let san = SubjectAltName(vec![
                GeneralName::DirectoryName(subject_name.clone()),
                GeneralName::DirectoryName(alt_dn.to_name()?),
            ]);
            ext_list.push(build_extension(ID_CE_SUBJECT_ALT_NAME, false, &san)?);
        }

        for extension in extensions {
            ext_list.push(extension.to_extension()?);
        }

        let signature_algorithm = self.scheme.signature_algorithm();
        let tbs = TbsCertificate {
            version: Version::V3,
            serial_number: positive_serial(serial)?,
            signature: signature_algorithm.algorithm_identifier(),
            issuer: self.trust.certificate().tbs_certificate.subject.clone(),
            validity: Validity {
                not_before: to_x509_time(not_before)?,
                not_after: to_x509_time(not_after)?,
            },
            subject: subject_name,
            subject_public_key_info: spki,
            issuer_unique_id: None,
            subject_unique_id: None,
            extensions: Some(ext_list),
        };

        let tbs_der = tbs
            .to_der()
            .map_err(|e| PkiError::CertificateBuild(format!("TBS encoding failed: {e}")))?;
        let signature = self
            .provider
            .sign(self.trust.private_key(), signature_algorithm, &tbs_der)
            .map_err(|e| PkiError::CertificateBuild(format!("certificate signing failed: {e}")))?;

        let certificate = Certificate {
            tbs_certificate: tbs,
            signature_algorithm: signature_algorithm.algorithm_identifier(),
            signature: BitString::from_bytes(&signature)
                .map_err(|e| PkiError::CertificateBuild(format!("invalid signature bits: {e}")))?,
        };
        let der = certificate
            .to_der()
            .map_err(|e| PkiError::CertificateBuild(format!("certificate encoding failed: {e}")))?;

        // hand back what was actually encoded, not the pre-encoding value
        let certificate = Certificate::from_der(&der)
            .map_err(|e| PkiError::CertificateBuild(format!("certificate re-parse failed: {e}")))?;

        Ok(IssuedCertificate { certificate, der })
    }

    /// AKI key identifier: the CA certificate's own SKI when it has one,
    /// otherwise the SHA-1 of the CA's SPKI bit string
    fn authority_key_identifier(&self) -> Result<Vec<u8>> {
        let tbs = &self.trust.certificate().tbs_certificate;
        if let Some(extensions) = &tbs.extensions {
            for extension in extensions {
                if extension.extn_id == ID_CE_SUBJECT_KEY_IDENTIFIER {
                    let ski = SubjectKeyIdentifier::from_der(extension.extn_value.as_bytes())
                        .map_err(|e| {
                            PkiError::CertificateBuild(format!("invalid CA SKI extension: {e}"))
                        })?;
                    return Ok(ski.0.as_bytes().to_vec());
                }
            }
        }
        let bits = tbs.subject_public_key_info.subject_public_key.raw_bytes();
        Ok(Sha1::digest(bits).to_vec())
    }
}

fn build_extension<T: Encode>(
    oid: const_oid::ObjectIdentifier,
    critical: bool,
    value: &T,
) -> Result<Extension> {
    let der = value
        .to_der()
        .map_err(|e| PkiError::CertificateBuild(format!("extension encoding failed: {e}")))?;
    Ok(Extension {
        extn_id: oid,
        critical,
        extn_value: octet_string(der)?,
    })
}

fn octet_string(bytes: Vec<u8>) -> Result<OctetString> {
    OctetString::new(bytes)
        .map_err(|e| PkiError::CertificateBuild(format!("octet string encoding failed: {e}")))
}

/// Big-endian serial bytes to a positive DER INTEGER: strip leading zeros,
/// then clear the sign bit
fn positive_serial(serial: &[u8]) -> Result<SerialNumber> {
    let mut bytes: Vec<u8> = serial.iter().copied().skip_while(|b| *b == 0).collect();
    if bytes.is_empty() {
        return Err(PkiError::CertificateBuild(
            "serial number must be non-zero".to_string(),
        ));
    }
    bytes[0] &= 0x7F;
    if bytes.iter().all(|b| *b == 0) {
        return Err(PkiError::CertificateBuild(
            "serial number must be non-zero".to_string(),
        ));
    }
    SerialNumber::new(&bytes)
        .map_err(|e| PkiError::CertificateBuild(format!("invalid serial number: {e}")))
}

/// UTCTime through 2049, GeneralizedTime from 2050 on
pub(crate) fn to_x509_time(time: SystemTime) -> Result<Time> {
    let duration = time
        .duration_since(UNIX_EPOCH)
        .map_err(|e| PkiError::CertificateBuild(format!("time before epoch: {e}")))?;
    if duration.as_secs() < UTC_TIME_CUTOFF_SECS {
        UtcTime::from_unix_duration(duration)
            .map(Time::UtcTime)
            .map_err(|e| PkiError::CertificateBuild(format!("invalid validity time: {e}")))
    } else {
        GeneralizedTime::from_unix_duration(duration)
            .map(Time::GeneralTime)
            .map_err(|e| PkiError::CertificateBuild(format!("invalid validity time: {e}")))
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use sigilla_crypto::{KeyAlgorithm, RustCryptoProvider, SignatureAlgorithm};

    use super::*;
    use crate::test_util::self_signed_ca;

    fn issuer_with(with_ski: bool) -> (CertificateIssuer, Arc<CaTrustContext>) {
        let (ca_der, ca_key) = self_signed_ca("CN=Test CA,O=Sigilla", with_ski);
        let trust = Arc::new(CaTrustContext::new(ca_der, ca_key, Vec::new()).unwrap());
        let issuer = CertificateIssuer::new(
            trust.clone(),
            Arc::new(RustCryptoProvider::new()),
            Scheme::legacy(),
        );
        (issuer, trust)
    }

    fn subject_spki() -> Vec<u8> {
        RustCryptoProvider::new()
            .generate_key_pair(KeyAlgorithm::Rsa, Some(2048))
            .unwrap()
            .public_spki_der()
            .to_vec()
    }

    fn issue_basic(
        issuer: &CertificateIssuer,
        spki: &[u8],
        alternate: Option<&str>,
    ) -> IssuedCertificate {
        let now = SystemTime::now();
        issuer
            .issue(
                &DistinguishedName::common_name("consumer-uuid"),
                spki,
                now,
                now + Duration::from_secs(3600 * 24 * 30),
                &[0x12, 0x34, 0x56, 0x78],
                &[],
                alternate,
            )
            .unwrap()
    }

    fn find_extension<'a>(cert: &'a Certificate, oid: &const_oid::ObjectIdentifier) -> Option<&'a Extension> {
        cert.tbs_certificate
            .extensions
            .as_ref()
            .and_then(|exts| exts.iter().find(|e| e.extn_id == *oid))
    }

    #[test]
    fn test_mandatory_extensions_present_in_order() {
        let (issuer, _) = issuer_with(true);
        let issued = issue_basic(&issuer, &subject_spki(), None);
        let oids: Vec<_> = issued
            .certificate()
            .tbs_certificate
            .extensions
            .as_ref()
            .unwrap()
            .iter()
            .map(|e| e.extn_id)
            .collect();
        assert_eq!(
            oids,
            vec![
                ID_CE_KEY_USAGE,
                ID_CE_EXT_KEY_USAGE,
                ID_CE_BASIC_CONSTRAINTS,
                ID_CE_SUBJECT_KEY_IDENTIFIER,
                ID_CE_AUTHORITY_KEY_IDENTIFIER,
            ]
        );
    }

    #[test]
    fn test_aki_matches_ca_public_key_digest() {
        // with and without a CA-side SKI the identifier is the same digest,
        // computed from the signing CA's actual public key
        for with_ski in [true, false] {
            let (issuer, trust) = issuer_with(with_ski);
            let issued = issue_basic(&issuer, &subject_spki(), None);

            let expected = Sha1::digest(
                trust
                    .certificate()
                    .tbs_certificate
                    .subject_public_key_info
                    .subject_public_key
                    .raw_bytes(),
            );

            let ext =
                find_extension(issued.certificate(), &ID_CE_AUTHORITY_KEY_IDENTIFIER).unwrap();
            let aki = AuthorityKeyIdentifier::from_der(ext.extn_value.as_bytes()).unwrap();
            assert_eq!(aki.key_identifier.unwrap().as_bytes(), expected.as_slice());
            assert!(aki.authority_cert_issuer.is_none());
            assert!(aki.authority_cert_serial_number.is_none());
        }
    }

    #[test]
    fn test_ski_is_sha1_of_subject_spki_bits() {
        let (issuer, _) = issuer_with(true);
        let spki_der = subject_spki();
        let issued = issue_basic(&issuer, &spki_der, None);

        let spki = SubjectPublicKeyInfoOwned::from_der(&spki_der).unwrap();
        let expected = Sha1::digest(spki.subject_public_key.raw_bytes());

        let ext = find_extension(issued.certificate(), &ID_CE_SUBJECT_KEY_IDENTIFIER).unwrap();
        let ski = SubjectKeyIdentifier::from_der(ext.extn_value.as_bytes()).unwrap();
        assert_eq!(ski.0.as_bytes(), expected.as_slice());
    }

    #[test]
    fn test_alternate_name_yields_two_directory_names() {
        let (issuer, _) = issuer_with(true);
        let issued = issue_basic(&issuer, &subject_spki(), Some("alt-name"));

        let ext = find_extension(issued.certificate(), &ID_CE_SUBJECT_ALT_NAME).unwrap();
        let san = SubjectAltName::from_der(ext.extn_value.as_bytes()).unwrap();
        assert_eq!(san.0.len(), 2);
        match &san.0[0] {
            GeneralName::DirectoryName(name) => {
                assert_eq!(name.to_string(), "CN=consumer-uuid")
            }
            other => panic!("expected directory name, got {other:?}"),
        }
        match &san.0[1] {
            GeneralName::DirectoryName(name) => assert_eq!(name.to_string(), "CN=alt-name"),
            other => panic!("expected directory name, got {other:?}"),
        }
    }

    #[test]
    fn test_no_san_without_alternate_name() {
        let (issuer, _) = issuer_with(true);
        let issued = issue_basic(&issuer, &subject_spki(), None);
        assert!(find_extension(issued.certificate(), &ID_CE_SUBJECT_ALT_NAME).is_none());
    }

    #[test]
    fn test_caller_extensions_appended() {
        let (issuer, _) = issuer_with(true);
        let custom = X509Extension::utf8("1.3.6.1.4.1.2312.9.1.1", false, "content").unwrap();
        let now = SystemTime::now();
        let issued = issuer
            .issue(
                &DistinguishedName::common_name("consumer-uuid"),
                &subject_spki(),
                now,
                now + Duration::from_secs(3600),
                &[0x01],
                &[custom],
                None,
            )
            .unwrap();
        let exts = issued.certificate().tbs_certificate.extensions.as_ref().unwrap();
        let last = exts.last().unwrap();
        assert_eq!(last.extn_id.to_string(), "1.3.6.1.4.1.2312.9.1.1");
        assert!(!last.critical);
    }

    #[test]
    fn test_signature_verifies_with_ca_key() {
        let (issuer, trust) = issuer_with(true);
        let issued = issue_basic(&issuer, &subject_spki(), None);

        let provider = RustCryptoProvider::new();
        let tbs_der = issued.certificate().tbs_certificate.to_der().unwrap();
        let sig = issued.certificate().signature.raw_bytes();
        assert!(provider
            .verify(
                &trust.ca_spki_der().unwrap(),
                SignatureAlgorithm::Sha256WithRsa,
                &tbs_der,
                sig
            )
            .unwrap());
    }

    #[test]
    fn test_serial_sign_bit_masked() {
        let (issuer, _) = issuer_with(true);
        let now = SystemTime::now();
        let issued = issuer
            .issue(
                &DistinguishedName::common_name("consumer-uuid"),
                &subject_spki(),
                now,
                now + Duration::from_secs(3600),
                &[0x00, 0xFF, 0x01],
                &[],
                None,
            )
            .unwrap();
        assert_eq!(
            issued.certificate().tbs_certificate.serial_number.as_bytes(),
            &[0x7F, 0x01]
        );
    }

    #[test]
    fn test_zero_serial_rejected() {
        let (issuer, _) = issuer_with(true);
        let now = SystemTime::now();
        let err = issuer.issue(
            &DistinguishedName::common_name("x"),
            &subject_spki(),
            now,
            now + Duration::from_secs(3600),
            &[0x00, 0x00],
            &[],
            None,
        );
        assert!(matches!(err, Err(PkiError::CertificateBuild(_))));
    }

    #[test]
    fn test_inverted_validity_rejected() {
        let (issuer, _) = issuer_with(true);
        let now = SystemTime::now();
        let err = issuer.issue(
            &DistinguishedName::common_name("x"),
            &subject_spki(),
            now + Duration::from_secs(3600),
            now,
            &[0x01],
            &[],
            None,
        );
        assert!(matches!(err, Err(PkiError::CertificateBuild(_))));
    }

    #[test]
    fn test_pem_encoding_of_issued_certificate() {
        let (issuer, _) = issuer_with(true);
        let issued = issue_basic(&issuer, &subject_spki(), None);
        let pem_text = issued.to_pem();
        let blocks = pem::decode_all(&pem_text, "CERTIFICATE").unwrap();
        assert_eq!(blocks, vec![issued.der().to_vec()]);
    }
}
