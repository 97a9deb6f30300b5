use const_oid::ObjectIdentifier;
use x509_cert::{
    der::{asn1::OctetString, Encode},
    ext::Extension,
};

use crate::error::{PkiError, Result};

/// Caller-supplied certificate extension.
///
/// The issuer appends these after the mandatory set without interpreting
/// them. `utf8` wraps the value as a DER UTF8String, `bytes` as a DER
/// OCTET STRING, so callers hand over plain values rather than ASN.1.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct X509Extension {
    oid: ObjectIdentifier,
    critical: bool,
    der_value: Vec<u8>,
}

impl X509Extension {
    pub fn utf8(oid: &str, critical: bool, value: &str) -> Result<Self> {
        let der_value = x509_cert::der::asn1::Utf8StringRef::new(value)
            .and_then(|s| s.to_der())
            .map_err(|e| {
                PkiError::CertificateBuild(format!("invalid extension string value: {e}"))
            })?;
        Ok(Self {
            oid: parse_oid(oid)?,
            critical,
            der_value,
        })
    }

    pub fn bytes(oid: &str, critical: bool, value: &[u8]) -> Result<Self> {
        let der_value = OctetString::new(value)
            .and_then(|s| s.to_der())
            .map_err(|e| {
                PkiError::CertificateBuild(format!("invalid extension byte value: {e}"))
            })?;
        Ok(Self {
            oid: parse_oid(oid)?,
            critical,
            der_value,
        })
    }

    pub fn oid(&self) -> &ObjectIdentifier {
        &self.oid
    }

    pub fn critical(&self) -> bool {
        self.critical
    }

    pub(crate) fn to_extension(&self) -> Result<Extension> {
        Ok(Extension {
            extn_id: self.oid,
            critical: self.critical,
            extn_value: OctetString::new(self.der_value.clone()).map_err(|e| {
                PkiError::CertificateBuild(format!("invalid extension value: {e}"))
            })?,
        })
    }
}

fn parse_oid(oid: &str) -> Result<ObjectIdentifier> {
    ObjectIdentifier::new(oid)
        .map_err(|e| PkiError::CertificateBuild(format!("invalid extension OID {oid}: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_utf8_extension_wraps_value() {
        let ext = X509Extension::utf8("1.3.6.1.4.1.2312.9.1.1", false, "yum").unwrap();
        // 0x0C = UTF8String tag
        assert_eq!(ext.der_value[0], 0x0C);
        assert_eq!(&ext.der_value[2..], b"yum");
        assert!(!ext.critical());
    }

    #[test]
    fn test_bytes_extension_wraps_value() {
        let ext = X509Extension::bytes("1.3.6.1.4.1.2312.9.1.2", false, &[1, 2, 3]).unwrap();
        // 0x04 = OCTET STRING tag
        assert_eq!(ext.der_value[0], 0x04);
        assert_eq!(&ext.der_value[2..], &[1, 2, 3]);
    }

    #[test]
    fn test_bad_oid_rejected() {
        assert!(X509Extension::utf8("not an oid", false, "x").is_err());
    }
}
