use std::{fmt, str::FromStr};

use x509_cert::name::Name;

use crate::error::{PkiError, Result};

/// Ordered distinguished name for certificate subjects.
///
/// Component order is preserved exactly as given; the string form follows
/// RFC 4514 (`CN=consumer, O=org`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DistinguishedName {
    components: Vec<(String, String)>,
}

impl DistinguishedName {
    pub fn new() -> Self {
        Self {
            components: Vec::new(),
        }
    }

    /// DN with a single CN component, the common case for consumer certs
    pub fn common_name(cn: impl Into<String>) -> Self {
        let mut dn = Self::new();
        dn.push("CN", cn);
        dn
    }

    pub fn push(&mut self, attribute: impl Into<String>, value: impl Into<String>) -> &mut Self {
        self.components.push((attribute.into(), value.into()));
        self
    }

    pub fn is_empty(&self) -> bool {
        self.components.is_empty()
    }

    pub fn value(&self) -> String {
        self.components
            .iter()
            .map(|(attr, val)| format!("{attr}={val}"))
            .collect::<Vec<_>>()
            .join(",")
    }

    /// Convert to an X.509 Name for certificate assembly
    pub fn to_name(&self) -> Result<Name> {
        if self.is_empty() {
            return Err(PkiError::CertificateBuild(
                "distinguished name has no components".to_string(),
            ));
        }
        Name::from_str(&self.value())
            .map_err(|e| PkiError::CertificateBuild(format!("invalid distinguished name: {e}")))
    }
}

impl Default for DistinguishedName {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for DistinguishedName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.value())
    }
}
