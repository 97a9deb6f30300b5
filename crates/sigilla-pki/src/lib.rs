//! Sigilla PKI - embedded certificate authority
//!
//! PEM codec, private key reader, certificate issuer with the fixed
//! extension profile, trust context, and detached signing.

pub mod dn;
pub mod error;
pub mod extension;
pub mod issuer;
pub mod key_reader;
pub mod pem;
pub mod scheme;
pub mod settings;
pub mod signer;
pub mod trust;

#[cfg(test)]
mod test_util;

pub use dn::DistinguishedName;
pub use error::{PkiError, Result};
pub use extension::X509Extension;
pub use issuer::{CertificateIssuer, IssuedCertificate};
pub use key_reader::PrivateKeyReader;
pub use scheme::Scheme;
pub use settings::{CaSettings, SchemeSettings, Settings};
pub use signer::SignatureEngine;
pub use trust::CaTrustContext;

/// Preludes for embedders that wire the whole subsystem
pub mod prelude {
    pub use crate::{
        dn::DistinguishedName,
        error::{PkiError, Result},
        extension::X509Extension,
        issuer::{CertificateIssuer, IssuedCertificate},
        key_reader::PrivateKeyReader,
        scheme::Scheme,
        settings::Settings,
        signer::SignatureEngine,
        trust::CaTrustContext,
    };
    pub use sigilla_crypto::{CryptoProvider, RustCryptoProvider};
}
