use std::path::{Path, PathBuf};

use serde::Deserialize;
use sigilla_crypto::{KeyAlgorithm, SignatureAlgorithm};

use crate::{
    error::{PkiError, Result},
    scheme::Scheme,
};

/// CA subsystem settings, loaded from TOML
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub ca: CaSettings,
    #[serde(default)]
    pub scheme: SchemeSettings,
}

/// Paths to the CA key material and trust set
#[derive(Debug, Clone, Deserialize)]
pub struct CaSettings {
    /// PEM file holding the CA certificate
    pub certificate: PathBuf,
    /// PEM file holding the CA private key
    pub private_key: PathBuf,
    /// Passphrase for the CA key, when it is encrypted
    #[serde(default)]
    pub private_key_password: Option<String>,
    /// Directory of PEM files with additional trusted upstream certificates
    #[serde(default)]
    pub upstream_ca_dir: Option<PathBuf>,
}

/// Active scheme configuration. Defaults reproduce the legacy RSA scheme
/// so deployments without a `[scheme]` section keep their behavior.
#[derive(Debug, Clone, Deserialize)]
pub struct SchemeSettings {
    #[serde(default = "default_scheme_name")]
    pub name: String,
    #[serde(default = "default_key_algorithm")]
    pub key_algorithm: String,
    #[serde(default)]
    pub key_size: Option<u32>,
    #[serde(default = "default_signature_algorithm")]
    pub signature_algorithm: String,
}

fn default_scheme_name() -> String {
    "legacy".to_string()
}

fn default_key_algorithm() -> String {
    "RSA".to_string()
}

fn default_signature_algorithm() -> String {
    "SHA256withRSA".to_string()
}

impl Default for SchemeSettings {
    fn default() -> Self {
        Self {
            name: "legacy".to_string(),
            key_algorithm: "RSA".to_string(),
            key_size: Some(4096),
            signature_algorithm: "SHA256withRSA".to_string(),
        }
    }
}

impl SchemeSettings {
    pub fn to_scheme(&self) -> Result<Scheme> {
        let key_algorithm = KeyAlgorithm::from_name(&self.key_algorithm)
            .map_err(|e| PkiError::Config(e.to_string()))?;
        let signature_algorithm = SignatureAlgorithm::from_name(&self.signature_algorithm)
            .map_err(|e| PkiError::Config(e.to_string()))?;
        // RSA deployments that never set a size get the historical 4096
        let key_size = match (key_algorithm, self.key_size) {
            (KeyAlgorithm::Rsa, None) => Some(4096),
            (_, size) => size,
        };
        Scheme::new(self.name.clone(), key_algorithm, key_size, signature_algorithm)
    }
}

impl Settings {
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        toml::from_str(&text).map_err(|e| PkiError::Config(format!("invalid settings: {e}")))
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    #[test]
    fn test_load_minimal_settings_defaults_to_legacy() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            "[ca]\ncertificate = \"/etc/sigilla/ca.crt\"\nprivate_key = \"/etc/sigilla/ca.key\"\n"
        )
        .unwrap();

        let settings = Settings::load(file.path()).unwrap();
        assert_eq!(settings.ca.certificate, PathBuf::from("/etc/sigilla/ca.crt"));
        assert!(settings.ca.private_key_password.is_none());

        let scheme = settings.scheme.to_scheme().unwrap();
        assert_eq!(scheme, Scheme::legacy());
    }

    #[test]
    fn test_ml_dsa_scheme_settings() {
        let toml = r#"
            [ca]
            certificate = "ca.crt"
            private_key = "ca.key"
            private_key_password = "s3cret"
            upstream_ca_dir = "upstream"

            [scheme]
            name = "ml-dsa-65"
            key_algorithm = "ML-DSA-65"
            signature_algorithm = "ML-DSA-65"
        "#;
        let settings: Settings = toml::from_str(toml).unwrap();
        let scheme = settings.scheme.to_scheme().unwrap();
        assert_eq!(scheme.key_algorithm(), KeyAlgorithm::MlDsa65);
        assert_eq!(scheme.key_size(), None);
        assert_eq!(
            settings.ca.upstream_ca_dir,
            Some(PathBuf::from("upstream"))
        );
    }

    #[test]
    fn test_unknown_algorithm_rejected() {
        let scheme = SchemeSettings {
            key_algorithm: "DSA".to_string(),
            ..Default::default()
        };
        assert!(matches!(scheme.to_scheme(), Err(PkiError::Config(_))));
    }
}
