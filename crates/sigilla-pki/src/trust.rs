use std::path::Path;

use sigilla_crypto::PrivateKeyMaterial;
use tracing::info;
use x509_cert::{
    certificate::Certificate,
    der::{Decode, Encode},
};

use crate::{
    error::{PkiError, Result},
    key_reader::PrivateKeyReader,
    pem,
    settings::CaSettings,
};

/// The CA certificate, its private key, and the upstream trusted
/// certificates.
///
/// Built once at startup and shared read-only (callers wrap it in `Arc`);
/// nothing here mutates after construction, so no locking is involved.
pub struct CaTrustContext {
    certificate: Certificate,
    certificate_der: Vec<u8>,
    private_key: PrivateKeyMaterial,
    upstream: Vec<(Certificate, Vec<u8>)>,
}

impl CaTrustContext {
    pub fn new(
        certificate_der: Vec<u8>,
        private_key: PrivateKeyMaterial,
        upstream_ders: Vec<Vec<u8>>,
    ) -> Result<Self> {
        let certificate = Certificate::from_der(&certificate_der)
            .map_err(|e| PkiError::Config(format!("invalid CA certificate: {e}")))?;
        let mut upstream = Vec::with_capacity(upstream_ders.len());
        for der in upstream_ders {
            let cert = Certificate::from_der(&der)
                .map_err(|e| PkiError::Config(format!("invalid upstream certificate: {e}")))?;
            upstream.push((cert, der));
        }
        Ok(Self {
            certificate,
            certificate_der,
            private_key,
            upstream,
        })
    }

    /// Load the trust context from the configured paths. Upstream
    /// certificates come from every PEM file in the configured directory,
    /// in file name order.
    pub fn load(settings: &CaSettings, reader: &PrivateKeyReader) -> Result<Self> {
        let cert_text = std::fs::read_to_string(&settings.certificate)?;
        let mut cert_blocks = pem::decode_all(&cert_text, "CERTIFICATE")?;
        if cert_blocks.is_empty() {
            return Err(PkiError::Config(format!(
                "no CERTIFICATE block in {}",
                settings.certificate.display()
            )));
        }
        let certificate_der = cert_blocks.remove(0);

        let private_key = reader.read_file(
            &settings.private_key,
            settings.private_key_password.as_deref(),
        )?;

        let mut upstream_ders = Vec::new();
        if let Some(dir) = &settings.upstream_ca_dir {
            upstream_ders = load_upstream_dir(dir)?;
        }

        info!(
            certificate = %settings.certificate.display(),
            upstream = upstream_ders.len(),
            "loaded CA trust context"
        );
        Self::new(certificate_der, private_key, upstream_ders)
    }

    pub fn certificate(&self) -> &Certificate {
        &self.certificate
    }

    pub fn certificate_der(&self) -> &[u8] {
        &self.certificate_der
    }

    pub fn certificate_pem(&self) -> String {
        pem::encode("CERTIFICATE", &self.certificate_der)
    }

    pub fn private_key(&self) -> &PrivateKeyMaterial {
        &self.private_key
    }

    pub fn upstream(&self) -> impl Iterator<Item = &Certificate> {
        self.upstream.iter().map(|(cert, _)| cert)
    }

    pub fn upstream_count(&self) -> usize {
        self.upstream.len()
    }

    /// SPKI DER of the CA's own public key
    pub fn ca_spki_der(&self) -> Result<Vec<u8>> {
        self.certificate
            .tbs_certificate
            .subject_public_key_info
            .to_der()
            .map_err(|e| PkiError::Config(format!("invalid CA public key: {e}")))
    }
}

fn load_upstream_dir(dir: &Path) -> Result<Vec<Vec<u8>>> {
    let mut paths: Vec<_> = std::fs::read_dir(dir)?
        .collect::<std::io::Result<Vec<_>>>()?
        .into_iter()
        .map(|entry| entry.path())
        .filter(|path| {
            matches!(
                path.extension().and_then(|e| e.to_str()),
                Some("pem") | Some("crt") | Some("cert")
            )
        })
        .collect();
    paths.sort();

    let mut ders = Vec::new();
    for path in paths {
        let text = std::fs::read_to_string(&path)?;
        ders.extend(pem::decode_all(&text, "CERTIFICATE")?);
    }
    Ok(ders)
}

#[cfg(test)]
mod tests {
    use std::{io::Write, sync::Arc};

    use sigilla_crypto::RustCryptoProvider;

    use super::*;
    use crate::test_util::self_signed_ca;

    #[test]
    fn test_new_parses_certificates() {
        let (ca_der, ca_key) = self_signed_ca("CN=Test CA", true);
        let (up_der, _) = self_signed_ca("CN=Upstream", true);
        let ctx = CaTrustContext::new(ca_der.clone(), ca_key, vec![up_der]).unwrap();
        assert_eq!(ctx.certificate_der(), &ca_der[..]);
        assert_eq!(ctx.upstream_count(), 1);
        assert!(ctx.certificate_pem().starts_with("-----BEGIN CERTIFICATE-----"));
    }

    #[test]
    fn test_load_from_files() {
        let (ca_der, ca_key) = self_signed_ca("CN=Test CA", true);
        let (up1, _) = self_signed_ca("CN=Upstream 1", true);
        let (up2, _) = self_signed_ca("CN=Upstream 2", true);

        let dir = tempfile::tempdir().unwrap();
        let cert_path = dir.path().join("ca.crt");
        std::fs::write(&cert_path, pem::encode("CERTIFICATE", &ca_der)).unwrap();

        let key_path = dir.path().join("ca.key");
        std::fs::write(&key_path, pem::encode("PRIVATE KEY", ca_key.pkcs8_der())).unwrap();

        let upstream_dir = dir.path().join("upstream");
        std::fs::create_dir(&upstream_dir).unwrap();
        std::fs::write(upstream_dir.join("a.pem"), pem::encode("CERTIFICATE", &up1)).unwrap();
        std::fs::write(upstream_dir.join("b.crt"), pem::encode("CERTIFICATE", &up2)).unwrap();
        // non-certificate files are ignored
        let mut noise = std::fs::File::create(upstream_dir.join("README.txt")).unwrap();
        noise.write_all(b"not a cert").unwrap();

        let settings = CaSettings {
            certificate: cert_path,
            private_key: key_path,
            private_key_password: None,
            upstream_ca_dir: Some(upstream_dir),
        };
        let reader = PrivateKeyReader::new(Arc::new(RustCryptoProvider::new()));
        let ctx = CaTrustContext::load(&settings, &reader).unwrap();
        assert_eq!(ctx.upstream_count(), 2);
        assert_eq!(ctx.private_key(), &ca_key);
    }

    #[test]
    fn test_missing_certificate_block() {
        let dir = tempfile::tempdir().unwrap();
        let cert_path = dir.path().join("ca.crt");
        std::fs::write(&cert_path, "no pem here").unwrap();

        let settings = CaSettings {
            certificate: cert_path,
            private_key: dir.path().join("missing.key"),
            private_key_password: None,
            upstream_ca_dir: None,
        };
        let reader = PrivateKeyReader::new(Arc::new(RustCryptoProvider::new()));
        assert!(CaTrustContext::load(&settings, &reader).is_err());
    }
}
