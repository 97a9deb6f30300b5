//! OpenSSL legacy PEM encryption (`DEK-Info` headers).
//!
//! Keys are derived with EVP_BytesToKey using MD5, one iteration, and the
//! first 8 bytes of the IV as salt, which is what `openssl rsa -aes256`
//! produced for traditional encrypted PEM files.

use aes::cipher::{block_padding::Pkcs7, BlockDecryptMut, BlockEncryptMut, KeyIvInit};
use md5::{Digest, Md5};

use crate::error::{Error, Result};

type Aes128CbcDec = cbc::Decryptor<aes::Aes128>;
type Aes192CbcDec = cbc::Decryptor<aes::Aes192>;
type Aes256CbcDec = cbc::Decryptor<aes::Aes256>;
type TdesCbcDec = cbc::Decryptor<des::TdesEde3>;
type Aes128CbcEnc = cbc::Encryptor<aes::Aes128>;
type Aes192CbcEnc = cbc::Encryptor<aes::Aes192>;
type Aes256CbcEnc = cbc::Encryptor<aes::Aes256>;
type TdesCbcEnc = cbc::Encryptor<des::TdesEde3>;

/// Ciphers accepted in a `DEK-Info` header
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DekCipher {
    Aes128Cbc,
    Aes192Cbc,
    Aes256Cbc,
    DesEde3Cbc,
}

impl DekCipher {
    pub fn from_name(name: &str) -> Result<Self> {
        match name {
            "AES-128-CBC" => Ok(DekCipher::Aes128Cbc),
            "AES-192-CBC" => Ok(DekCipher::Aes192Cbc),
            "AES-256-CBC" => Ok(DekCipher::Aes256Cbc),
            "DES-EDE3-CBC" => Ok(DekCipher::DesEde3Cbc),
            other => Err(Error::DecryptionError(format!(
                "unsupported DEK-Info cipher: {other}"
            ))),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            DekCipher::Aes128Cbc => "AES-128-CBC",
            DekCipher::Aes192Cbc => "AES-192-CBC",
            DekCipher::Aes256Cbc => "AES-256-CBC",
            DekCipher::DesEde3Cbc => "DES-EDE3-CBC",
        }
    }

    pub fn key_len(&self) -> usize {
        match self {
            DekCipher::Aes128Cbc => 16,
            DekCipher::Aes192Cbc => 24,
            DekCipher::Aes256Cbc => 32,
            DekCipher::DesEde3Cbc => 24,
        }
    }

    pub fn iv_len(&self) -> usize {
        match self {
            DekCipher::DesEde3Cbc => 8,
            _ => 16,
        }
    }
}

/// EVP_BytesToKey with MD5 and a single iteration
pub fn derive_key(password: &[u8], salt: &[u8], key_len: usize) -> Vec<u8> {
    let mut key = Vec::with_capacity(key_len);
    let mut block: Vec<u8> = Vec::new();
    while key.len() < key_len {
        let mut hasher = Md5::new();
        hasher.update(&block);
        hasher.update(password);
        hasher.update(salt);
        block = hasher.finalize().to_vec();
        key.extend_from_slice(&block);
    }
    key.truncate(key_len);
    key
}

fn check_iv(cipher: DekCipher, iv: &[u8]) -> Result<()> {
    if iv.len() != cipher.iv_len() {
        return Err(Error::DecryptionError(format!(
            "DEK-Info IV must be {} bytes for {}, got {}",
            cipher.iv_len(),
            cipher.name(),
            iv.len()
        )));
    }
    Ok(())
}

/// Decrypt a legacy encrypted PEM body. The salt is the first 8 bytes of
/// the IV, per the traditional OpenSSL format.
pub fn decrypt(
    cipher: DekCipher,
    password: &[u8],
    iv: &[u8],
    ciphertext: &[u8],
) -> Result<Vec<u8>> {
    check_iv(cipher, iv)?;
    let key = derive_key(password, &iv[..8], cipher.key_len());
    let bad_key = |_| Error::DecryptionError("invalid key or IV length".to_string());
    let bad_pad = |_| Error::DecryptionError("decryption failed, wrong passphrase?".to_string());

    match cipher {
        DekCipher::Aes128Cbc => Aes128CbcDec::new_from_slices(&key, iv)
            .map_err(bad_key)?
            .decrypt_padded_vec_mut::<Pkcs7>(ciphertext)
            .map_err(bad_pad),
        DekCipher::Aes192Cbc => Aes192CbcDec::new_from_slices(&key, iv)
            .map_err(bad_key)?
            .decrypt_padded_vec_mut::<Pkcs7>(ciphertext)
            .map_err(bad_pad),
        DekCipher::Aes256Cbc => Aes256CbcDec::new_from_slices(&key, iv)
            .map_err(bad_key)?
            .decrypt_padded_vec_mut::<Pkcs7>(ciphertext)
            .map_err(bad_pad),
        DekCipher::DesEde3Cbc => TdesCbcDec::new_from_slices(&key, iv)
            .map_err(bad_key)?
            .decrypt_padded_vec_mut::<Pkcs7>(ciphertext)
            .map_err(bad_pad),
    }
}

/// Encrypt with the legacy scheme. Used to produce fixtures and to write
/// password-protected legacy PEM files.
pub fn encrypt(cipher: DekCipher, password: &[u8], iv: &[u8], plaintext: &[u8]) -> Result<Vec<u8>> {
    check_iv(cipher, iv)?;
    let key = derive_key(password, &iv[..8], cipher.key_len());
    let bad_key = |_| Error::DecryptionError("invalid key or IV length".to_string());

    Ok(match cipher {
        DekCipher::Aes128Cbc => Aes128CbcEnc::new_from_slices(&key, iv)
            .map_err(bad_key)?
            .encrypt_padded_vec_mut::<Pkcs7>(plaintext),
        DekCipher::Aes192Cbc => Aes192CbcEnc::new_from_slices(&key, iv)
            .map_err(bad_key)?
            .encrypt_padded_vec_mut::<Pkcs7>(plaintext),
        DekCipher::Aes256Cbc => Aes256CbcEnc::new_from_slices(&key, iv)
            .map_err(bad_key)?
            .encrypt_padded_vec_mut::<Pkcs7>(plaintext),
        DekCipher::DesEde3Cbc => TdesCbcEnc::new_from_slices(&key, iv)
            .map_err(bad_key)?
            .encrypt_padded_vec_mut::<Pkcs7>(plaintext),
    })
}
