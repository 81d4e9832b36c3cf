//! Symmetric encryption with caller-held key material
//!
//! Two paths share one [`SymmetricKeyMaterial`]:
//!
//! - [`encrypt_symmetric`] / [`decrypt_symmetric`]: AES-256-CBC with PKCS#7
//!   under the material's fixed IV. Byte-compatible with existing stored
//!   ciphertexts. Unauthenticated: corruption is only noticed when padding or
//!   JSON parsing happens to fail. Every encryption under the same material
//!   reuses the IV, so equal plaintext prefixes produce equal ciphertext
//!   prefixes. Neither hazard is guarded against.
//! - [`seal_symmetric`] / [`open_symmetric`]: AES-256-GCM with a fresh random
//!   nonce per call. Prefer this for new data.

use aes::cipher::{block_padding::Pkcs7, BlockDecryptMut, BlockEncryptMut, KeyIvInit};
use aes_gcm::{
    aead::{Aead, KeyInit},
    Aes256Gcm, Nonce,
};
use serde::{Deserialize, Serialize};
use zeroize::{Zeroize, ZeroizeOnDrop, Zeroizing};

use super::keys::fill_random;
use super::serde_utils::decode_fixed;
use crate::protocol::constants::{AES_BLOCK_LEN, AES_KEY_LEN, GCM_NONCE_LEN};
use crate::protocol::{from_plaintext, to_plaintext, Payload};
use crate::{Error, Result};

type Aes256CbcEnc = cbc::Encryptor<aes::Aes256>;
type Aes256CbcDec = cbc::Decryptor<aes::Aes256>;

/// AES-256-CBC/PKCS#7 encrypt
pub(crate) fn cbc_encrypt(key: &[u8], iv: &[u8], plaintext: &[u8]) -> std::result::Result<Vec<u8>, String> {
    let cipher = Aes256CbcEnc::new_from_slices(key, iv)
        .map_err(|_| format!("key must be {} bytes and iv {} bytes", AES_KEY_LEN, AES_BLOCK_LEN))?;
    Ok(cipher.encrypt_padded_vec_mut::<Pkcs7>(plaintext))
}

/// AES-256-CBC/PKCS#7 decrypt
pub(crate) fn cbc_decrypt(key: &[u8], iv: &[u8], ciphertext: &[u8]) -> std::result::Result<Vec<u8>, String> {
    let cipher = Aes256CbcDec::new_from_slices(key, iv)
        .map_err(|_| format!("key must be {} bytes and iv {} bytes", AES_KEY_LEN, AES_BLOCK_LEN))?;
    cipher
        .decrypt_padded_vec_mut::<Pkcs7>(ciphertext)
        .map_err(|_| "invalid padding".to_string())
}

/// AES-256 key plus CBC IV. Caller-managed; no rotation or derivation.
#[derive(Clone, Serialize, Deserialize, Zeroize, ZeroizeOnDrop)]
pub struct SymmetricKeyMaterial {
    #[serde(with = "crate::crypto::serde_utils::hex_array")]
    pub key: [u8; AES_KEY_LEN],
    #[serde(with = "crate::crypto::serde_utils::hex_array")]
    pub iv: [u8; AES_BLOCK_LEN],
}

impl std::fmt::Debug for SymmetricKeyMaterial {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SymmetricKeyMaterial").finish_non_exhaustive()
    }
}

impl SymmetricKeyMaterial {
    /// Generate a random key and IV
    pub fn generate() -> Result<Self> {
        let mut material = Self {
            key: [0u8; AES_KEY_LEN],
            iv: [0u8; AES_BLOCK_LEN],
        };
        fill_random(&mut material.key)?;
        fill_random(&mut material.iv)?;
        Ok(material)
    }

    /// Parse hex-encoded key (32 bytes) and IV (16 bytes)
    pub fn from_hex(key: &str, iv: &str) -> Result<Self> {
        let invalid = |reason: String| Error::decryption("parse symmetric key", reason);
        let key = Zeroizing::new(decode_fixed::<AES_KEY_LEN>("key", key.trim()).map_err(invalid)?);
        let iv = decode_fixed::<AES_BLOCK_LEN>("iv", iv.trim()).map_err(invalid)?;
        Ok(Self { key: *key, iv })
    }

    fn gcm(&self) -> Result<Aes256Gcm> {
        Aes256Gcm::new_from_slice(&self.key)
            .map_err(|_| Error::ResourceUnavailable("AES-256-GCM rejected a 32-byte key".to_string()))
    }
}

/// Generate a random 32-byte key and 16-byte IV
pub fn generate_symmetric_key() -> Result<SymmetricKeyMaterial> {
    SymmetricKeyMaterial::generate()
}

/// Encrypt with AES-256-CBC, returning lowercase hex
pub fn encrypt_symmetric(payload: &Payload, material: &SymmetricKeyMaterial) -> Result<String> {
    let mut plaintext = to_plaintext(payload)?;
    let ciphertext = cbc_encrypt(&material.key, &material.iv, &plaintext)
        .map_err(|reason| Error::encryption("encrypt symmetric", reason));
    plaintext.zeroize();
    Ok(hex::encode(ciphertext?))
}

/// Decrypt hex AES-256-CBC ciphertext. Bad hex or bad padding is a [`Error::Decryption`].
pub fn decrypt_symmetric(ciphertext_hex: &str, material: &SymmetricKeyMaterial) -> Result<Payload> {
    let ciphertext = hex::decode(ciphertext_hex.trim())
        .map_err(|e| Error::decryption("decrypt symmetric", format!("ciphertext: {}", e)))?;
    let mut plaintext = cbc_decrypt(&material.key, &material.iv, &ciphertext).map_err(|reason| {
        tracing::warn!("symmetric ciphertext rejected: {}", reason);
        Error::decryption("decrypt symmetric", reason)
    })?;
    let payload = from_plaintext(&plaintext);
    plaintext.zeroize();
    Ok(payload)
}

/// Encrypt with AES-256-GCM under a random nonce; returns hex(nonce || ciphertext || tag).
///
/// Only the material's key is used; its IV plays no part.
pub fn seal_symmetric(payload: &Payload, material: &SymmetricKeyMaterial) -> Result<String> {
    let mut plaintext = to_plaintext(payload)?;

    let mut nonce_bytes = [0u8; GCM_NONCE_LEN];
    fill_random(&mut nonce_bytes)?;
    let nonce = Nonce::from_slice(&nonce_bytes);

    let sealed = material
        .gcm()?
        .encrypt(nonce, plaintext.as_slice())
        .map_err(|e| Error::encryption("seal symmetric", e.to_string()));
    plaintext.zeroize();

    let mut out = nonce_bytes.to_vec();
    out.extend(sealed?);
    Ok(hex::encode(out))
}

/// Open a value produced by [`seal_symmetric`]
pub fn open_symmetric(sealed_hex: &str, material: &SymmetricKeyMaterial) -> Result<Payload> {
    let sealed = hex::decode(sealed_hex.trim())
        .map_err(|e| Error::decryption("open symmetric", format!("ciphertext: {}", e)))?;
    if sealed.len() < GCM_NONCE_LEN {
        return Err(Error::decryption("open symmetric", "ciphertext: shorter than nonce"));
    }
    let (nonce_bytes, ciphertext) = sealed.split_at(GCM_NONCE_LEN);

    let mut plaintext = material
        .gcm()?
        .decrypt(Nonce::from_slice(nonce_bytes), ciphertext)
        .map_err(|_| {
            tracing::warn!("sealed ciphertext rejected: authentication failed");
            Error::decryption("open symmetric", "authentication failed")
        })?;
    let payload = from_plaintext(&plaintext);
    plaintext.zeroize();
    Ok(payload)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_hello_scenario() {
        let km = generate_symmetric_key().unwrap();
        let h = encrypt_symmetric(&json!("hello"), &km).unwrap();
        assert_eq!(decrypt_symmetric(&h, &km).unwrap(), json!("hello"));
    }

    #[test]
    fn test_known_vector() {
        // printf hello | openssl enc -aes-256-cbc -K 0001..1f -iv 0001..0f
        let km = SymmetricKeyMaterial::from_hex(
            "000102030405060708090a0b0c0d0e0f101112131415161718191a1b1c1d1e1f",
            "000102030405060708090a0b0c0d0e0f",
        )
        .unwrap();
        let h = encrypt_symmetric(&json!("hello"), &km).unwrap();
        assert_eq!(h, "7fd12dafb7e9599d0b849ad8c2e3c21f");
        assert_eq!(decrypt_symmetric("7FD12DAFB7E9599D0B849AD8C2E3C21F", &km).unwrap(), json!("hello"));
    }

    #[test]
    fn test_wrong_key_is_not_silently_accepted() {
        let km = generate_symmetric_key().unwrap();
        let h = encrypt_symmetric(&json!({"condition": "migraine"}), &km).unwrap();

        let mut other = km.clone();
        other.key[0] ^= 0xff;
        // CBC has no MAC: a wrong key fails on padding or yields garbage
        match decrypt_symmetric(&h, &other) {
            Err(Error::Decryption { .. }) => {}
            Ok(value) => assert_ne!(value, json!({"condition": "migraine"})),
            Err(e) => panic!("unexpected error: {e}"),
        }
    }

    #[test]
    fn test_bad_lengths() {
        assert!(matches!(
            SymmetricKeyMaterial::from_hex("00", "000102030405060708090a0b0c0d0e0f"),
            Err(Error::Decryption { .. })
        ));
        let km = generate_symmetric_key().unwrap();
        assert!(matches!(decrypt_symmetric("abc", &km), Err(Error::Decryption { .. })));
        assert!(matches!(decrypt_symmetric("00112233", &km), Err(Error::Decryption { .. })));
    }

    #[test]
    fn test_material_json_shape() {
        let km = generate_symmetric_key().unwrap();
        let json = serde_json::to_value(&km).unwrap();
        assert_eq!(json["key"].as_str().unwrap().len(), 64);
        assert_eq!(json["iv"].as_str().unwrap().len(), 32);
    }

    #[test]
    fn test_seal_open_roundtrip() {
        let km = generate_symmetric_key().unwrap();
        let payload = json!({"condition": "migraine", "severity": 3});
        let a = seal_symmetric(&payload, &km).unwrap();
        let b = seal_symmetric(&payload, &km).unwrap();
        assert_ne!(a, b);
        assert_eq!(open_symmetric(&a, &km).unwrap(), payload);
    }

    #[test]
    fn test_sealed_tamper_detected() {
        let km = generate_symmetric_key().unwrap();
        let sealed = seal_symmetric(&json!("hello"), &km).unwrap();
        let mut bytes = hex::decode(&sealed).unwrap();
        let last = bytes.len() - 1;
        bytes[last] ^= 1;
        assert!(matches!(
            open_symmetric(&hex::encode(bytes), &km),
            Err(Error::Decryption { .. })
        ));
    }
}
