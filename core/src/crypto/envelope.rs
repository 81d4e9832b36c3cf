//! ECIES envelope encryption over secp256k1
//!
//! Wire-compatible with the `eccrypto` construction:
//!
//! - ephemeral key `e`, `ephemPublicKey = eG` (65 bytes, uncompressed)
//! - `Px` = x-coordinate of `e * recipient`
//! - `SHA512(Px)` split into AES-256 key (first half) and HMAC key (second half)
//! - AES-256-CBC with PKCS#7 under a random 16-byte IV
//! - `mac = HMAC-SHA256(iv || ephemPublicKey || ciphertext)`

use hmac::digest::KeyInit;
use hmac::{Hmac, Mac};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256, Sha512};
use zeroize::Zeroizing;

use super::keys::{fill_random, PrivateKey, PublicKey};
use super::symmetric::{cbc_decrypt, cbc_encrypt};
use crate::protocol::constants::{AES_BLOCK_LEN, AES_KEY_LEN, MAC_LEN, UNCOMPRESSED_PUBLIC_KEY_LEN};
use crate::protocol::{from_plaintext, to_plaintext, Payload};
use crate::{Error, Result};

type HmacSha256 = Hmac<Sha256>;

/// Field names of the persisted envelope
pub const ENVELOPE_FIELDS: [&str; 4] = ["iv", "ephemPublicKey", "ciphertext", "mac"];

/// An encrypted record. Serializes as four lowercase-hex strings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EncryptedEnvelope {
    #[serde(with = "crate::crypto::serde_utils::hex_bytes")]
    pub iv: Vec<u8>,
    #[serde(rename = "ephemPublicKey", with = "crate::crypto::serde_utils::hex_bytes")]
    pub ephem_public_key: Vec<u8>,
    #[serde(with = "crate::crypto::serde_utils::hex_bytes")]
    pub ciphertext: Vec<u8>,
    #[serde(with = "crate::crypto::serde_utils::hex_bytes")]
    pub mac: Vec<u8>,
}

impl EncryptedEnvelope {
    /// Build from the four hex strings, reporting which field is malformed
    pub fn from_hex_fields(iv: &str, ephem_public_key: &str, ciphertext: &str, mac: &str) -> Result<Self> {
        let decode = |field: &str, value: &str| {
            hex::decode(value).map_err(|e| Error::decryption("decode envelope", format!("{field}: {e}")))
        };
        Ok(Self {
            iv: decode("iv", iv)?,
            ephem_public_key: decode("ephemPublicKey", ephem_public_key)?,
            ciphertext: decode("ciphertext", ciphertext)?,
            mac: decode("mac", mac)?,
        })
    }

    /// Recognize a stored JSON value as an envelope.
    ///
    /// Returns `None` unless all four fields are present as strings.
    pub fn from_json(value: &serde_json::Value) -> Option<Result<Self>> {
        let field = |name: &str| value.get(name).and_then(|v| v.as_str());
        match (field("iv"), field("ephemPublicKey"), field("ciphertext"), field("mac")) {
            (Some(iv), Some(ephem), Some(ct), Some(mac)) => Some(Self::from_hex_fields(iv, ephem, ct, mac)),
            _ => None,
        }
    }

    fn check_lengths(&self) -> Result<()> {
        let fail = |reason: String| -> Result<()> { Err(Error::decryption("decrypt envelope", reason)) };
        if self.iv.len() != AES_BLOCK_LEN {
            return fail(format!("iv: expected {} bytes, got {}", AES_BLOCK_LEN, self.iv.len()));
        }
        if self.mac.len() != MAC_LEN {
            return fail(format!("mac: expected {} bytes, got {}", MAC_LEN, self.mac.len()));
        }
        if self.ciphertext.is_empty() || self.ciphertext.len() % AES_BLOCK_LEN != 0 {
            return fail(format!(
                "ciphertext: length {} is not a positive multiple of {}",
                self.ciphertext.len(),
                AES_BLOCK_LEN
            ));
        }
        Ok(())
    }
}

/// Encryption and MAC keys derived from the ECDH shared x-coordinate
struct DerivedKeys {
    enc_key: Zeroizing<[u8; AES_KEY_LEN]>,
    mac_key: Zeroizing<[u8; MAC_LEN]>,
}

impl DerivedKeys {
    fn derive(secret: &k256::SecretKey, public: &k256::PublicKey) -> Self {
        let shared = k256::ecdh::diffie_hellman(secret.to_nonzero_scalar(), public.as_affine());
        let mut hash = Zeroizing::new([0u8; AES_KEY_LEN + MAC_LEN]);
        hash.copy_from_slice(&Sha512::digest(shared.raw_secret_bytes()));

        let mut enc_key = Zeroizing::new([0u8; AES_KEY_LEN]);
        let mut mac_key = Zeroizing::new([0u8; MAC_LEN]);
        enc_key.copy_from_slice(&hash[..AES_KEY_LEN]);
        mac_key.copy_from_slice(&hash[AES_KEY_LEN..]);
        Self { enc_key, mac_key }
    }

    fn mac(&self, iv: &[u8], ephem_public_key: &[u8], ciphertext: &[u8]) -> Result<HmacSha256> {
        let mut mac = <HmacSha256 as KeyInit>::new_from_slice(self.mac_key.as_slice())
            .map_err(|_| Error::ResourceUnavailable("HMAC-SHA256 rejected a 32-byte key".to_string()))?;
        mac.update(iv);
        mac.update(ephem_public_key);
        mac.update(ciphertext);
        Ok(mac)
    }
}

/// Encrypt `payload` so that only the holder of `public_key`'s private key can read it
pub fn encrypt_with_public_key(payload: &Payload, public_key: &PublicKey) -> Result<EncryptedEnvelope> {
    let plaintext = Zeroizing::new(to_plaintext(payload)?);
    encrypt_bytes(&plaintext, public_key)
}

/// Envelope-encrypt raw bytes
pub fn encrypt_bytes(plaintext: &[u8], public_key: &PublicKey) -> Result<EncryptedEnvelope> {
    let ephemeral = PrivateKey::generate()?;
    let ephem_public_key = ephemeral.public_key().to_uncompressed();
    debug_assert_eq!(ephem_public_key.len(), UNCOMPRESSED_PUBLIC_KEY_LEN);

    let keys = DerivedKeys::derive(ephemeral.as_inner(), public_key.as_inner());

    let mut iv = [0u8; AES_BLOCK_LEN];
    fill_random(&mut iv)?;

    let ciphertext = cbc_encrypt(keys.enc_key.as_slice(), &iv, plaintext)
        .map_err(|reason| Error::encryption("encrypt envelope", reason))?;
    let mac = keys
        .mac(&iv, &ephem_public_key, &ciphertext)?
        .finalize()
        .into_bytes()
        .to_vec();

    tracing::debug!(
        recipient = %public_key.fingerprint(),
        bytes = ciphertext.len(),
        "envelope encrypted"
    );

    Ok(EncryptedEnvelope {
        iv: iv.to_vec(),
        ephem_public_key,
        ciphertext,
        mac,
    })
}

/// Decrypt an envelope with the recipient's private key
pub fn decrypt_with_private_key(envelope: &EncryptedEnvelope, private_key: &PrivateKey) -> Result<Payload> {
    let plaintext = decrypt_bytes(envelope, private_key)?;
    Ok(from_plaintext(&plaintext))
}

/// Decrypt an envelope to raw bytes.
///
/// The MAC is verified in constant time before any decryption is attempted.
pub fn decrypt_bytes(envelope: &EncryptedEnvelope, private_key: &PrivateKey) -> Result<Zeroizing<Vec<u8>>> {
    envelope.check_lengths()?;

    let ephemeral = PublicKey::from_bytes(&envelope.ephem_public_key).map_err(|_| {
        Error::decryption("decrypt envelope", "ephemPublicKey: not a valid secp256k1 point")
    })?;
    let keys = DerivedKeys::derive(private_key.as_inner(), ephemeral.as_inner());

    keys.mac(&envelope.iv, &envelope.ephem_public_key, &envelope.ciphertext)?
        .verify_slice(&envelope.mac)
        .map_err(|_| {
            tracing::warn!("envelope rejected: bad MAC");
            Error::decryption("decrypt envelope", "bad MAC")
        })?;

    let plaintext = cbc_decrypt(keys.enc_key.as_slice(), &envelope.iv, &envelope.ciphertext)
        .map_err(|reason| Error::decryption("decrypt envelope", reason))?;
    Ok(Zeroizing::new(plaintext))
}
