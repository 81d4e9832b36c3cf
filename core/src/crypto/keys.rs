//! secp256k1 key material for envelope encryption

use k256::elliptic_curve::sec1::ToEncodedPoint;
use rand::rngs::OsRng;
use rand::RngCore;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::protocol::constants::{
    COMPRESSED_PUBLIC_KEY_LEN, SECRET_KEY_LEN, UNCOMPRESSED_PUBLIC_KEY_LEN,
};
use crate::{Error, Result};

/// Fill `buf` from the OS randomness source
pub(crate) fn fill_random(buf: &mut [u8]) -> Result<()> {
    OsRng
        .try_fill_bytes(buf)
        .map_err(|e| Error::ResourceUnavailable(format!("randomness source: {}", e)))
}

/// secp256k1 secret scalar (recipient private key)
#[derive(Clone)]
pub struct PrivateKey {
    inner: k256::SecretKey,
}

impl std::fmt::Debug for PrivateKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PrivateKey")
            .field("public", &self.public_key().fingerprint())
            .finish_non_exhaustive()
    }
}

impl PrivateKey {
    /// Generate a new random private key
    pub fn generate() -> Result<Self> {
        let mut bytes = [0u8; SECRET_KEY_LEN];
        loop {
            fill_random(&mut bytes)?;
            // Zero or >= the curve order: draw again
            if let Ok(inner) = k256::SecretKey::from_slice(&bytes) {
                zeroize::Zeroize::zeroize(&mut bytes);
                return Ok(Self { inner });
            }
        }
    }

    /// Create from a raw 32-byte scalar
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        if bytes.len() != SECRET_KEY_LEN {
            return Err(Error::decryption(
                "parse private key",
                format!("expected {} bytes, got {}", SECRET_KEY_LEN, bytes.len()),
            ));
        }
        let inner = k256::SecretKey::from_slice(bytes)
            .map_err(|_| Error::decryption("parse private key", "scalar out of range"))?;
        Ok(Self { inner })
    }

    /// Create from a hex-encoded scalar (optional `0x` prefix)
    pub fn from_hex(s: &str) -> Result<Self> {
        let bytes = hex::decode(strip_0x(s))
            .map_err(|e| Error::decryption("parse private key", e.to_string()))?;
        Self::from_bytes(&bytes)
    }

    /// Export as raw bytes
    pub fn to_bytes(&self) -> [u8; SECRET_KEY_LEN] {
        let mut out = [0u8; SECRET_KEY_LEN];
        out.copy_from_slice(&self.inner.to_bytes());
        out
    }

    /// Export as lowercase hex
    pub fn to_hex(&self) -> String {
        hex::encode(self.inner.to_bytes())
    }

    /// Get the corresponding public key
    pub fn public_key(&self) -> PublicKey {
        PublicKey {
            inner: self.inner.public_key(),
        }
    }

    pub(crate) fn as_inner(&self) -> &k256::SecretKey {
        &self.inner
    }
}

/// secp256k1 public key (recipient of an envelope)
#[derive(Clone, PartialEq, Eq)]
pub struct PublicKey {
    inner: k256::PublicKey,
}

impl std::fmt::Debug for PublicKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PublicKey")
            .field("hex", &self.to_hex())
            .finish()
    }
}

impl PublicKey {
    /// Create from SEC1 bytes, compressed (33) or uncompressed (65)
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        if bytes.len() != COMPRESSED_PUBLIC_KEY_LEN && bytes.len() != UNCOMPRESSED_PUBLIC_KEY_LEN {
            return Err(Error::encryption(
                "parse public key",
                format!(
                    "expected {} or {} bytes, got {}",
                    COMPRESSED_PUBLIC_KEY_LEN,
                    UNCOMPRESSED_PUBLIC_KEY_LEN,
                    bytes.len()
                ),
            ));
        }
        let inner = k256::PublicKey::from_sec1_bytes(bytes)
            .map_err(|_| Error::encryption("parse public key", "not a point on secp256k1"))?;
        Ok(Self { inner })
    }

    /// Create from hex-encoded SEC1 bytes (optional `0x` prefix)
    pub fn from_hex(s: &str) -> Result<Self> {
        let bytes = hex::decode(strip_0x(s))
            .map_err(|e| Error::encryption("parse public key", e.to_string()))?;
        Self::from_bytes(&bytes)
    }

    /// Export uncompressed, `0x04 || x || y`
    pub fn to_uncompressed(&self) -> Vec<u8> {
        self.inner.to_encoded_point(false).as_bytes().to_vec()
    }

    /// Export compressed, `0x02/0x03 || x`
    pub fn to_compressed(&self) -> Vec<u8> {
        self.inner.to_encoded_point(true).as_bytes().to_vec()
    }

    /// Uncompressed lowercase hex
    pub fn to_hex(&self) -> String {
        hex::encode(self.to_uncompressed())
    }

    /// Short fingerprint for logs: first 8 bytes of SHA256 over the compressed key
    pub fn fingerprint(&self) -> String {
        let hash = Sha256::digest(self.to_compressed());
        hex::encode(&hash[..8])
    }

    pub(crate) fn as_inner(&self) -> &k256::PublicKey {
        &self.inner
    }
}

impl Serialize for PublicKey {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for PublicKey {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s: String = Deserialize::deserialize(deserializer)?;
        PublicKey::from_hex(&s).map_err(serde::de::Error::custom)
    }
}

impl Serialize for PrivateKey {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for PrivateKey {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s: String = Deserialize::deserialize(deserializer)?;
        PrivateKey::from_hex(&s).map_err(serde::de::Error::custom)
    }
}

/// Recipient key pair. The caller owns persistence; keys never expire.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KeyPair {
    pub private_key: PrivateKey,
    pub public_key: PublicKey,
}

impl KeyPair {
    /// Generate a fresh key pair
    pub fn generate() -> Result<Self> {
        let private_key = PrivateKey::generate()?;
        let public_key = private_key.public_key();
        Ok(Self {
            private_key,
            public_key,
        })
    }
}

/// Generate a random secp256k1 key pair
pub fn generate_key_pair() -> Result<KeyPair> {
    KeyPair::generate()
}

fn strip_0x(s: &str) -> &str {
    let s = s.trim();
    s.strip_prefix("0x").unwrap_or(s)
}
