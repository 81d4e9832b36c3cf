//! Hex serialization utilities for serde
//!
//! Every binary field on the wire is a lowercase hex string. Decoding
//! accepts either case.

use serde::{Deserialize, Deserializer, Serializer};

/// Serialize/deserialize a `Vec<u8>` as a hex string.
///
/// Usage:
/// ```ignore
/// #[serde(with = "crate::crypto::serde_utils::hex_bytes")]
/// pub field: Vec<u8>,
/// ```
pub mod hex_bytes {
    use super::*;

    pub fn serialize<S>(data: &[u8], serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&hex::encode(data))
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Vec<u8>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s: String = Deserialize::deserialize(deserializer)?;
        hex::decode(&s).map_err(serde::de::Error::custom)
    }
}

/// Serialize/deserialize a fixed-size `[u8; N]` array as a hex string.
/// Used for keys and IVs.
///
/// Usage:
/// ```ignore
/// #[serde(with = "crate::crypto::serde_utils::hex_array")]
/// pub iv: [u8; 16],
/// ```
pub mod hex_array {
    use super::*;

    pub fn serialize<S, const N: usize>(data: &[u8; N], serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&hex::encode(data))
    }

    pub fn deserialize<'de, D, const N: usize>(deserializer: D) -> Result<[u8; N], D::Error>
    where
        D: Deserializer<'de>,
    {
        let s: String = Deserialize::deserialize(deserializer)?;
        let mut out = [0u8; N];
        hex::decode_to_slice(&s, &mut out).map_err(|e| {
            serde::de::Error::custom(format!("expected {} hex-encoded bytes: {}", N, e))
        })?;
        Ok(out)
    }
}

/// Decode one named hex field into a fixed-size array
pub(crate) fn decode_fixed<const N: usize>(field: &str, value: &str) -> std::result::Result<[u8; N], String> {
    let mut out = [0u8; N];
    hex::decode_to_slice(value, &mut out)
        .map_err(|e| format!("{field}: expected {N} hex-encoded bytes: {e}"))?;
    Ok(out)
}
