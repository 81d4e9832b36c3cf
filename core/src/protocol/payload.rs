//! Plaintext payload encoding
//!
//! Payloads are arbitrary JSON values. Strings are carried as their raw
//! text, everything else as serialized JSON. Decoding is best-effort: JSON
//! if the bytes parse, otherwise the text itself.

use serde_json::Value;

use crate::{Error, Result};

/// A record payload as seen by the encryption service
pub type Payload = Value;

/// Encode a payload into the bytes that get encrypted
pub fn to_plaintext(payload: &Payload) -> Result<Vec<u8>> {
    match payload {
        Value::String(text) => Ok(text.as_bytes().to_vec()),
        other => serde_json::to_vec(other)
            .map_err(|e| Error::encryption("serialize payload", e.to_string())),
    }
}

/// Decode decrypted bytes back into a payload.
///
/// Text that happens to be valid JSON (e.g. `42`) comes back parsed.
pub fn from_plaintext(bytes: &[u8]) -> Payload {
    serde_json::from_slice(bytes)
        .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(bytes).into_owned()))
}
