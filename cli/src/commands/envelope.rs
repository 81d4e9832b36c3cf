//! Public-key envelope commands.

use anyhow::Context;
use medichain_core::crypto::{decrypt_with_private_key, encrypt_with_public_key};
use medichain_core::{Config, EncryptedEnvelope, PrivateKey, PublicKey};

use crate::io::{load_key_pair, print_json, read_payload};
use crate::InputArgs;

/// Encrypt the input record to `public_key` and print the envelope.
pub fn encrypt(public_key: &str, input: &InputArgs) -> anyhow::Result<()> {
    let public_key = PublicKey::from_hex(public_key)?;
    let payload = read_payload(input)?;
    print_json(&encrypt_with_public_key(&payload, &public_key)?)
}

/// Decrypt the input envelope and print the record.
pub fn decrypt(config: &Config, private_key: Option<&str>, input: &InputArgs) -> anyhow::Result<()> {
    let private_key = match private_key {
        Some(hex) => PrivateKey::from_hex(hex)?,
        None => load_key_pair(config)?.private_key,
    };
    let value = read_payload(input)?;
    let envelope = EncryptedEnvelope::from_json(&value)
        .context("input is not an envelope (expected iv, ephemPublicKey, ciphertext, mac)")??;
    print_json(&decrypt_with_private_key(&envelope, &private_key)?)
}
