//! Key generation commands.

use std::path::PathBuf;

use medichain_core::crypto::{generate_key_pair, generate_symmetric_key};
use medichain_core::Config;

use crate::io::{key_pair_path, print_json, save_key_pair};

/// Generate a key pair and print or save it.
pub fn keygen(config: &Config, out: Option<PathBuf>, save: bool) -> anyhow::Result<()> {
    let pair = generate_key_pair()?;
    let target = if save { Some(key_pair_path(config)) } else { out };

    match target {
        Some(path) => {
            save_key_pair(&path, &pair)?;
            tracing::info!(fingerprint = %pair.public_key.fingerprint(), "key pair saved to {}", path.display());
            print_json(&serde_json::json!({ "publicKey": pair.public_key }))
        }
        None => print_json(&pair),
    }
}

/// Generate symmetric key material and print it.
pub fn symkey() -> anyhow::Result<()> {
    print_json(&generate_symmetric_key()?)
}
