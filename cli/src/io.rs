//! Input and output helpers shared by the commands.

use std::io::Read;
use std::path::{Path, PathBuf};

use anyhow::Context;
use medichain_core::{Config, KeyPair, Payload};
use serde::Serialize;

use crate::InputArgs;

const KEY_PAIR_FILE: &str = "keypair.json";

/// Read the raw input text from a file or stdin.
pub fn read_input(args: &InputArgs) -> anyhow::Result<String> {
    match &args.input {
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("reading {}", path.display())),
        None => {
            let mut text = String::new();
            std::io::stdin().read_to_string(&mut text).context("reading stdin")?;
            Ok(text)
        }
    }
}

/// Read a record: JSON if it parses, otherwise the trimmed text.
pub fn read_payload(args: &InputArgs) -> anyhow::Result<Payload> {
    let text = read_input(args)?;
    let text = text.trim_end_matches(['\r', '\n']);
    Ok(serde_json::from_str(text).unwrap_or_else(|_| Payload::String(text.to_string())))
}

/// Print a value as pretty JSON on stdout.
pub fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Default location of the saved key pair.
pub fn key_pair_path(config: &Config) -> PathBuf {
    config.data_dir.join(KEY_PAIR_FILE)
}

/// Write a key pair as JSON, creating parent directories.
pub fn save_key_pair(path: &Path, pair: &KeyPair) -> anyhow::Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("creating {}", parent.display()))?;
    }
    std::fs::write(path, serde_json::to_vec_pretty(pair)?)
        .with_context(|| format!("writing {}", path.display()))?;
    restrict_permissions(path)?;
    Ok(())
}

/// Load the key pair saved by `keygen --save`.
pub fn load_key_pair(config: &Config) -> anyhow::Result<KeyPair> {
    let path = key_pair_path(config);
    let bytes = std::fs::read(&path).with_context(|| {
        format!("no private key given and no saved key pair at {}", path.display())
    })?;
    serde_json::from_slice(&bytes).with_context(|| format!("parsing {}", path.display()))
}

#[cfg(unix)]
fn restrict_permissions(path: &Path) -> anyhow::Result<()> {
    use std::os::unix::fs::PermissionsExt;
    std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o600))
        .with_context(|| format!("restricting permissions on {}", path.display()))
}

#[cfg(not(unix))]
fn restrict_permissions(_path: &Path) -> anyhow::Result<()> {
    Ok(())
}
