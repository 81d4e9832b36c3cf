//! MediChain CLI - encrypt medical records and store them on IPFS.

mod commands;
mod io;

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use medichain_core::Config;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "medichain")]
#[command(about = "Encrypted medical record storage", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

/// Where to read the record from
#[derive(Args)]
pub struct InputArgs {
    /// Read from this file instead of stdin
    #[arg(short, long)]
    input: Option<PathBuf>,
}

/// Hex-encoded AES key material
#[derive(Args)]
pub struct SymmetricArgs {
    /// 32-byte key, hex
    #[arg(long)]
    key: String,
    /// 16-byte IV, hex
    #[arg(long)]
    iv: String,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate a secp256k1 key pair
    Keygen {
        /// Write the key pair to this file (default: print it)
        #[arg(short, long)]
        out: Option<PathBuf>,
        /// Write the key pair to the data directory
        #[arg(long, conflicts_with = "out")]
        save: bool,
    },
    /// Encrypt a record to a public key
    Encrypt {
        #[arg(long)]
        public_key: String,
        #[command(flatten)]
        input: InputArgs,
    },
    /// Decrypt an envelope with a private key
    Decrypt {
        /// Private key, hex (default: the saved key pair)
        #[arg(long)]
        private_key: Option<String>,
        #[command(flatten)]
        input: InputArgs,
    },
    /// Generate an AES-256 key and IV
    Symkey,
    /// Encrypt with AES-256-CBC
    SymEncrypt {
        #[command(flatten)]
        key: SymmetricArgs,
        #[command(flatten)]
        input: InputArgs,
    },
    /// Decrypt AES-256-CBC hex ciphertext
    SymDecrypt {
        #[command(flatten)]
        key: SymmetricArgs,
        #[command(flatten)]
        input: InputArgs,
    },
    /// Encrypt with AES-256-GCM
    Seal {
        #[command(flatten)]
        key: SymmetricArgs,
        #[command(flatten)]
        input: InputArgs,
    },
    /// Decrypt AES-256-GCM hex ciphertext
    Open {
        #[command(flatten)]
        key: SymmetricArgs,
        #[command(flatten)]
        input: InputArgs,
    },
    /// Upload a record to IPFS, encrypting it first when a public key is given
    Upload {
        #[arg(long)]
        public_key: Option<String>,
        #[command(flatten)]
        input: InputArgs,
    },
    /// Fetch a record from IPFS, decrypting it when a private key is given
    Fetch {
        cid: String,
        #[arg(long)]
        private_key: Option<String>,
        /// Decrypt with the saved key pair
        #[arg(long, conflicts_with = "private_key")]
        saved_key: bool,
    },
}

/// Target prefix match: covers `medichain_core` and `medichain_cli` too
const DEFAULT_LOG_DIRECTIVE: &str = "medichain=info";

fn log_filter() -> anyhow::Result<EnvFilter> {
    Ok(EnvFilter::from_default_env().add_directive(DEFAULT_LOG_DIRECTIVE.parse()?))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(log_filter()?)
        .init();

    match dotenvy::dotenv() {
        Ok(path) => tracing::debug!("loaded .env from {}", path.display()),
        Err(e) if e.not_found() => {}
        Err(e) => tracing::warn!("could not load .env file: {}", e),
    }

    let cli = Cli::parse();
    let config = Config::from_env()?;

    match cli.command {
        Commands::Keygen { out, save } => commands::keygen(&config, out, save)?,
        Commands::Encrypt { public_key, input } => commands::encrypt(&public_key, &input)?,
        Commands::Decrypt { private_key, input } => {
            commands::decrypt(&config, private_key.as_deref(), &input)?
        }
        Commands::Symkey => commands::symkey()?,
        Commands::SymEncrypt { key, input } => commands::sym_encrypt(&key, &input)?,
        Commands::SymDecrypt { key, input } => commands::sym_decrypt(&key, &input)?,
        Commands::Seal { key, input } => commands::seal(&key, &input)?,
        Commands::Open { key, input } => commands::open(&key, &input)?,
        Commands::Upload { public_key, input } => {
            commands::upload(&config, public_key.as_deref(), &input).await?
        }
        Commands::Fetch {
            cid,
            private_key,
            saved_key,
        } => commands::fetch(&config, &cid, private_key.as_deref(), saved_key).await?,
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_directive_covers_workspace_crates() {
        let filter = log_filter().unwrap().to_string();
        assert!(filter.contains(DEFAULT_LOG_DIRECTIVE));
        assert!(!filter.contains("medichain_core"));
    }
}
