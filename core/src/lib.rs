//! MediChain Core - encrypted medical record storage
//!
//! This library provides client-side envelope encryption for medical
//! records and a gateway that persists the ciphertext on IPFS, returning a
//! content identifier suitable for embedding in an on-chain token.

pub mod crypto;
pub mod protocol;
pub mod service;
pub mod storage;

mod error;

use std::path::PathBuf;
use std::time::Duration;

use url::Url;

pub use error::{Error, Result};

use protocol::constants::{
    DATA_DIR_NAME, DEFAULT_IPFS_API_URL, DEFAULT_IPFS_GATEWAY_URL, DEFAULT_STORAGE_TIMEOUT_SECS,
};

/// Basic-auth credentials for hosted IPFS APIs
#[derive(Clone)]
pub struct IpfsAuth {
    pub project_id: String,
    pub project_secret: String,
}

impl std::fmt::Debug for IpfsAuth {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IpfsAuth")
            .field("project_id", &self.project_id)
            .finish_non_exhaustive()
    }
}

/// Configuration for the MediChain gateway
#[derive(Debug, Clone)]
pub struct Config {
    /// IPFS HTTP RPC endpoint
    pub ipfs_api_url: Url,
    /// Public gateway used for shareable links
    pub ipfs_gateway_url: Url,
    /// Credentials for the RPC endpoint, if it needs them
    pub ipfs_auth: Option<IpfsAuth>,
    /// Per-request timeout against the storage network
    pub storage_timeout: Duration,
    /// Path to store local key material
    pub data_dir: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            ipfs_api_url: parse_base_url("default IPFS API", DEFAULT_IPFS_API_URL)
                .expect("default IPFS API URL is valid"),
            ipfs_gateway_url: parse_base_url("default IPFS gateway", DEFAULT_IPFS_GATEWAY_URL)
                .expect("default IPFS gateway URL is valid"),
            ipfs_auth: None,
            storage_timeout: Duration::from_secs(DEFAULT_STORAGE_TIMEOUT_SECS),
            data_dir: dirs_home().join(DATA_DIR_NAME),
        }
    }
}

impl Config {
    /// Build from process environment variables, falling back to defaults
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary variable lookup.
    ///
    /// Recognized: `IPFS_API_URL`, `IPFS_GATEWAY_URL`, `IPFS_PROJECT_ID`,
    /// `IPFS_PROJECT_SECRET`, `IPFS_TIMEOUT_SECS`, `MEDICHAIN_DATA_DIR`.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(url) = var("IPFS_API_URL") {
            config.ipfs_api_url = parse_base_url("IPFS_API_URL", &url)?;
        }
        if let Some(url) = var("IPFS_GATEWAY_URL") {
            config.ipfs_gateway_url = parse_base_url("IPFS_GATEWAY_URL", &url)?;
        }
        config.ipfs_auth = match (var("IPFS_PROJECT_ID"), var("IPFS_PROJECT_SECRET")) {
            (Some(project_id), Some(project_secret)) => Some(IpfsAuth {
                project_id,
                project_secret,
            }),
            (None, None) => None,
            _ => {
                return Err(Error::Config(
                    "IPFS_PROJECT_ID and IPFS_PROJECT_SECRET must be set together".to_string(),
                ))
            }
        };
        if let Some(secs) = var("IPFS_TIMEOUT_SECS") {
            let secs: u64 = secs
                .trim()
                .parse()
                .map_err(|_| Error::Config(format!("IPFS_TIMEOUT_SECS: not a number: {:?}", secs)))?;
            config.storage_timeout = Duration::from_secs(secs);
        }
        if let Some(dir) = var("MEDICHAIN_DATA_DIR") {
            config.data_dir = PathBuf::from(dir);
        }
        Ok(config)
    }
}

/// Parse a URL used as a join base; a trailing slash keeps its path on join
fn parse_base_url(name: &str, raw: &str) -> Result<Url> {
    let raw = raw.trim();
    let with_slash = if raw.ends_with('/') {
        raw.to_string()
    } else {
        format!("{}/", raw)
    };
    Url::parse(&with_slash).map_err(|e| Error::Config(format!("{}: {}", name, e)))
}

fn dirs_home() -> PathBuf {
    dirs::home_dir().unwrap_or_else(|| PathBuf::from("."))
}

// Re-export key types for convenience
pub use crypto::{EncryptedEnvelope, KeyPair, PrivateKey, PublicKey, SymmetricKeyMaterial};
pub use protocol::Payload;
pub use service::{RecordGateway, UploadReceipt};
pub use storage::{BlobStore, IpfsStore, MemoryStore};
