//! Content-addressed blob storage
//!
//! The gateway only needs two operations from the network: add bytes and get
//! back a content identifier, and fetch bytes by identifier.

mod ipfs;
mod memory;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::Result;

pub use ipfs::IpfsStore;
pub use memory::MemoryStore;

/// Result of adding a blob
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredBlob {
    /// Content identifier assigned by the store
    pub cid: String,
    /// Size in bytes as reported by the store
    pub size: u64,
}

/// A content-addressed store
#[async_trait]
pub trait BlobStore: Send + Sync {
    /// Store `bytes`, returning its content identifier
    async fn add(&self, bytes: Vec<u8>) -> Result<StoredBlob>;

    /// Fetch the bytes stored under `cid`
    async fn cat(&self, cid: &str) -> Result<Vec<u8>>;
}
