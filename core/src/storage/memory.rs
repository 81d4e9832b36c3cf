//! In-process store for tests and offline use

use std::collections::HashMap;

use async_trait::async_trait;
use sha2::{Digest, Sha256};
use tokio::sync::RwLock;

use super::{BlobStore, StoredBlob};
use crate::{Error, Result};

/// Blobs keyed by the hex SHA-256 of their content
#[derive(Debug, Default)]
pub struct MemoryStore {
    blobs: RwLock<HashMap<String, Vec<u8>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of distinct blobs held
    pub async fn len(&self) -> usize {
        self.blobs.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.blobs.read().await.is_empty()
    }

    /// Overwrite a stored blob in place. Used to simulate a corrupted network.
    pub async fn replace(&self, cid: &str, bytes: Vec<u8>) -> Result<()> {
        match self.blobs.write().await.get_mut(cid) {
            Some(slot) => {
                *slot = bytes;
                Ok(())
            }
            None => Err(Error::Storage(format!("unknown cid: {}", cid))),
        }
    }
}

#[async_trait]
impl BlobStore for MemoryStore {
    async fn add(&self, bytes: Vec<u8>) -> Result<StoredBlob> {
        let cid = hex::encode(Sha256::digest(&bytes));
        let size = bytes.len() as u64;
        self.blobs.write().await.insert(cid.clone(), bytes);
        Ok(StoredBlob { cid, size })
    }

    async fn cat(&self, cid: &str) -> Result<Vec<u8>> {
        self.blobs
            .read()
            .await
            .get(cid)
            .cloned()
            .ok_or_else(|| Error::Storage(format!("unknown cid: {}", cid)))
    }
}
