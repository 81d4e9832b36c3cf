//! Record gateway: encrypt, persist, retrieve

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use url::Url;

use crate::crypto::{
    decrypt_with_private_key, encrypt_with_public_key, open_symmetric, seal_symmetric,
    EncryptedEnvelope, PrivateKey, PublicKey, SymmetricKeyMaterial,
};
use crate::protocol::{from_plaintext, Payload};
use crate::storage::{BlobStore, IpfsStore};
use crate::{Config, Error, Result};

/// JSON field carrying a sealed (AES-GCM) record
const SEALED_FIELD: &str = "sealed";

/// What the caller gets back after an upload
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadReceipt {
    pub cid: String,
    pub size: u64,
    pub is_encrypted: bool,
    /// Public gateway link to the stored blob
    pub url: String,
}

/// Stores records on a content-addressed network, optionally encrypting first
#[derive(Debug)]
pub struct RecordGateway<S> {
    store: S,
    gateway_url: Url,
}

impl RecordGateway<IpfsStore> {
    /// Gateway over the IPFS node named in `config`
    pub fn ipfs(config: &Config) -> Result<Self> {
        Ok(Self::new(config, IpfsStore::new(config)?))
    }
}

impl<S: BlobStore> RecordGateway<S> {
    pub fn new(config: &Config, store: S) -> Self {
        Self {
            store,
            gateway_url: config.ipfs_gateway_url.clone(),
        }
    }

    /// The underlying store
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Upload `payload`. With a public key, the stored blob is an envelope.
    pub async fn upload(&self, payload: &Payload, public_key: Option<&PublicKey>) -> Result<UploadReceipt> {
        let stored = match public_key {
            Some(key) => serde_json::to_value(encrypt_with_public_key(payload, key)?)?,
            None => payload.clone(),
        };
        self.put(&stored, public_key.is_some()).await
    }

    /// Upload `payload` sealed with AES-256-GCM under `material`
    pub async fn upload_sealed(&self, payload: &Payload, material: &SymmetricKeyMaterial) -> Result<UploadReceipt> {
        let sealed = seal_symmetric(payload, material)?;
        self.put(&json!({ SEALED_FIELD: sealed }), true).await
    }

    /// Fetch `cid`. With a private key, a stored envelope is decrypted;
    /// anything else comes back as stored.
    pub async fn retrieve(&self, cid: &str, private_key: Option<&PrivateKey>) -> Result<Payload> {
        let value = self.get(cid).await?;
        match (private_key, EncryptedEnvelope::from_json(&value)) {
            (Some(key), Some(envelope)) => {
                tracing::debug!(cid, "decrypting stored envelope");
                decrypt_with_private_key(&envelope?, key)
            }
            _ => Ok(value),
        }
    }

    /// Fetch and open a record written by [`upload_sealed`](Self::upload_sealed)
    pub async fn retrieve_sealed(&self, cid: &str, material: &SymmetricKeyMaterial) -> Result<Payload> {
        let value = self.get(cid).await?;
        let sealed = value
            .get(SEALED_FIELD)
            .and_then(Value::as_str)
            .ok_or_else(|| Error::decryption("retrieve sealed", format!("{}: no sealed record", cid)))?;
        open_symmetric(sealed, material)
    }

    /// Public link for a content identifier
    pub fn link(&self, cid: &str) -> Result<String> {
        self.gateway_url
            .join(&format!("ipfs/{}", cid))
            .map(String::from)
            .map_err(|e| Error::Config(format!("invalid gateway URL: {}", e)))
    }

    async fn put(&self, value: &Value, is_encrypted: bool) -> Result<UploadReceipt> {
        let bytes = serde_json::to_vec(value)?;
        let blob = self.store.add(bytes).await?;
        tracing::info!(cid = %blob.cid, size = blob.size, is_encrypted, "record stored");

        Ok(UploadReceipt {
            url: self.link(&blob.cid)?,
            cid: blob.cid,
            size: blob.size,
            is_encrypted,
        })
    }

    async fn get(&self, cid: &str) -> Result<Value> {
        let bytes = self.store.cat(cid).await?;
        tracing::debug!(cid, bytes = bytes.len(), "record fetched");
        Ok(from_plaintext(&bytes))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::generate_key_pair;
    use crate::storage::MemoryStore;

    fn gateway() -> RecordGateway<MemoryStore> {
        RecordGateway::new(&Config::default(), MemoryStore::new())
    }

    #[tokio::test]
    async fn test_encrypted_roundtrip() {
        let gw = gateway();
        let pair = generate_key_pair().unwrap();
        let diagnosis = json!({"condition": "migraine", "recommendations": "rest"});

        let receipt = gw.upload(&diagnosis, Some(&pair.public_key)).await.unwrap();
        assert!(receipt.is_encrypted);
        assert_eq!(receipt.url, format!("https://ipfs.io/ipfs/{}", receipt.cid));

        // Without the key the envelope itself comes back
        let raw = gw.retrieve(&receipt.cid, None).await.unwrap();
        assert!(EncryptedEnvelope::from_json(&raw).is_some());

        let decrypted = gw.retrieve(&receipt.cid, Some(&pair.private_key)).await.unwrap();
        assert_eq!(decrypted, diagnosis);
    }

    #[tokio::test]
    async fn test_plain_upload_ignores_key_on_retrieve() {
        let gw = gateway();
        let pair = generate_key_pair().unwrap();
        let receipt = gw.upload(&json!({"note": "public"}), None).await.unwrap();
        assert!(!receipt.is_encrypted);

        let value = gw.retrieve(&receipt.cid, Some(&pair.private_key)).await.unwrap();
        assert_eq!(value, json!({"note": "public"}));
    }

    #[tokio::test]
    async fn test_wrong_key_on_retrieve() {
        let gw = gateway();
        let alice = generate_key_pair().unwrap();
        let bob = generate_key_pair().unwrap();
        let receipt = gw.upload(&json!("secret"), Some(&alice.public_key)).await.unwrap();

        let result = gw.retrieve(&receipt.cid, Some(&bob.private_key)).await;
        assert!(matches!(result, Err(Error::Decryption { .. })));
    }

    #[tokio::test]
    async fn test_corrupted_blob_rejected() {
        let gw = gateway();
        let pair = generate_key_pair().unwrap();
        let receipt = gw.upload(&json!({"condition": "migraine"}), Some(&pair.public_key)).await.unwrap();

        let mut stored = gw.retrieve(&receipt.cid, None).await.unwrap();
        stored["ciphertext"] = json!("00".repeat(16));
        gw.store()
            .replace(&receipt.cid, serde_json::to_vec(&stored).unwrap())
            .await
            .unwrap();

        let err = gw.retrieve(&receipt.cid, Some(&pair.private_key)).await.unwrap_err();
        assert!(matches!(err, Error::Decryption { .. }));
        assert!(err.is_permanent());
    }

    #[tokio::test]
    async fn test_sealed_roundtrip() {
        let gw = gateway();
        let km = SymmetricKeyMaterial::generate().unwrap();
        let receipt = gw.upload_sealed(&json!({"condition": "flu"}), &km).await.unwrap();
        assert!(receipt.is_encrypted);
        assert_eq!(gw.retrieve_sealed(&receipt.cid, &km).await.unwrap(), json!({"condition": "flu"}));
    }

    #[tokio::test]
    async fn test_non_json_blob_is_text() {
        let gw = gateway();
        let blob = gw.store().add(b"plain text".to_vec()).await.unwrap();
        assert_eq!(gw.retrieve(&blob.cid, None).await.unwrap(), json!("plain text"));
    }
}
