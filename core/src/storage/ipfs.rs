//! IPFS HTTP RPC client (`/api/v0/add`, `/api/v0/cat`)

use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use reqwest::{Client, RequestBuilder, Response};
use serde::Deserialize;
use url::Url;

use super::{BlobStore, StoredBlob};
use crate::{Config, Error, IpfsAuth, Result};

/// Blob store backed by an IPFS node or hosted pinning API
#[derive(Debug, Clone)]
pub struct IpfsStore {
    api_url: Url,
    auth: Option<IpfsAuth>,
    client: Client,
}

/// Body of a successful `/api/v0/add`
#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct AddResponse {
    hash: String,
    size: String,
}

impl IpfsStore {
    pub fn new(config: &Config) -> Result<Self> {
        let client = Client::builder().timeout(config.storage_timeout).build()?;
        Ok(Self {
            api_url: config.ipfs_api_url.clone(),
            auth: config.ipfs_auth.clone(),
            client,
        })
    }

    /// Base URL of the RPC API
    pub fn api_url(&self) -> &Url {
        &self.api_url
    }

    fn endpoint(&self, path: &str) -> Result<Url> {
        self.api_url
            .join(path)
            .map_err(|e| Error::Config(format!("invalid IPFS endpoint {}: {}", path, e)))
    }

    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        match &self.auth {
            Some(auth) => request.basic_auth(&auth.project_id, Some(&auth.project_secret)),
            None => request,
        }
    }

    async fn check(response: Response) -> Result<Response> {
        let status = response.status();
        if status.is_success() {
            Ok(response)
        } else {
            let body = response.text().await.unwrap_or_default();
            Err(Error::Storage(format!("IPFS returned {}: {}", status, body.trim())))
        }
    }
}

#[async_trait]
impl BlobStore for IpfsStore {
    async fn add(&self, bytes: Vec<u8>) -> Result<StoredBlob> {
        let url = self.endpoint("api/v0/add")?;
        let form = Form::new().part("file", Part::bytes(bytes).file_name("record.json"));

        tracing::debug!(%url, "adding blob to IPFS");
        let response = self
            .authorize(self.client.post(url).query(&[("pin", "true")]).multipart(form))
            .send()
            .await?;
        let added: AddResponse = Self::check(response).await?.json().await?;

        let size = added
            .size
            .parse()
            .map_err(|_| Error::Storage(format!("IPFS returned non-numeric size {:?}", added.size)))?;
        Ok(StoredBlob {
            cid: added.hash,
            size,
        })
    }

    async fn cat(&self, cid: &str) -> Result<Vec<u8>> {
        let url = self.endpoint("api/v0/cat")?;

        tracing::debug!(%url, cid, "fetching blob from IPFS");
        let response = self
            .authorize(self.client.post(url).query(&[("arg", cid)]))
            .send()
            .await?;
        let bytes = Self::check(response).await?.bytes().await?;
        Ok(bytes.to_vec())
    }
}
