//! IPFS upload and fetch commands.

use medichain_core::{Config, PrivateKey, PublicKey, RecordGateway};

use crate::io::{load_key_pair, print_json, read_payload};
use crate::InputArgs;

/// Upload the input record and print the receipt.
pub async fn upload(config: &Config, public_key: Option<&str>, input: &InputArgs) -> anyhow::Result<()> {
    let public_key = public_key.map(PublicKey::from_hex).transpose()?;
    let payload = read_payload(input)?;

    let gateway = RecordGateway::ipfs(config)?;
    tracing::debug!(api = %gateway.store().api_url(), encrypt = public_key.is_some(), "uploading record");
    let receipt = gateway.upload(&payload, public_key.as_ref()).await?;
    print_json(&receipt)
}

/// Fetch a record by CID and print it.
pub async fn fetch(
    config: &Config,
    cid: &str,
    private_key: Option<&str>,
    saved_key: bool,
) -> anyhow::Result<()> {
    let private_key = match (private_key, saved_key) {
        (Some(hex), _) => Some(PrivateKey::from_hex(hex)?),
        (None, true) => Some(load_key_pair(config)?.private_key),
        (None, false) => None,
    };

    let gateway = RecordGateway::ipfs(config)?;
    print_json(&gateway.retrieve(cid, private_key.as_ref()).await?)
}
