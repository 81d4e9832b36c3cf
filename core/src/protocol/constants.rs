//! Centralized protocol constants
//!
//! Key, IV and tag sizes fixed by the envelope wire format, plus the
//! storage network defaults.

/// secp256k1 secret scalar length
pub const SECRET_KEY_LEN: usize = 32;

/// SEC1 compressed public key length
pub const COMPRESSED_PUBLIC_KEY_LEN: usize = 33;

/// SEC1 uncompressed public key length (`0x04 || x || y`)
pub const UNCOMPRESSED_PUBLIC_KEY_LEN: usize = 65;

/// AES-256 key length
pub const AES_KEY_LEN: usize = 32;

/// AES block size, also the CBC IV length
pub const AES_BLOCK_LEN: usize = 16;

/// HMAC-SHA256 tag length
pub const MAC_LEN: usize = 32;

/// AES-256-GCM nonce length
pub const GCM_NONCE_LEN: usize = 12;

/// Default IPFS HTTP RPC endpoint
pub const DEFAULT_IPFS_API_URL: &str = "https://ipfs.infura.io:5001";

/// Default public gateway used to build shareable links
pub const DEFAULT_IPFS_GATEWAY_URL: &str = "https://ipfs.io";

/// Default per-request timeout for the storage network
pub const DEFAULT_STORAGE_TIMEOUT_SECS: u64 = 30;

/// Directory under $HOME holding local key material
pub const DATA_DIR_NAME: &str = ".medichain";
