//! Cryptographic primitives for MediChain
//!
//! - secp256k1 key pairs for record recipients
//! - ECIES envelopes (ECDH + AES-256-CBC + HMAC-SHA256) for records at rest
//! - AES-256 symmetric encryption with caller-held key material

mod envelope;
mod keys;
mod symmetric;
pub mod serde_utils;

pub use envelope::{
    decrypt_bytes, decrypt_with_private_key, encrypt_bytes, encrypt_with_public_key,
    EncryptedEnvelope, ENVELOPE_FIELDS,
};
pub use keys::{generate_key_pair, KeyPair, PrivateKey, PublicKey};
pub use symmetric::{
    decrypt_symmetric, encrypt_symmetric, generate_symmetric_key, open_symmetric,
    seal_symmetric, SymmetricKeyMaterial,
};
