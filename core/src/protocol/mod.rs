//! Wire formats: payload encoding and protocol constants

pub mod constants;
pub mod payload;

pub use payload::{from_plaintext, to_plaintext, Payload};
