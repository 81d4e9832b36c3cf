//! CLI command implementations.

mod envelope;
mod keys;
mod storage;
mod symmetric;

pub use envelope::{decrypt, encrypt};
pub use keys::{keygen, symkey};
pub use storage::{fetch, upload};
pub use symmetric::{open, seal, sym_decrypt, sym_encrypt};
