use thiserror::Error;

/// MediChain error types
#[derive(Error, Debug)]
pub enum Error {
    /// Malformed key or unserializable payload on the encrypt side
    #[error("{op}: encryption failed: {reason}")]
    Encryption { op: &'static str, reason: String },

    /// Bad MAC, bad padding, malformed hex or field length on the decrypt side
    #[error("{op}: decryption failed: {reason}")]
    Decryption { op: &'static str, reason: String },

    /// Randomness source or crypto primitive unavailable. Fatal.
    #[error("Resource unavailable: {0}")]
    ResourceUnavailable(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Failed to serialize/deserialize: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    pub(crate) fn encryption(op: &'static str, reason: impl Into<String>) -> Self {
        Error::Encryption { op, reason: reason.into() }
    }

    pub(crate) fn decryption(op: &'static str, reason: impl Into<String>) -> Self {
        Error::Decryption { op, reason: reason.into() }
    }

    /// True for failures that retrying cannot fix (tamper, key mismatch, bad input)
    pub fn is_permanent(&self) -> bool {
        matches!(
            self,
            Error::Encryption { .. } | Error::Decryption { .. } | Error::ResourceUnavailable(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, Error>;
