use thiserror::Error;

use crate::crypto::CryptoError;

#[derive(Error, Debug)]
pub enum StashError {
    /// The provided secret did not decrypt the stored payload.
    #[error("Provided secret incorrect")]
    IncorrectPassword,

    /// The payload cannot be represented as the requested kind of data.
    #[error("Unsupported payload: {0}")]
    IncorrectDatatype(String),

    /// A malformed or unknown record hash was handed to the gateway.
    #[error("Invalid record hash: {0}")]
    IncorrectTransactionHash(String),

    /// The node could not serve a required structured query.
    #[error("Node outdated: {0}")]
    NodeOutdated(String),

    /// The proof-of-work attachment engine returned no result.
    #[error("Proof-of-work attachment returned no result")]
    PowInterrupted,

    /// Transient gateway failure (network, timeout); retryable.
    #[error("Gateway error: {0}")]
    Gateway(String),

    /// The fragment chain or the merged chunk table is malformed.
    #[error("Chunk table error: {0}")]
    ChunkTable(String),

    #[error("Serialization error: {0}")]
    Serialization(String),

    /// The retry ceiling was reached with chunk operations still outstanding.
    #[error("{operation} incomplete after {attempts} attempts ({remaining} chunks outstanding)")]
    RetriesExhausted {
        operation: &'static str,
        attempts: u32,
        remaining: usize,
    },

    #[error("Crypto error: {0}")]
    Crypto(#[from] CryptoError),
}

pub type Result<T> = std::result::Result<T, StashError>;
