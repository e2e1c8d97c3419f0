pub mod secretbox;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum CryptoError {
    #[error("Key derivation failed: {0}")]
    KeyDerive(String),
    #[error("Sealing failed: {0}")]
    Seal(String),
    #[error("Opening failed: {0}")]
    Open(String),
    #[error("Invalid sealed envelope")]
    InvalidEnvelope,
}

pub type Result<T> = std::result::Result<T, CryptoError>;
