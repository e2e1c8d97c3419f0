//! Chunked payload persistence onto a distributed ledger.
//!
//! A payload is base64-encoded (optionally sealed with a secret), split into
//! capacity-bounded chunks, and every chunk is written as an independent ledger
//! record. A chunk table mapping chunk index to record hash is then serialized
//! into capacity-bounded fragments that are chained backward down to the `"1st"`
//! sentinel; the hash of the last fragment written is the entry hash, the only
//! token needed to load the payload again.
//!
//! The ledger node itself (address generation, proof-of-work attachment,
//! broadcast, record fetch) sits behind the [`LedgerGateway`] trait.

pub mod error;
pub mod constants;
pub mod traits;
pub mod crypto;
pub mod codec;
pub mod chunking;
pub mod table;
pub mod stash;

pub use codec::{DataKind, Payload};
pub use error::{Result, StashError};
pub use stash::{generate_seed, Stash, StashConfig};
pub use traits::ledger::{LedgerGateway, SentRecord};
