use async_trait::async_trait;

use crate::error::StashError;

/// A record accepted by the ledger, as returned from a broadcast.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SentRecord {
    /// Hash identifying the record on the ledger.
    pub hash: String,
    /// Trunk parent the record was attached to.
    pub trunk_hash: String,
    /// Branch parent the record was attached to.
    pub branch_hash: String,
}

/// Gateway to the ledger node.
///
/// `send` internally performs proof-of-work attachment and broadcast; the engine
/// never talks to a node directly. Implementations surface the structured error
/// taxonomy: `IncorrectTransactionHash` for malformed or unknown hashes,
/// `NodeOutdated` when the node cannot serve a required structure,
/// `PowInterrupted` when attachment yields nothing, and `Gateway` for transient
/// failures.
#[async_trait]
pub trait LedgerGateway {
    /// Obtain a fresh address for the given seed.
    async fn new_address(&self, seed: &str) -> Result<String, StashError>;

    /// Write `message` as a new record on the ledger and return it.
    async fn send(
        &self,
        seed: &str,
        address: &str,
        message: &str,
        tag: &str,
    ) -> Result<SentRecord, StashError>;

    /// Fetch the raw message payload of the record identified by `hash`.
    async fn fetch_record_payload(&self, hash: &str) -> Result<String, StashError>;
}
