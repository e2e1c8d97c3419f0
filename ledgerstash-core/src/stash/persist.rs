//! Save path: concurrent chunk record writes, then the sequential fragment
//! chain.

use std::sync::Arc;

use tokio::time::sleep;
use tracing::{debug, info, warn};

use crate::chunking::bundle::{BundleProgress, ChunkBundle};
use crate::chunking::ChunkMessage;
use crate::constants::FIRST_FRAGMENT_SENTINEL;
use crate::error::{Result, StashError};
use crate::table::fragment::{partition_entries, ChunkTableFragment};
use crate::table::ChunkTable;
use crate::traits::ledger::LedgerGateway;

use super::Stash;

impl<G: LedgerGateway + Send + Sync + 'static> Stash<G> {
    /// Write every chunk as its own record, retrying failed chunks in sweeps
    /// until the bundle is complete or the ceiling is hit.
    pub(crate) async fn persist_bundle(&self, contents: Vec<String>) -> Result<ChunkBundle> {
        let progress = Arc::new(BundleProgress::new(ChunkBundle::from_contents(
            contents.clone(),
        )));
        let contents = Arc::new(contents);

        self.run_sweeps(&progress, "chunk write", |index| {
            let gateway = Arc::clone(&self.gateway);
            let progress = Arc::clone(&progress);
            let contents = Arc::clone(&contents);
            let seed = self.seed.clone();
            let tag = self.config.tag.clone();
            async move {
                let content = contents[index as usize].clone();
                match persist_chunk(gateway.as_ref(), &seed, &tag, &content).await {
                    Ok(hash) => progress.mark_persisted(index, hash),
                    Err(err) => {
                        warn!(index, error = %err, "chunk write failed; will retry");
                        progress.mark_failed(index);
                    }
                }
            }
        })
        .await?;

        Ok(progress.take_bundle())
    }

    /// Fragment the chunk table and persist the fragments strictly in order:
    /// each record must carry the hash the previous write returned. Returns the
    /// last fragment's hash, the entry hash of the payload.
    pub(crate) async fn persist_chunk_table(&self, table: &ChunkTable) -> Result<String> {
        let groups = partition_entries(table.hashes(), self.config.chunk_capacity)?;
        let total = table.len() as u64;
        info!(fragments = groups.len(), "persisting chunk table chain");

        let mut previous = FIRST_FRAGMENT_SENTINEL.to_string();
        for (position, group) in groups.iter().enumerate() {
            let fragment = ChunkTableFragment::new(group, previous, total);
            let message = serde_json::to_string(&fragment)
                .map_err(|e| StashError::Serialization(e.to_string()))?;
            previous = self.send_fragment(&message, position).await?;
        }
        Ok(previous)
    }

    /// Send one fragment record, retrying with doubling backoff up to the
    /// ceiling.
    async fn send_fragment(&self, message: &str, position: usize) -> Result<String> {
        let mut backoff = self.config.retry_backoff;
        let mut attempts = 0u32;
        loop {
            match persist_record(self.gateway.as_ref(), &self.seed, &self.config.tag, message)
                .await
            {
                Ok(hash) => {
                    debug!(position, hash = %hash, "fragment persisted");
                    return Ok(hash);
                }
                Err(err) => {
                    attempts += 1;
                    if attempts > self.config.max_retries {
                        return Err(StashError::RetriesExhausted {
                            operation: "chunk table write",
                            attempts,
                            remaining: 1,
                        });
                    }
                    warn!(position, error = %err, "fragment write failed; will retry");
                    sleep(backoff).await;
                    backoff = (backoff * 2).min(self.config.max_backoff);
                }
            }
        }
    }
}

/// Write one chunk's content as a `{"CC": …}` record and return its hash.
async fn persist_chunk<G: LedgerGateway>(
    gateway: &G,
    seed: &str,
    tag: &str,
    content: &str,
) -> Result<String> {
    let message = serde_json::to_string(&ChunkMessage {
        content: content.to_string(),
    })
    .map_err(|e| StashError::Serialization(e.to_string()))?;
    persist_record(gateway, seed, tag, &message).await
}

/// Obtain a fresh address and broadcast a record through the gateway.
async fn persist_record<G: LedgerGateway>(
    gateway: &G,
    seed: &str,
    tag: &str,
    message: &str,
) -> Result<String> {
    let address = gateway.new_address(seed).await?;
    let record = gateway.send(seed, &address, message, tag).await?;
    Ok(record.hash)
}
