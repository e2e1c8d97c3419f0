//! Load path: the backward chain walk, then concurrent chunk record reads.

use std::collections::HashSet;
use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::chunking::bundle::{BundleProgress, ChunkBundle};
use crate::chunking::ChunkMessage;
use crate::constants::FIRST_FRAGMENT_SENTINEL;
use crate::error::{Result, StashError};
use crate::table::fragment::ChunkTableFragment;
use crate::table::ChunkTable;
use crate::traits::ledger::LedgerGateway;

use super::Stash;

impl<G: LedgerGateway + Send + Sync + 'static> Stash<G> {
    /// Walk the fragment chain backward from the entry hash down to the
    /// `"1st"` sentinel and merge the fragments into one chunk table.
    ///
    /// Structural failures here are fatal: a hash the gateway rejects, a record
    /// that does not parse as a fragment, or a chain that cycles.
    pub(crate) async fn rebuild_chunk_table(&self, entry_hash: &str) -> Result<ChunkTable> {
        let mut fragments: Vec<ChunkTableFragment> = Vec::new();
        let mut visited: HashSet<String> = HashSet::new();

        let mut previous = entry_hash.to_string();
        while previous != FIRST_FRAGMENT_SENTINEL {
            if !visited.insert(previous.clone()) {
                return Err(StashError::ChunkTable(format!(
                    "fragment chain cycles through {previous}"
                )));
            }
            let raw = self.gateway.fetch_record_payload(&previous).await?;
            let fragment: ChunkTableFragment = serde_json::from_str(&raw).map_err(|e| {
                StashError::ChunkTable(format!("record {previous} is not a fragment: {e}"))
            })?;
            previous = fragment.previous_fragment_hash.clone();
            fragments.insert(0, fragment);
        }

        debug!(fragments = fragments.len(), "fragment chain walked to its sentinel");
        ChunkTable::from_fragments(&fragments)
    }

    /// Fetch every chunk record of the table, retrying failed chunks in sweeps
    /// until the bundle is complete or the ceiling is hit.
    pub(crate) async fn retrieve_bundle(&self, table: &ChunkTable) -> Result<ChunkBundle> {
        let progress = Arc::new(BundleProgress::new(ChunkBundle::for_retrieval(
            table.hashes(),
        )));
        let hashes: Arc<Vec<String>> = Arc::new(table.hashes().to_vec());
        info!(chunks = table.len(), "retrieving chunk bundle");

        self.run_sweeps(&progress, "chunk read", |index| {
            let gateway = Arc::clone(&self.gateway);
            let progress = Arc::clone(&progress);
            let hashes = Arc::clone(&hashes);
            async move {
                let hash = hashes[index as usize].clone();
                match retrieve_chunk(gateway.as_ref(), &hash).await {
                    Ok(content) => progress.mark_retrieved(index, content),
                    Err(err) => {
                        warn!(index, error = %err, "chunk read failed; will retry");
                        progress.mark_failed(index);
                    }
                }
            }
        })
        .await?;

        Ok(progress.take_bundle())
    }
}

/// Fetch one chunk record and extract its content.
async fn retrieve_chunk<G: LedgerGateway>(gateway: &G, hash: &str) -> Result<String> {
    let raw = gateway.fetch_record_payload(hash).await?;
    let message: ChunkMessage = serde_json::from_str(&raw)
        .map_err(|e| StashError::Serialization(format!("record {hash} is not a chunk: {e}")))?;
    Ok(message.content)
}
