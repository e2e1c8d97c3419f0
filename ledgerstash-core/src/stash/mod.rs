//! The persistence and retrieval orchestrators.
//!
//! `save` encodes and splits a payload, drives concurrent per-chunk record
//! writes to completion, then chains the chunk-table fragments sequentially and
//! returns the entry hash. `load` walks the chain backward, drives concurrent
//! per-chunk reads, and reassembles the payload.

mod persist;
mod retrieve;

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use rand::Rng;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tokio::time::sleep;
use tracing::{debug, info, warn};

use crate::chunking::bundle::BundleProgress;
use crate::chunking::splitter::split_into_chunks;
use crate::codec::{self, DataKind, Payload};
use crate::constants::{
    CHUNK_CONTENT_LENGTH, DEFAULT_MAX_BACKOFF, DEFAULT_MAX_IN_FLIGHT, DEFAULT_MAX_RETRIES,
    DEFAULT_RETRY_BACKOFF, RECORD_TAG, SEED_ALPHABET, SEED_LEN,
};
use crate::error::{Result, StashError};
use crate::table::ChunkTable;
use crate::traits::ledger::LedgerGateway;

/// Tuning knobs for the orchestrators.
#[derive(Debug, Clone)]
pub struct StashConfig {
    /// Re-sweeps allowed after the initial sweep before giving up.
    pub max_retries: u32,
    /// Backoff before the first re-sweep; doubles per sweep.
    pub retry_backoff: Duration,
    /// Ceiling for the doubling backoff.
    pub max_backoff: Duration,
    /// Bound on concurrent in-flight gateway operations.
    pub max_in_flight: usize,
    /// Maximum content bytes per chunk and serialized bytes per fragment.
    pub chunk_capacity: usize,
    /// Tag attached to every record.
    pub tag: String,
}

impl Default for StashConfig {
    fn default() -> Self {
        Self {
            max_retries: DEFAULT_MAX_RETRIES,
            retry_backoff: DEFAULT_RETRY_BACKOFF,
            max_backoff: DEFAULT_MAX_BACKOFF,
            max_in_flight: DEFAULT_MAX_IN_FLIGHT,
            chunk_capacity: CHUNK_CONTENT_LENGTH,
            tag: RECORD_TAG.to_string(),
        }
    }
}

/// Persists payloads onto, and retrieves them from, a ledger behind a
/// [`LedgerGateway`].
pub struct Stash<G> {
    gateway: Arc<G>,
    seed: String,
    config: StashConfig,
}

impl<G: LedgerGateway + Send + Sync + 'static> Stash<G> {
    pub fn new(gateway: Arc<G>, seed: impl Into<String>) -> Self {
        Self::with_config(gateway, seed, StashConfig::default())
    }

    pub fn with_config(gateway: Arc<G>, seed: impl Into<String>, config: StashConfig) -> Self {
        Self {
            gateway,
            seed: seed.into(),
            config,
        }
    }

    pub fn seed(&self) -> &str {
        &self.seed
    }

    /// Persist a payload and return its entry hash, the only token needed to
    /// load it again.
    ///
    /// Fails before any record is written if the payload cannot be encoded;
    /// afterwards only by exhausting the retry ceiling.
    pub async fn save(&self, payload: &Payload, secret: Option<&str>) -> Result<String> {
        let datastring = codec::encode(payload, secret)?;
        let contents = split_into_chunks(&datastring, self.config.chunk_capacity);
        info!(
            bytes = datastring.len(),
            chunks = contents.len(),
            "saving payload"
        );

        let bundle = self.persist_bundle(contents).await?;
        let table = ChunkTable::from_bundle(&bundle)?;
        let entry_hash = self.persist_chunk_table(&table).await?;
        info!(entry_hash = %entry_hash, "payload persisted");
        Ok(entry_hash)
    }

    /// Load a payload by entry hash.
    ///
    /// Fails fast when the fragment chain cannot be walked to its sentinel;
    /// per-chunk read failures are retried up to the ceiling.
    pub async fn load(
        &self,
        entry_hash: &str,
        kind: DataKind,
        secret: Option<&str>,
    ) -> Result<Payload> {
        let table = self.rebuild_chunk_table(entry_hash).await?;
        let bundle = self.retrieve_bundle(&table).await?;
        let datastring = bundle.concatenated_content().ok_or_else(|| {
            StashError::ChunkTable("retrieved bundle is missing chunk content".to_string())
        })?;
        codec::decode(&datastring, kind, secret)
    }

    /// Drive per-chunk tasks to completion in sweeps.
    ///
    /// Each sweep spawns one task per pending index, bounded by the in-flight
    /// semaphore, and awaits them all; chunks still unfinished afterwards are
    /// re-swept after a doubling backoff, up to the retry ceiling.
    async fn run_sweeps<F, Fut>(
        &self,
        progress: &BundleProgress,
        operation: &'static str,
        make_task: F,
    ) -> Result<()>
    where
        F: Fn(u32) -> Fut,
        Fut: Future<Output = ()> + Send + 'static,
    {
        let semaphore = Arc::new(Semaphore::new(self.config.max_in_flight));
        let mut pending = progress.pending_indices();
        let mut backoff = self.config.retry_backoff;
        let mut attempts = 0u32;

        loop {
            let mut tasks = JoinSet::new();
            for index in pending {
                let semaphore = Arc::clone(&semaphore);
                let task = make_task(index);
                tasks.spawn(async move {
                    let _permit = match semaphore.acquire_owned().await {
                        Ok(permit) => permit,
                        Err(_) => return,
                    };
                    task.await;
                });
            }
            while let Some(joined) = tasks.join_next().await {
                if let Err(err) = joined {
                    warn!(error = %err, "chunk task aborted");
                }
            }

            if progress.is_complete() {
                return Ok(());
            }
            attempts += 1;
            if attempts > self.config.max_retries {
                return Err(StashError::RetriesExhausted {
                    operation,
                    attempts,
                    remaining: progress.pending_indices().len(),
                });
            }

            pending = progress.pending_indices();
            debug!(
                operation,
                attempt = attempts,
                remaining = pending.len(),
                "re-sweeping unfinished chunks"
            );
            sleep(backoff).await;
            backoff = (backoff * 2).min(self.config.max_backoff);
        }
    }
}

/// Generate a fresh random ledger seed (81 characters of A–Z and 9).
pub fn generate_seed() -> String {
    let mut rng = rand::thread_rng();
    (0..SEED_LEN)
        .map(|_| SEED_ALPHABET[rng.gen_range(0..SEED_ALPHABET.len())] as char)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_seed_shape() {
        let seed = generate_seed();
        assert_eq!(seed.len(), SEED_LEN);
        assert!(seed.bytes().all(|b| SEED_ALPHABET.contains(&b)));
    }

    #[test]
    fn test_generate_seed_is_random() {
        assert_ne!(generate_seed(), generate_seed());
    }

    #[test]
    fn test_default_config() {
        let config = StashConfig::default();
        assert_eq!(config.chunk_capacity, CHUNK_CONTENT_LENGTH);
        assert!(config.max_retries > 0);
        assert!(config.max_in_flight > 0);
    }
}
