use std::path::{Path, PathBuf};

use async_trait::async_trait;
use rand::RngCore;
use sha2::{Digest, Sha256};
use tokio::fs;
use tracing::debug;

use ledgerstash_core::{LedgerGateway, SentRecord, StashError};

/// Record hash width in hex characters (SHA-256).
const RECORD_HASH_LEN: usize = 64;

/// A ledger gateway backed by a local directory of content-addressed records.
///
/// Each record is one file at `{records_dir}/{hash}` holding the raw message,
/// where `hash` is the lowercase hex SHA-256 of `address || message`. Stands in
/// for a remote ledger node; attachment and broadcast collapse into a file
/// write.
pub struct FileLedger {
    records_dir: PathBuf,
}

impl FileLedger {
    pub fn new(records_dir: &Path) -> Self {
        Self {
            records_dir: records_dir.to_path_buf(),
        }
    }

    fn record_path(&self, hash: &str) -> PathBuf {
        self.records_dir.join(hash)
    }

    fn well_formed_hash(hash: &str) -> bool {
        hash.len() == RECORD_HASH_LEN && hash.bytes().all(|b| b.is_ascii_hexdigit())
    }
}

#[async_trait]
impl LedgerGateway for FileLedger {
    async fn new_address(&self, _seed: &str) -> Result<String, StashError> {
        let mut raw = [0u8; 32];
        rand::thread_rng().fill_bytes(&mut raw);
        Ok(hex::encode(raw))
    }

    async fn send(
        &self,
        _seed: &str,
        address: &str,
        message: &str,
        _tag: &str,
    ) -> Result<SentRecord, StashError> {
        let mut hasher = Sha256::new();
        hasher.update(address.as_bytes());
        hasher.update(message.as_bytes());
        let hash = hex::encode(hasher.finalize());

        fs::create_dir_all(&self.records_dir)
            .await
            .map_err(|e| StashError::Gateway(format!("create records dir failed: {e}")))?;
        fs::write(self.record_path(&hash), message)
            .await
            .map_err(|e| StashError::Gateway(format!("write record failed: {e}")))?;

        debug!(hash = %hash, bytes = message.len(), "record stored");
        Ok(SentRecord {
            hash,
            trunk_hash: "0".repeat(RECORD_HASH_LEN),
            branch_hash: "0".repeat(RECORD_HASH_LEN),
        })
    }

    async fn fetch_record_payload(&self, hash: &str) -> Result<String, StashError> {
        if !Self::well_formed_hash(hash) {
            return Err(StashError::IncorrectTransactionHash(hash.to_string()));
        }
        match fs::read_to_string(self.record_path(hash)).await {
            Ok(message) => Ok(message),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(StashError::IncorrectTransactionHash(hash.to_string()))
            }
            Err(e) => Err(StashError::Gateway(format!("read record failed: {e}"))),
        }
    }
}
