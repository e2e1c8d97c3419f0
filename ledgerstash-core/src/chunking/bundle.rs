use std::collections::BTreeSet;
use std::sync::Mutex;

/// One capacity-bounded slice of the encoded payload, stored as one record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Chunk {
    pub index: u32,
    /// Chunk content; absent until fetched on the load path.
    pub content: Option<String>,
    /// Ledger record hash; absent until persisted on the save path.
    pub hash: Option<String>,
    pub persisted: bool,
    pub retrieved: bool,
}

/// Dense, contiguous collection of chunks indexed 0..N-1.
///
/// Lives only for the duration of one save or load call.
#[derive(Debug, Clone, Default)]
pub struct ChunkBundle {
    chunks: Vec<Chunk>,
}

impl ChunkBundle {
    /// Build a bundle for the save path from split chunk contents.
    pub fn from_contents(contents: Vec<String>) -> Self {
        let chunks = contents
            .into_iter()
            .enumerate()
            .map(|(i, content)| Chunk {
                index: i as u32,
                content: Some(content),
                hash: None,
                persisted: false,
                retrieved: false,
            })
            .collect();
        Self { chunks }
    }

    /// Build a bundle for the load path from the record hashes of a chunk table.
    pub fn for_retrieval(hashes: &[String]) -> Self {
        let chunks = hashes
            .iter()
            .enumerate()
            .map(|(i, hash)| Chunk {
                index: i as u32,
                content: None,
                hash: Some(hash.clone()),
                persisted: false,
                retrieved: false,
            })
            .collect();
        Self { chunks }
    }

    pub fn len(&self) -> usize {
        self.chunks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chunks.is_empty()
    }

    pub fn chunks(&self) -> &[Chunk] {
        &self.chunks
    }

    /// Ordered record hashes, once every chunk has one.
    pub fn hashes(&self) -> Option<Vec<String>> {
        self.chunks.iter().map(|c| c.hash.clone()).collect()
    }

    /// Concatenate chunk contents in index order, once every chunk has content.
    pub fn concatenated_content(&self) -> Option<String> {
        let mut out = String::new();
        for chunk in &self.chunks {
            out.push_str(chunk.content.as_deref()?);
        }
        Some(out)
    }
}

/// The single synchronized owner of sweep state: the bundle slots, the success
/// counter, and the failed-index set. Every in-flight chunk task reports through
/// here; the orchestrator reads completion and the pending set between sweeps.
#[derive(Debug)]
pub struct BundleProgress {
    inner: Mutex<ProgressInner>,
}

#[derive(Debug)]
struct ProgressInner {
    bundle: ChunkBundle,
    successful: usize,
    failed: BTreeSet<u32>,
}

impl BundleProgress {
    pub fn new(bundle: ChunkBundle) -> Self {
        Self {
            inner: Mutex::new(ProgressInner {
                bundle,
                successful: 0,
                failed: BTreeSet::new(),
            }),
        }
    }

    pub fn total(&self) -> usize {
        self.lock().bundle.len()
    }

    /// Record a successful write. Idempotent: a second success for the same
    /// index neither double-counts nor overwrites the recorded hash.
    pub fn mark_persisted(&self, index: u32, hash: String) {
        let mut inner = self.lock();
        inner.failed.remove(&index);
        if let Some(chunk) = inner.bundle.chunks.get_mut(index as usize) {
            if !chunk.persisted {
                chunk.hash = Some(hash);
                chunk.persisted = true;
                inner.successful += 1;
            }
        }
    }

    /// Record a successful read. Idempotent like `mark_persisted`.
    pub fn mark_retrieved(&self, index: u32, content: String) {
        let mut inner = self.lock();
        inner.failed.remove(&index);
        if let Some(chunk) = inner.bundle.chunks.get_mut(index as usize) {
            if !chunk.retrieved {
                chunk.content = Some(content);
                chunk.retrieved = true;
                inner.successful += 1;
            }
        }
    }

    /// Record a transient failure; the index joins the retry set unless it
    /// already succeeded.
    pub fn mark_failed(&self, index: u32) {
        let mut inner = self.lock();
        let succeeded = inner
            .bundle
            .chunks
            .get(index as usize)
            .map(|c| c.persisted || c.retrieved)
            .unwrap_or(false);
        if !succeeded {
            inner.failed.insert(index);
        }
    }

    pub fn success_count(&self) -> usize {
        self.lock().successful
    }

    /// The bundle is complete exactly when every chunk reached success.
    pub fn is_complete(&self) -> bool {
        let inner = self.lock();
        inner.successful == inner.bundle.len()
    }

    /// Chunk hash by index, if recorded.
    pub fn chunk_hash(&self, index: u32) -> Option<String> {
        self.lock()
            .bundle
            .chunks
            .get(index as usize)
            .and_then(|c| c.hash.clone())
    }

    /// Indices that have not reached success yet, in order. Covers the failed
    /// set plus anything whose task never reported an outcome.
    pub fn pending_indices(&self) -> Vec<u32> {
        self.lock()
            .bundle
            .chunks
            .iter()
            .filter(|c| !(c.persisted || c.retrieved))
            .map(|c| c.index)
            .collect()
    }

    /// Take the bundle out once sweeping is done, leaving an empty one behind.
    pub fn take_bundle(&self) -> ChunkBundle {
        std::mem::take(&mut self.lock().bundle)
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, ProgressInner> {
        // A poisoned lock only ever holds state a failed sweep will re-derive.
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }
}
