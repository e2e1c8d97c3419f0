//! The chunk table: index → record hash, built after every chunk persisted and
//! rebuilt from the fragment chain on load.

pub mod fragment;

use crate::chunking::bundle::ChunkBundle;
use crate::error::{Result, StashError};
use fragment::ChunkTableFragment;

/// Dense mapping from chunk index to the record hash holding that chunk,
/// complete by construction: entry `i` sits at position `i`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChunkTable {
    hashes: Vec<String>,
}

impl ChunkTable {
    /// Build the table from a fully persisted bundle.
    pub fn from_bundle(bundle: &ChunkBundle) -> Result<Self> {
        let hashes = bundle.hashes().ok_or_else(|| {
            StashError::ChunkTable("bundle has chunks without a record hash".to_string())
        })?;
        Ok(Self { hashes })
    }

    /// Rebuild the table from fragments in forward chain order.
    ///
    /// Validates the invariants of a well-formed chain: a consistent total
    /// chunk count across fragments, no duplicate indices, and contiguous
    /// coverage of `0..total-1`.
    pub fn from_fragments(fragments: &[ChunkTableFragment]) -> Result<Self> {
        let total = match fragments.first() {
            Some(first) => first.total_chunk_count,
            None => return Err(StashError::ChunkTable("empty fragment chain".to_string())),
        };
        for fragment in fragments {
            if fragment.total_chunk_count != total {
                return Err(StashError::ChunkTable(format!(
                    "inconsistent total chunk count across fragments: {} vs {}",
                    fragment.total_chunk_count, total
                )));
            }
        }

        let total = usize::try_from(total)
            .map_err(|_| StashError::ChunkTable("total chunk count overflows".to_string()))?;
        let mut slots: Vec<Option<String>> = vec![None; total];
        for fragment in fragments {
            for (index, hash) in fragment.numeric_entries()? {
                let slot = slots.get_mut(index as usize).ok_or_else(|| {
                    StashError::ChunkTable(format!(
                        "chunk index {index} outside the declared total {total}"
                    ))
                })?;
                if slot.is_some() {
                    return Err(StashError::ChunkTable(format!(
                        "duplicate chunk index {index} in fragment chain"
                    )));
                }
                *slot = Some(hash);
            }
        }

        let hashes = slots
            .into_iter()
            .enumerate()
            .map(|(index, slot)| {
                slot.ok_or_else(|| {
                    StashError::ChunkTable(format!("chunk index {index} missing from the chain"))
                })
            })
            .collect::<Result<Vec<String>>>()?;
        Ok(Self { hashes })
    }

    pub fn hashes(&self) -> &[String] {
        &self.hashes
    }

    pub fn len(&self) -> usize {
        self.hashes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.hashes.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::FIRST_FRAGMENT_SENTINEL;

    fn fragment(entries: &[(u32, &str)], total: u64) -> ChunkTableFragment {
        let entries: Vec<(u32, String)> = entries
            .iter()
            .map(|(i, h)| (*i, h.to_string()))
            .collect();
        ChunkTableFragment::new(&entries, FIRST_FRAGMENT_SENTINEL.to_string(), total)
    }

    #[test]
    fn test_from_fragments_merges_in_order() {
        let fragments = vec![
            fragment(&[(0, "h0"), (1, "h1")], 3),
            fragment(&[(2, "h2")], 3),
        ];
        let table = ChunkTable::from_fragments(&fragments).unwrap();
        assert_eq!(table.hashes(), &["h0", "h1", "h2"]);
    }

    #[test]
    fn test_from_fragments_missing_index_fails() {
        let fragments = vec![fragment(&[(0, "h0"), (2, "h2")], 3)];
        let err = ChunkTable::from_fragments(&fragments).unwrap_err();
        assert!(matches!(err, StashError::ChunkTable(_)));
    }

    #[test]
    fn test_from_fragments_duplicate_index_fails() {
        let fragments = vec![
            fragment(&[(0, "h0"), (1, "h1")], 2),
            fragment(&[(1, "other")], 2),
        ];
        assert!(ChunkTable::from_fragments(&fragments).is_err());
    }

    #[test]
    fn test_from_fragments_index_beyond_total_fails() {
        let fragments = vec![fragment(&[(0, "h0"), (5, "h5")], 2)];
        assert!(ChunkTable::from_fragments(&fragments).is_err());
    }

    #[test]
    fn test_from_fragments_inconsistent_total_fails() {
        let fragments = vec![
            fragment(&[(0, "h0")], 2),
            fragment(&[(1, "h1")], 3),
        ];
        assert!(ChunkTable::from_fragments(&fragments).is_err());
    }

    #[test]
    fn test_from_fragments_empty_table() {
        let fragments = vec![fragment(&[], 0)];
        let table = ChunkTable::from_fragments(&fragments).unwrap();
        assert!(table.is_empty());
    }

    #[test]
    fn test_from_bundle_requires_all_hashes() {
        let bundle = ChunkBundle::from_contents(vec!["a".to_string()]);
        assert!(ChunkTable::from_bundle(&bundle).is_err());
    }
}
