use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::constants::PREVIOUS_HASH_RESERVED_LEN;
use crate::error::{Result, StashError};

/// Wire shape of one chunk-table fragment record.
///
/// The index→hash entries are flattened into the top-level JSON object next to
/// the chain metadata, e.g. `{"0":"h0","1":"h1","PCTFH":"1st","TC":3}`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ChunkTableFragment {
    #[serde(flatten)]
    pub entries: BTreeMap<String, String>,
    /// Hash of the previously persisted fragment, or the `"1st"` sentinel.
    #[serde(rename = "PCTFH")]
    pub previous_fragment_hash: String,
    /// Total chunk count of the whole payload; constant across all fragments.
    #[serde(rename = "TC")]
    pub total_chunk_count: u64,
}

impl ChunkTableFragment {
    pub fn new(
        entries: &[(u32, String)],
        previous_fragment_hash: String,
        total_chunk_count: u64,
    ) -> Self {
        Self {
            entries: entries
                .iter()
                .map(|(index, hash)| (index.to_string(), hash.clone()))
                .collect(),
            previous_fragment_hash,
            total_chunk_count,
        }
    }

    /// Parse the flattened entries back into numeric index / hash pairs.
    pub fn numeric_entries(&self) -> Result<Vec<(u32, String)>> {
        self.entries
            .iter()
            .map(|(key, hash)| {
                let index = key.parse::<u32>().map_err(|_| {
                    StashError::ChunkTable(format!("non-numeric chunk index {key:?} in fragment"))
                })?;
                Ok((index, hash.clone()))
            })
            .collect()
    }
}

/// Serialized length of a fragment holding `entries`, with the predecessor hash
/// measured at its reserved width so the measurement is independent of where in
/// the chain the fragment ends up.
fn probe_len(entries: &[(u32, String)], total_chunk_count: u64) -> Result<usize> {
    let probe = ChunkTableFragment::new(
        entries,
        "9".repeat(PREVIOUS_HASH_RESERVED_LEN),
        total_chunk_count,
    );
    let json = serde_json::to_string(&probe)
        .map_err(|e| StashError::Serialization(e.to_string()))?;
    Ok(json.len())
}

/// Partition chunk-table entries into fragment groups.
///
/// Entries accumulate in index order until adding the next one would push the
/// serialized fragment past `capacity`. Deterministic for a given table and
/// capacity. An empty table yields a single entry-free group so that the chain
/// (and with it the entry hash) always exists.
pub fn partition_entries(hashes: &[String], capacity: usize) -> Result<Vec<Vec<(u32, String)>>> {
    let total = hashes.len() as u64;
    let mut groups: Vec<Vec<(u32, String)>> = Vec::new();
    let mut current: Vec<(u32, String)> = Vec::new();

    for (index, hash) in hashes.iter().enumerate() {
        let candidate = (index as u32, hash.clone());

        current.push(candidate.clone());
        if probe_len(&current, total)? > capacity {
            current.pop();
            if current.is_empty() {
                return Err(StashError::ChunkTable(format!(
                    "chunk table entry {index} does not fit the record capacity {capacity}"
                )));
            }
            groups.push(std::mem::take(&mut current));
            current.push(candidate);
            if probe_len(&current, total)? > capacity {
                return Err(StashError::ChunkTable(format!(
                    "chunk table entry {index} does not fit the record capacity {capacity}"
                )));
            }
        }
    }

    if !current.is_empty() || groups.is_empty() {
        groups.push(current);
    }
    Ok(groups)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::{CHUNK_CONTENT_LENGTH, FIRST_FRAGMENT_SENTINEL};

    fn hashes(n: usize) -> Vec<String> {
        (0..n).map(|i| format!("{i:064}")).collect()
    }

    #[test]
    fn test_fragment_wire_shape() {
        let fragment = ChunkTableFragment::new(
            &[(0, "h0".to_string()), (1, "h1".to_string())],
            FIRST_FRAGMENT_SENTINEL.to_string(),
            2,
        );
        let json = serde_json::to_string(&fragment).unwrap();
        assert_eq!(json, r#"{"0":"h0","1":"h1","PCTFH":"1st","TC":2}"#);

        let parsed: ChunkTableFragment = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, fragment);
        assert_eq!(parsed.total_chunk_count, 2);
        assert_eq!(parsed.previous_fragment_hash, "1st");
    }

    #[test]
    fn test_numeric_entries_rejects_garbage_keys() {
        let json = r#"{"zero":"h0","PCTFH":"1st","TC":1}"#;
        let fragment: ChunkTableFragment = serde_json::from_str(json).unwrap();
        assert!(fragment.numeric_entries().is_err());
    }

    #[test]
    fn test_partition_small_table_single_group() {
        let groups = partition_entries(&hashes(3), CHUNK_CONTENT_LENGTH).unwrap();
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].len(), 3);
        assert_eq!(groups[0][2].0, 2);
    }

    #[test]
    fn test_partition_empty_table_yields_one_empty_group() {
        let groups = partition_entries(&[], CHUNK_CONTENT_LENGTH).unwrap();
        assert_eq!(groups.len(), 1);
        assert!(groups[0].is_empty());
    }

    #[test]
    fn test_partition_every_group_fits_capacity() {
        let table = hashes(100);
        let groups = partition_entries(&table, CHUNK_CONTENT_LENGTH).unwrap();
        assert!(groups.len() > 1);

        let mut seen = 0u32;
        for group in &groups {
            assert!(!group.is_empty());
            for (index, _) in group {
                assert_eq!(*index, seen);
                seen += 1;
            }
            let fragment = ChunkTableFragment::new(
                group,
                "9".repeat(PREVIOUS_HASH_RESERVED_LEN),
                table.len() as u64,
            );
            let json = serde_json::to_string(&fragment).unwrap();
            assert!(json.len() <= CHUNK_CONTENT_LENGTH);
        }
        assert_eq!(seen as usize, table.len());
    }

    #[test]
    fn test_partition_is_deterministic() {
        let table = hashes(50);
        let a = partition_entries(&table, CHUNK_CONTENT_LENGTH).unwrap();
        let b = partition_entries(&table, CHUNK_CONTENT_LENGTH).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_partition_oversized_entry_fails() {
        let table = vec!["x".repeat(4096)];
        assert!(partition_entries(&table, CHUNK_CONTENT_LENGTH).is_err());
    }
}
