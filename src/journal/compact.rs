//! Journal compaction
//!
//! A journal only grows. When it holds far more records than live keys, it
//! is rewritten as one `Put` per key.

use super::JournalEntry;
use crate::store::{Change, MemoryStore};

/// Decide whether a journal of `entry_count` records holding `live_keys`
/// keys should be rewritten
pub fn needs_compaction(entry_count: usize, live_keys: usize, min_entries: usize, ratio: f64) -> bool {
    if entry_count < min_entries {
        return false;
    }
    entry_count as f64 > ratio * live_keys.max(1) as f64
}

/// One `Put` entry per key currently in the store
pub fn snapshot_entries(store: &MemoryStore) -> Vec<JournalEntry> {
    store
        .iter()
        .map(|(key, value)| JournalEntry::from_change(&Change::Put(key.clone(), value.clone())))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::PrefValue;

    #[test]
    fn test_small_journal_left_alone() {
        assert!(!needs_compaction(10, 1, 100, 2.0));
    }

    #[test]
    fn test_bloated_journal_compacted() {
        assert!(needs_compaction(500, 10, 100, 2.0));
        assert!(!needs_compaction(150, 100, 100, 2.0));
    }

    #[test]
    fn test_empty_store_counts_as_one_key() {
        assert!(needs_compaction(100, 0, 100, 2.0));
    }

    #[test]
    fn test_snapshot_entries_cover_store() {
        let mut store = MemoryStore::new();
        store.set("a", PrefValue::Int(1));
        store.set("b", PrefValue::string_set(["x"]));

        let entries = snapshot_entries(&store);
        assert_eq!(entries.len(), 2);

        let mut rebuilt = MemoryStore::new();
        crate::journal::replay_entries(&mut rebuilt, &entries);
        assert_eq!(rebuilt.snapshot(), store.snapshot());
    }
}
