//! Journal replay
//!
//! Rebuilds the in-memory map from journal entries.

use super::JournalEntry;
use crate::store::MemoryStore;
use tracing::{info, warn};

/// Replay journal entries into a memory store
///
/// Entries that cannot be decoded are logged and skipped.
/// Returns the number of entries applied.
pub fn replay_entries(store: &mut MemoryStore, entries: &[JournalEntry]) -> usize {
    let mut replayed = 0;

    for entry in entries {
        match entry.to_change() {
            Ok(change) => {
                store.apply(change);
                replayed += 1;
            }
            Err(e) => {
                warn!("Failed to replay journal entry: {}. Skipping.", e);
            }
        }
    }

    info!("Successfully replayed {} journal entries", replayed);
    replayed
}
