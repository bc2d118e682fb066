//! Append-only journal persistence module
//!
//! Provides durability by logging every preference change to disk.
//! Each change is written in a compact binary format with checksums,
//! and the whole namespace is rebuilt by replaying the file on open.

mod compact;
mod entry;
mod reader;
mod replay;
mod writer;

pub use compact::{needs_compaction, snapshot_entries};
pub use entry::{decode_value, encode_value, JournalEntry, JournalOperation};
pub use reader::{JournalReader, ParsedJournal};
pub use replay::replay_entries;
pub use writer::JournalWriter;

use serde::Deserialize;
use std::path::{Path, PathBuf};

/// File extension of journal files
pub const JOURNAL_EXTENSION: &str = "journal";

/// Directory under the data directory holding every namespace's journal
pub const JOURNAL_DIR: &str = "shared_prefs";

/// Journal sync policy for apply-mode writes.
/// Commit-mode writes always sync.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SyncPolicy {
    /// Sync after every write (safest, slowest)
    Always,
    /// Sync every second (balanced)
    #[default]
    EverySecond,
    /// Let the OS decide when to sync (fastest, least safe)
    No,
}

/// Path of the journal holding `namespace` under `data_dir`
pub fn journal_path(data_dir: &Path, namespace: &str) -> PathBuf {
    data_dir
        .join(JOURNAL_DIR)
        .join(format!("{}.{}", namespace, JOURNAL_EXTENSION))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_journal_path() {
        let path = journal_path(Path::new("/data/app"), "com.example_preferences");
        assert_eq!(
            path,
            PathBuf::from("/data/app/shared_prefs/com.example_preferences.journal")
        );
    }

    #[test]
    fn test_sync_policy_from_json() {
        let policy: SyncPolicy = serde_json::from_str("\"every_second\"").unwrap();
        assert_eq!(policy, SyncPolicy::EverySecond);
        let policy: SyncPolicy = serde_json::from_str("\"always\"").unwrap();
        assert_eq!(policy, SyncPolicy::Always);
    }
}
