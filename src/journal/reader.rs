//! Journal reader
//!
//! Loads the journal file and parses its entries.

use super::JournalEntry;
use base64::{engine::general_purpose, Engine as _};
use std::fs;
use std::io;
use std::path::Path;
use tracing::{error, info, warn};

/// How many bytes of a bad record to show in the log
const PREVIEW_LEN: usize = 64;

/// Journal reader
pub struct JournalReader {
    data: Vec<u8>,
}

/// Entries recovered from a journal
#[derive(Debug, Default)]
pub struct ParsedJournal {
    /// Entries in file order
    pub entries: Vec<JournalEntry>,
    /// Bytes after the last valid entry
    pub discarded_bytes: usize,
}

impl ParsedJournal {
    /// Whether the file ended in a partial or corrupt record
    pub fn is_truncated(&self) -> bool {
        self.discarded_bytes > 0
    }
}

impl JournalReader {
    /// Load a journal file
    pub fn load<P: AsRef<Path>>(path: P) -> io::Result<Self> {
        let data = fs::read(path)?;
        Ok(JournalReader { data })
    }

    /// Load a journal file, treating a missing file as an empty journal
    pub fn load_or_empty<P: AsRef<Path>>(path: P) -> io::Result<Self> {
        match Self::load(path) {
            Ok(reader) => Ok(reader),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(JournalReader { data: Vec::new() }),
            Err(e) => Err(e),
        }
    }

    /// Parse all entries from the journal
    ///
    /// Parsing stops at the first corrupted entry; everything before it is kept.
    pub fn parse_entries(&self) -> ParsedJournal {
        let mut entries = Vec::new();
        let mut pos = 0;

        while pos < self.data.len() {
            match JournalEntry::from_bytes(&self.data[pos..]) {
                Ok((entry, size)) => {
                    entries.push(entry);
                    pos += size;
                }
                Err(e) => {
                    let end = (pos + PREVIEW_LEN).min(self.data.len());
                    let preview = general_purpose::STANDARD.encode(&self.data[pos..end]);
                    error!(
                        "Failed to parse journal entry at position {}: {}. Bytes (B64): {}",
                        pos, e, preview
                    );
                    break;
                }
            }
        }

        let discarded_bytes = self.data.len() - pos;
        if discarded_bytes > 0 {
            warn!(
                "Journal parsing stopped early: {} entries recovered, {} trailing bytes discarded",
                entries.len(),
                discarded_bytes
            );
        } else {
            info!("Journal loaded successfully: {} entries", entries.len());
        }

        ParsedJournal {
            entries,
            discarded_bytes,
        }
    }

    /// Get the total size of the journal data
    pub fn size(&self) -> usize {
        self.data.len()
    }
}
