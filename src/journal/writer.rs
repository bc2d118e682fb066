//! Journal writer
//!
//! Handles appending entries to the journal file and rewriting it during compaction.

use super::{JournalEntry, SyncPolicy};
use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};
use tracing::{debug, warn};

/// The open journal and the length of its last complete record
#[derive(Debug)]
struct AppendFile {
    file: File,
    len: u64,
}

impl AppendFile {
    fn open(path: &Path) -> io::Result<Self> {
        let file = open_append(path)?;
        let len = file.metadata()?.len();
        Ok(AppendFile { file, len })
    }

    /// Drop anything past the last complete record
    fn discard_tail(&mut self, path: &Path) -> io::Result<()> {
        let actual = self.file.metadata()?.len();
        if actual > self.len {
            warn!(
                "Journal {}: dropping {} bytes after the last complete record",
                path.display(),
                actual - self.len
            );
            self.file.set_len(self.len)?;
        } else if actual < self.len {
            self.len = actual;
        }
        Ok(())
    }
}

/// Journal writer
#[derive(Debug)]
pub struct JournalWriter {
    path: PathBuf,
    file: Mutex<AppendFile>,
    sync_policy: SyncPolicy,
    last_sync: Mutex<Instant>,
}

impl JournalWriter {
    /// Open (or create) the journal for appending
    pub fn new<P: AsRef<Path>>(path: P, sync_policy: SyncPolicy) -> io::Result<Self> {
        let path = path.as_ref().to_path_buf();
        let file = AppendFile::open(&path)?;

        Ok(JournalWriter {
            path,
            file: Mutex::new(file),
            sync_policy,
            last_sync: Mutex::new(Instant::now()),
        })
    }

    fn lock_file(&self) -> MutexGuard<'_, AppendFile> {
        self.file.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Write an entry to the journal
    pub fn write(&self, entry: &JournalEntry) -> io::Result<()> {
        self.write_batch(std::slice::from_ref(entry))
    }

    /// Write several entries with one `write_all`, then apply the sync policy.
    ///
    /// Bytes past the last complete record, such as the remains of an earlier
    /// failed write, are cut off first, so a record never follows garbage.
    pub fn write_batch(&self, entries: &[JournalEntry]) -> io::Result<()> {
        let bytes: Vec<u8> = entries.iter().flat_map(|e| e.to_bytes()).collect();

        let mut out = self.lock_file();
        out.discard_tail(&self.path)?;

        if let Err(e) = out.file.write_all(&bytes) {
            let len = out.len;
            if let Err(trunc) = out.file.set_len(len) {
                warn!(
                    "Journal {}: cannot drop partial record: {}",
                    self.path.display(),
                    trunc
                );
            }
            return Err(e);
        }
        out.len += bytes.len() as u64;

        match self.sync_policy {
            SyncPolicy::Always => {
                out.file.sync_all()?;
                *self.last_sync.lock().unwrap_or_else(PoisonError::into_inner) = Instant::now();
            }
            SyncPolicy::EverySecond => {
                let mut last_sync = self.last_sync.lock().unwrap_or_else(PoisonError::into_inner);
                if last_sync.elapsed() >= Duration::from_secs(1) {
                    out.file.sync_all()?;
                    *last_sync = Instant::now();
                }
            }
            SyncPolicy::No => {
                // No explicit sync
            }
        }

        Ok(())
    }

    /// Force sync to disk
    pub fn sync(&self) -> io::Result<()> {
        let out = self.lock_file();
        out.file.sync_all()?;
        *self.last_sync.lock().unwrap_or_else(PoisonError::into_inner) = Instant::now();
        Ok(())
    }

    /// Replace the whole journal with `entries`.
    ///
    /// The new content is written to a sibling temp file, synced, then renamed
    /// over the journal, so a crash leaves either the old or the new file.
    pub fn rewrite(&self, entries: &[JournalEntry]) -> io::Result<()> {
        let tmp_path = self.path.with_extension("journal.tmp");

        let mut out = self.lock_file();

        {
            let mut tmp = File::create(&tmp_path)?;
            for entry in entries {
                tmp.write_all(&entry.to_bytes())?;
            }
            tmp.sync_all()?;
        }

        fs::rename(&tmp_path, &self.path)?;
        *out = AppendFile::open(&self.path)?;
        *self.last_sync.lock().unwrap_or_else(PoisonError::into_inner) = Instant::now();

        debug!("Journal {} rewritten with {} entries", self.path.display(), entries.len());
        Ok(())
    }
}

fn open_append(path: &Path) -> io::Result<File> {
    OpenOptions::new().create(true).append(true).open(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{Change, PrefValue};

    #[test]
    fn test_write_entry() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("test_writer.journal");

        let writer = JournalWriter::new(&path, SyncPolicy::Always).unwrap();

        let entry = JournalEntry::from_change(&Change::Put(
            "testkey".to_string(),
            PrefValue::string("testvalue"),
        ));

        writer.write(&entry).unwrap();
        writer.sync().unwrap();

        let metadata = fs::metadata(&path).unwrap();
        assert_eq!(metadata.len(), entry.to_bytes().len() as u64);
    }

    #[test]
    fn test_rewrite_replaces_content() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("test_rewrite.journal");

        let writer = JournalWriter::new(&path, SyncPolicy::No).unwrap();
        for i in 0..10 {
            let entry = JournalEntry::from_change(&Change::Put("n".to_string(), PrefValue::Int(i)));
            writer.write(&entry).unwrap();
        }

        let last = JournalEntry::from_change(&Change::Put("n".to_string(), PrefValue::Int(9)));
        writer.rewrite(std::slice::from_ref(&last)).unwrap();

        // Appends after the rewrite go to the new file
        writer.write(&JournalEntry::from_change(&Change::Remove("n".to_string()))).unwrap();
        writer.sync().unwrap();

        let data = fs::read(&path).unwrap();
        let (first, size) = JournalEntry::from_bytes(&data).unwrap();
        assert_eq!(first.to_change().unwrap(), last.to_change().unwrap());
        let (second, _) = JournalEntry::from_bytes(&data[size..]).unwrap();
        assert_eq!(second.to_change().unwrap(), Change::Remove("n".to_string()));
        assert!(!dir.path().join("test_rewrite.journal.tmp").exists());
    }

    #[test]
    fn test_trailing_garbage_cut_before_append() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("test_tail.journal");
        let first = JournalEntry::from_change(&Change::Put("a".to_string(), PrefValue::Int(1)));
        let broken = JournalEntry::from_change(&Change::Put("b".to_string(), PrefValue::Int(2)));
        let last = JournalEntry::from_change(&Change::Put("c".to_string(), PrefValue::Int(3)));

        let writer = JournalWriter::new(&path, SyncPolicy::Always).unwrap();
        writer.write(&first).unwrap();

        // What an interrupted write_all leaves behind
        {
            let mut file = OpenOptions::new().append(true).open(&path).unwrap();
            file.write_all(&broken.to_bytes()[..10]).unwrap();
        }

        writer.write(&last).unwrap();

        let data = fs::read(&path).unwrap();
        assert_eq!(data.len(), first.to_bytes().len() + last.to_bytes().len());
        let (_, size) = JournalEntry::from_bytes(&data).unwrap();
        let (second, _) = JournalEntry::from_bytes(&data[size..]).unwrap();
        assert_eq!(second.to_change().unwrap(), last.to_change().unwrap());
    }
}
