//! Journaled backend
//!
//! Reads are served from an in-memory map. Every change is also turned into
//! journal entries and handed to a persister thread that owns the journal
//! writer, so apply-mode writes never wait on the disk.

use super::{PreferenceBackend, WriteMode};
use crate::config::{AppContext, PrefsConfig};
use crate::error::{PrefsError, Result};
use crate::journal::{
    journal_path, needs_compaction, replay_entries, snapshot_entries, JournalEntry,
    JournalReader, JournalWriter, SyncPolicy,
};
use crate::store::{Change, MemoryStore, PrefValue, StoreStats};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::mpsc::{sync_channel, Receiver, SyncSender};
use std::sync::{PoisonError, RwLock};
use std::thread::JoinHandle;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::time::MissedTickBehavior;
use tracing::{debug, error, info, warn};

/// Entries on their way to the journal
struct PersistRequest {
    entries: Vec<JournalEntry>,

    /// Present for commits: receives whether the entries reached the disk.
    /// A std channel, so the caller can wait from inside an async runtime.
    reply: Option<SyncSender<bool>>,
}

/// A namespace kept in memory and made durable by an append-only journal
pub struct JournaledBackend {
    namespace: String,
    path: PathBuf,
    store: RwLock<MemoryStore>,
    persist_tx: Option<mpsc::UnboundedSender<PersistRequest>>,
    worker: Option<JoinHandle<()>>,
}

impl JournaledBackend {
    /// Open the default preferences namespace of an application
    pub fn open_for(ctx: &AppContext, config: &PrefsConfig) -> Result<Self> {
        let namespace = ctx.preferences_namespace();
        let path = journal_path(ctx.data_dir(), &namespace);
        Self::open(path, namespace, config)
    }

    /// Open the journal at `path`, replay it and start the persister thread
    pub fn open(path: impl Into<PathBuf>, namespace: impl Into<String>, config: &PrefsConfig) -> Result<Self> {
        let path = path.into();
        let namespace = namespace.into();
        config.validate()?;

        info!("Opening preferences '{}' at {}", namespace, path.display());

        if let Some(dir) = path.parent() {
            std::fs::create_dir_all(dir).map_err(|e| {
                PrefsError::init(&namespace, format!("cannot create {}: {}", dir.display(), e))
            })?;
        }

        let parsed = JournalReader::load_or_empty(&path)
            .map_err(|e| PrefsError::init(&namespace, format!("cannot read journal: {}", e)))?
            .parse_entries();

        let mut store = MemoryStore::new();
        replay_entries(&mut store, &parsed.entries);

        let writer = JournalWriter::new(&path, config.sync_policy)
            .map_err(|e| PrefsError::init(&namespace, format!("cannot open journal: {}", e)))?;

        // A corrupt tail must go before anything is appended after it
        let bloated = needs_compaction(
            parsed.entries.len(),
            store.len(),
            config.compact_min_entries,
            config.compact_ratio,
        );
        if parsed.is_truncated() || bloated {
            info!(
                "Compacting journal of '{}': {} entries for {} keys",
                namespace,
                parsed.entries.len(),
                store.len()
            );
            writer
                .rewrite(&snapshot_entries(&store))
                .map_err(|e| PrefsError::init(&namespace, format!("cannot compact journal: {}", e)))?;
        }

        Self::start(namespace, path, store, writer, config.sync_policy)
    }

    /// Start the persister thread that owns `writer`
    fn start(
        namespace: String,
        path: PathBuf,
        store: MemoryStore,
        writer: JournalWriter,
        sync_policy: SyncPolicy,
    ) -> Result<Self> {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(|e| PrefsError::init(&namespace, format!("cannot build persister runtime: {}", e)))?;

        let (persist_tx, persist_rx) = mpsc::unbounded_channel();
        let thread_namespace = namespace.clone();

        let worker = std::thread::Builder::new()
            .name(format!("preffy-{}", namespace))
            .spawn(move || {
                runtime.block_on(run_persister(thread_namespace, writer, sync_policy, persist_rx));
            })
            .map_err(|e| PrefsError::init(&namespace, format!("cannot start persister: {}", e)))?;

        info!("Preferences '{}' ready with {} keys", namespace, store.len());

        Ok(JournaledBackend {
            namespace,
            path,
            store: RwLock::new(store),
            persist_tx: Some(persist_tx),
            worker: Some(worker),
        })
    }

    /// Path of the journal file
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Get statistics about the in-memory map
    pub fn stats(&self) -> StoreStats {
        let store = self.store.read().unwrap_or_else(PoisonError::into_inner);
        store.stats()
    }
}

impl PreferenceBackend for JournaledBackend {
    fn namespace(&self) -> &str {
        &self.namespace
    }

    fn get(&self, key: &str) -> Option<PrefValue> {
        let store = self.store.read().unwrap_or_else(PoisonError::into_inner);
        store.get(key).cloned()
    }

    fn contains(&self, key: &str) -> bool {
        let store = self.store.read().unwrap_or_else(PoisonError::into_inner);
        store.exists(key)
    }

    fn snapshot(&self) -> HashMap<String, PrefValue> {
        let store = self.store.read().unwrap_or_else(PoisonError::into_inner);
        store.snapshot()
    }

    fn submit(&self, changes: Vec<Change>, mode: WriteMode) -> bool {
        if changes.is_empty() {
            return true;
        }

        let Some(persist_tx) = self.persist_tx.as_ref() else {
            return false;
        };

        let entries: Vec<JournalEntry> = changes.iter().map(JournalEntry::from_change).collect();
        let (reply, reply_rx): (Option<SyncSender<bool>>, Option<Receiver<bool>>) = match mode {
            WriteMode::Apply => (None, None),
            WriteMode::Commit => {
                let (tx, rx) = sync_channel(1);
                (Some(tx), Some(rx))
            }
        };

        {
            // Enqueue under the write lock so the journal sees changes in memory order
            let mut store = self.store.write().unwrap_or_else(PoisonError::into_inner);
            for change in changes {
                store.apply(change);
            }

            if persist_tx.send(PersistRequest { entries, reply }).is_err() {
                error!("Persister of '{}' is gone, change kept in memory only", self.namespace);
                return false;
            }
        }

        match reply_rx {
            None => true,
            Some(rx) => rx.recv().unwrap_or_else(|_| {
                error!("Persister of '{}' dropped a commit", self.namespace);
                false
            }),
        }
    }
}

impl Drop for JournaledBackend {
    fn drop(&mut self) {
        // Closing the channel lets the persister drain, sync and exit
        self.persist_tx.take();
        if let Some(worker) = self.worker.take() {
            if worker.join().is_err() {
                error!("Persister of '{}' panicked", self.namespace);
            }
        }
        debug!("Preferences '{}' closed", self.namespace);
    }
}

/// The loop that owns the journal writer
async fn run_persister(
    namespace: String,
    writer: JournalWriter,
    sync_policy: SyncPolicy,
    mut persist_rx: mpsc::UnboundedReceiver<PersistRequest>,
) {
    debug!("Persister for '{}' starting", namespace);

    let mut tick = tokio::time::interval(Duration::from_secs(1));
    tick.set_missed_tick_behavior(MissedTickBehavior::Delay);
    let mut dirty = false;

    loop {
        tokio::select! {
            request = persist_rx.recv() => {
                let Some(request) = request else {
                    break;
                };

                match request.reply {
                    Some(reply) => {
                        let result = writer
                            .write_batch(&request.entries)
                            .and_then(|_| writer.sync());
                        let ok = match result {
                            Ok(()) => {
                                dirty = false;
                                true
                            }
                            Err(e) => {
                                error!("Commit to journal of '{}' failed: {}", namespace, e);
                                false
                            }
                        };
                        // The caller may have given up; nothing to do then
                        let _ = reply.send(ok);
                    }
                    None => {
                        if let Err(e) = writer.write_batch(&request.entries) {
                            warn!("Background write to journal of '{}' failed: {}", namespace, e);
                        } else if sync_policy == SyncPolicy::EverySecond {
                            dirty = true;
                        }
                    }
                }
            }

            _ = tick.tick(), if dirty => {
                match writer.sync() {
                    Ok(()) => dirty = false,
                    Err(e) => warn!("Periodic sync of journal of '{}' failed: {}", namespace, e),
                }
            }
        }
    }

    if let Err(e) = writer.sync() {
        error!("Final sync of journal of '{}' failed: {}", namespace, e);
    }
    info!("Persister for '{}' shutting down", namespace);
}
