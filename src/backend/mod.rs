//! Storage backends behind the preference façade
//!
//! A backend owns one namespace: it answers typed reads from memory and
//! decides how changes reach durable storage. The façade only talks to
//! the [`PreferenceBackend`] trait, so an encrypting or platform-native
//! backend can replace the journal without touching callers.

mod journaled;
mod memory;

pub use journaled::JournaledBackend;
pub use memory::MemoryBackend;

use crate::store::{Change, PrefValue};
use std::collections::HashMap;

/// How a write reaches durable storage
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteMode {
    /// Update memory now, persist in the background; the caller never learns the outcome
    Apply,
    /// Update memory, then block until the change is on disk (or failed)
    Commit,
}

/// Contract every preference backend fulfils
pub trait PreferenceBackend: Send + Sync {
    /// Name of the namespace this backend holds
    fn namespace(&self) -> &str;

    /// Current value of `key`, if any
    fn get(&self, key: &str) -> Option<PrefValue>;

    /// Whether `key` holds a value of any type
    fn contains(&self, key: &str) -> bool;

    /// Copy of every entry
    fn snapshot(&self) -> HashMap<String, PrefValue>;

    /// Apply `changes` in order.
    ///
    /// Returns whether the changes were persisted (`Commit`) or queued (`Apply`).
    /// Memory reflects the changes either way.
    fn submit(&self, changes: Vec<Change>, mode: WriteMode) -> bool;
}
