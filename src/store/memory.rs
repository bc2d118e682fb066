//! In-memory preference map

use super::change::Change;
use super::value::PrefValue;
use siphasher::sip::SipHasher13;
use std::collections::HashMap;
use std::hash::BuildHasherDefault;

/// Type alias for our hash map with SipHasher
type StoreMap = HashMap<String, PrefValue, BuildHasherDefault<SipHasher13>>;

/// In-memory key-value map for one namespace
///
/// This is the source of truth for reads. The journal only exists to
/// rebuild it on the next open.
#[derive(Debug, Clone)]
pub struct MemoryStore {
    store: StoreMap,
}

impl MemoryStore {
    /// Create a new memory store with default capacity
    pub fn new() -> Self {
        Self::with_capacity(64)
    }

    /// Create a new memory store with specified initial capacity
    pub fn with_capacity(capacity: usize) -> Self {
        MemoryStore {
            store: HashMap::with_capacity_and_hasher(
                capacity,
                BuildHasherDefault::<SipHasher13>::default(),
            ),
        }
    }

    /// Set a key-value pair, replacing any value and type already there.
    /// Returns true if the key is new.
    pub fn set(&mut self, key: impl Into<String>, value: PrefValue) -> bool {
        self.store.insert(key.into(), value).is_none()
    }

    /// Get a value by key
    pub fn get(&self, key: &str) -> Option<&PrefValue> {
        self.store.get(key)
    }

    /// Delete a key, returns true if the key existed
    pub fn delete(&mut self, key: &str) -> bool {
        self.store.remove(key).is_some()
    }

    /// Check if a key exists
    pub fn exists(&self, key: &str) -> bool {
        self.store.contains_key(key)
    }

    /// Remove all keys
    pub fn clear(&mut self) {
        self.store.clear();
    }

    /// Apply one change
    pub fn apply(&mut self, change: Change) {
        match change {
            Change::Put(key, value) => {
                self.set(key, value);
            }
            Change::Remove(key) => {
                self.delete(&key);
            }
            Change::Clear => self.clear(),
        }
    }

    /// Get the number of keys
    pub fn len(&self) -> usize {
        self.store.len()
    }

    /// Check if the store is empty
    pub fn is_empty(&self) -> bool {
        self.store.is_empty()
    }

    /// Get all keys
    pub fn keys(&self) -> Vec<String> {
        self.store.keys().cloned().collect()
    }

    /// Iterate over all entries
    pub fn iter(&self) -> impl Iterator<Item = (&String, &PrefValue)> {
        self.store.iter()
    }

    /// Copy every entry into a plain map
    pub fn snapshot(&self) -> HashMap<String, PrefValue> {
        self.store
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect()
    }

    /// Calculate approximate memory usage of stored data in bytes
    pub fn memory_usage(&self) -> usize {
        self.store
            .iter()
            .map(|(k, v)| k.len() + v.memory_usage())
            .sum()
    }

    /// Get statistics about the store
    pub fn stats(&self) -> StoreStats {
        StoreStats {
            keys: self.store.len(),
            used_memory_bytes: self.memory_usage(),
        }
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

/// Statistics about the memory store
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StoreStats {
    pub keys: usize,
    pub used_memory_bytes: usize,
}
