//! Volatile backend: a namespace that lives only as long as the process

use super::{PreferenceBackend, WriteMode};
use crate::store::{Change, MemoryStore, PrefValue};
use std::collections::HashMap;
use std::sync::{PoisonError, RwLock};

/// In-memory backend with no persistence. Every commit succeeds.
#[derive(Debug)]
pub struct MemoryBackend {
    namespace: String,
    store: RwLock<MemoryStore>,
}

impl MemoryBackend {
    pub fn new(namespace: impl Into<String>) -> Self {
        MemoryBackend {
            namespace: namespace.into(),
            store: RwLock::new(MemoryStore::new()),
        }
    }
}

impl PreferenceBackend for MemoryBackend {
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

    fn submit(&self, changes: Vec<Change>, _mode: WriteMode) -> bool {
        let mut store = self.store.write().unwrap_or_else(PoisonError::into_inner);
        for change in changes {
            store.apply(change);
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_submit_and_read() {
        let backend = MemoryBackend::new("test_preferences");
        assert!(backend.submit(
            vec![
                Change::Put("a".into(), PrefValue::Int(1)),
                Change::Put("b".into(), PrefValue::Bool(true)),
                Change::Remove("a".into()),
            ],
            WriteMode::Commit,
        ));

        assert_eq!(backend.namespace(), "test_preferences");
        assert!(!backend.contains("a"));
        assert_eq!(backend.get("b"), Some(PrefValue::Bool(true)));
        assert_eq!(backend.snapshot().len(), 1);
    }
}
