//! Batched edits

use super::PreferenceStore;
use crate::backend::WriteMode;
use crate::store::{Change, PrefValue};

/// A batch of changes to one namespace, applied in call order
///
/// ```no_run
/// # use preffy::{AppContext, PreferenceStore};
/// # fn run(prefs: &PreferenceStore) {
/// let saved = prefs
///     .edit()
///     .put_int("retries", 3)
///     .put_string("server", "eu-1")
///     .remove("legacy_flag")
///     .commit();
/// # }
/// ```
#[must_use = "an editor does nothing until apply() or commit() is called"]
pub struct Editor<'a> {
    store: &'a PreferenceStore,
    changes: Vec<Change>,
}

impl<'a> Editor<'a> {
    pub(super) fn new(store: &'a PreferenceStore) -> Self {
        Editor {
            store,
            changes: Vec::new(),
        }
    }

    /// Set `key` to a value of any type
    pub fn put(mut self, key: impl Into<String>, value: impl Into<PrefValue>) -> Self {
        self.changes.push(Change::Put(key.into(), value.into()));
        self
    }

    pub fn put_bool(self, key: impl Into<String>, value: bool) -> Self {
        self.put(key, PrefValue::Bool(value))
    }

    pub fn put_float(self, key: impl Into<String>, value: f32) -> Self {
        self.put(key, PrefValue::Float(value))
    }

    pub fn put_int(self, key: impl Into<String>, value: i32) -> Self {
        self.put(key, PrefValue::Int(value))
    }

    pub fn put_long(self, key: impl Into<String>, value: i64) -> Self {
        self.put(key, PrefValue::Long(value))
    }

    /// Stored in the long slot as its raw IEEE-754 bits
    pub fn put_double(self, key: impl Into<String>, value: f64) -> Self {
        self.put(key, PrefValue::from_double(value))
    }

    pub fn put_string(self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.put(key, PrefValue::String(value.into()))
    }

    pub fn put_string_set<I, S>(self, key: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.put(key, PrefValue::string_set(values))
    }

    pub fn remove(mut self, key: impl Into<String>) -> Self {
        self.changes.push(Change::Remove(key.into()));
        self
    }

    /// Delete every key. Puts recorded after this survive it.
    pub fn clear(mut self) -> Self {
        self.changes.push(Change::Clear);
        self
    }

    /// Changes recorded so far
    pub fn changes(&self) -> &[Change] {
        &self.changes
    }

    /// Apply in memory and persist in the background
    pub fn apply(self) {
        self.store.submit(self.changes, WriteMode::Apply);
    }

    /// Apply and block until persisted; returns whether the write reached the disk
    pub fn commit(self) -> bool {
        self.store.submit(self.changes, WriteMode::Commit)
    }
}
