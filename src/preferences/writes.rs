//! Write operations of the `PreferenceStore`
//!
//! `put_x` commits: it blocks until the change is durable and returns
//! whether it got there. `put_x_async` applies: memory changes now, the
//! disk catches up in the background, the outcome is not reported.

use super::{Editor, PreferenceStore};
use crate::backend::WriteMode;
use crate::store::{Change, PrefValue};

impl PreferenceStore {
    /// Start a batch of changes
    pub fn edit(&self) -> Editor<'_> {
        Editor::new(self)
    }

    /// Apply `changes` in order with the given durability
    pub fn submit(&self, changes: Vec<Change>, mode: WriteMode) -> bool {
        self.backend.submit(changes, mode)
    }

    /// Set one key to a value of any type with the given durability
    pub fn write(&self, key: impl Into<String>, value: impl Into<PrefValue>, mode: WriteMode) -> bool {
        self.submit(vec![Change::Put(key.into(), value.into())], mode)
    }

    pub fn put_bool(&self, key: impl Into<String>, value: bool) -> bool {
        self.edit().put_bool(key, value).commit()
    }

    pub fn put_bool_async(&self, key: impl Into<String>, value: bool) {
        self.edit().put_bool(key, value).apply()
    }

    pub fn put_float(&self, key: impl Into<String>, value: f32) -> bool {
        self.edit().put_float(key, value).commit()
    }

    pub fn put_float_async(&self, key: impl Into<String>, value: f32) {
        self.edit().put_float(key, value).apply()
    }

    pub fn put_int(&self, key: impl Into<String>, value: i32) -> bool {
        self.edit().put_int(key, value).commit()
    }

    pub fn put_int_async(&self, key: impl Into<String>, value: i32) {
        self.edit().put_int(key, value).apply()
    }

    pub fn put_long(&self, key: impl Into<String>, value: i64) -> bool {
        self.edit().put_long(key, value).commit()
    }

    pub fn put_long_async(&self, key: impl Into<String>, value: i64) {
        self.edit().put_long(key, value).apply()
    }

    /// Store a double through the long slot as its raw bits
    pub fn put_double(&self, key: impl Into<String>, value: f64) -> bool {
        self.edit().put_double(key, value).commit()
    }

    pub fn put_double_async(&self, key: impl Into<String>, value: f64) {
        self.edit().put_double(key, value).apply()
    }

    pub fn put_string(&self, key: impl Into<String>, value: impl Into<String>) -> bool {
        self.edit().put_string(key, value).commit()
    }

    pub fn put_string_async(&self, key: impl Into<String>, value: impl Into<String>) {
        self.edit().put_string(key, value).apply()
    }

    pub fn put_string_set<I, S>(&self, key: impl Into<String>, values: I) -> bool
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.edit().put_string_set(key, values).commit()
    }

    pub fn put_string_set_async<I, S>(&self, key: impl Into<String>, values: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.edit().put_string_set(key, values).apply()
    }

    /// Delete `key`; absent keys are not an error
    pub fn remove(&self, key: impl Into<String>) -> bool {
        self.edit().remove(key).commit()
    }

    pub fn remove_async(&self, key: impl Into<String>) {
        self.edit().remove(key).apply()
    }

    /// Delete every key in the namespace
    pub fn remove_all(&self) -> bool {
        self.edit().clear().commit()
    }

    pub fn remove_all_async(&self) {
        self.edit().clear().apply()
    }
}
