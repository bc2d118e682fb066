//! Typed preference façade
//!
//! `PreferenceStore` is a cheap, clonable handle over one namespace. Reads
//! come back typed, with a caller default for absent keys; writes come in
//! pairs, `put_x` which blocks until the change is on disk and returns
//! whether it got there, and `put_x_async` which returns immediately.

mod editor;
mod instance;
mod writes;

pub use editor::Editor;

use crate::backend::{JournaledBackend, MemoryBackend, PreferenceBackend};
use crate::config::{AppContext, PrefsConfig};
use crate::error::{PrefsError, Result};
use crate::store::PrefValue;
use std::collections::{HashMap, HashSet};
use std::fmt;
use std::sync::Arc;

/// Default of [`PreferenceStore::get_bool_or_default`]
pub const DEFAULT_BOOL: bool = false;
/// Default of [`PreferenceStore::get_float_or_default`]
pub const DEFAULT_FLOAT: f32 = 0.0;
/// Default of [`PreferenceStore::get_int_or_default`]
pub const DEFAULT_INT: i32 = -1;
/// Default of [`PreferenceStore::get_long_or_default`]
pub const DEFAULT_LONG: i64 = -1;
/// Default of [`PreferenceStore::get_double_or_default`]
pub const DEFAULT_DOUBLE: f64 = 0.0;
/// Default of [`PreferenceStore::get_string_or_default`]
pub const DEFAULT_STRING: &str = "";

/// Handle to one preference namespace
///
/// Commit-mode writes (`put_x`, `remove`, `remove_all`, [`Editor::commit`])
/// block the calling thread until the journal is synced. Inside an async
/// runtime that stalls the worker, so prefer the `_async` variants or
/// `spawn_blocking` there.
#[derive(Clone)]
pub struct PreferenceStore {
    backend: Arc<dyn PreferenceBackend>,
}

impl PreferenceStore {
    /// Open the `"<package_name>_preferences"` namespace of `ctx` with the default configuration
    pub fn open(ctx: &AppContext) -> Result<Self> {
        Self::open_with_config(ctx, &PrefsConfig::default())
    }

    /// Open the `"<package_name>_preferences"` namespace of `ctx`
    pub fn open_with_config(ctx: &AppContext, config: &PrefsConfig) -> Result<Self> {
        let backend = JournaledBackend::open_for(ctx, config)?;
        Ok(Self::with_backend(Arc::new(backend)))
    }

    /// Wrap any backend, e.g. one that encrypts values at rest
    pub fn with_backend(backend: Arc<dyn PreferenceBackend>) -> Self {
        PreferenceStore { backend }
    }

    /// A store that keeps nothing on disk
    pub fn in_memory(namespace: impl Into<String>) -> Self {
        Self::with_backend(Arc::new(MemoryBackend::new(namespace)))
    }

    pub fn namespace(&self) -> &str {
        self.backend.namespace()
    }

    /// Read `key` through `extract`: `Ok(None)` when absent, `TypeMismatch` when
    /// the stored value has another type
    fn read_typed<T>(
        &self,
        key: &str,
        expected: &'static str,
        extract: impl FnOnce(&PrefValue) -> Option<T>,
    ) -> Result<Option<T>> {
        match self.backend.get(key) {
            None => Ok(None),
            Some(value) => match extract(&value) {
                Some(v) => Ok(Some(v)),
                None => Err(PrefsError::TypeMismatch {
                    key: key.to_string(),
                    expected,
                    found: value.type_name(),
                }),
            },
        }
    }

    pub fn get_bool(&self, key: &str, default: bool) -> Result<bool> {
        Ok(self.read_typed(key, "bool", PrefValue::as_bool)?.unwrap_or(default))
    }

    pub fn get_float(&self, key: &str, default: f32) -> Result<f32> {
        Ok(self.read_typed(key, "float", PrefValue::as_float)?.unwrap_or(default))
    }

    pub fn get_int(&self, key: &str, default: i32) -> Result<i32> {
        Ok(self.read_typed(key, "int", PrefValue::as_int)?.unwrap_or(default))
    }

    pub fn get_long(&self, key: &str, default: i64) -> Result<i64> {
        Ok(self.read_typed(key, "long", PrefValue::as_long)?.unwrap_or(default))
    }

    /// Read a double stored by [`PreferenceStore::put_double`].
    ///
    /// An absent key returns `default` as is, without reading the long slot.
    pub fn get_double(&self, key: &str, default: f64) -> Result<f64> {
        if !self.contains(key) {
            return Ok(default);
        }

        let bits = self.get_long(key, 0)?;
        Ok(f64::from_bits(bits as u64))
    }

    pub fn get_string(&self, key: &str, default: &str) -> Result<String> {
        Ok(self
            .read_typed(key, "string", |v| v.as_str().map(str::to_string))?
            .unwrap_or_else(|| default.to_string()))
    }

    pub fn get_string_set(&self, key: &str, default: HashSet<String>) -> Result<HashSet<String>> {
        Ok(self
            .read_typed(key, "string set", |v| v.as_string_set().cloned())?
            .unwrap_or(default))
    }

    pub fn get_bool_or_default(&self, key: &str) -> Result<bool> {
        self.get_bool(key, DEFAULT_BOOL)
    }

    pub fn get_float_or_default(&self, key: &str) -> Result<f32> {
        self.get_float(key, DEFAULT_FLOAT)
    }

    pub fn get_int_or_default(&self, key: &str) -> Result<i32> {
        self.get_int(key, DEFAULT_INT)
    }

    pub fn get_long_or_default(&self, key: &str) -> Result<i64> {
        self.get_long(key, DEFAULT_LONG)
    }

    pub fn get_double_or_default(&self, key: &str) -> Result<f64> {
        self.get_double(key, DEFAULT_DOUBLE)
    }

    pub fn get_string_or_default(&self, key: &str) -> Result<String> {
        self.get_string(key, DEFAULT_STRING)
    }

    /// The string set at `key`, or `None` when absent (there is no default set)
    pub fn get_string_set_or_default(&self, key: &str) -> Result<Option<HashSet<String>>> {
        self.read_typed(key, "string set", |v| v.as_string_set().cloned())
    }

    /// Every entry. Doubles show up as `PrefValue::Long` holding their bits.
    pub fn get_all(&self) -> HashMap<String, PrefValue> {
        self.backend.snapshot()
    }

    /// Whether `key` holds a value of any type
    pub fn contains(&self, key: &str) -> bool {
        self.backend.contains(key)
    }
}

impl fmt::Debug for PreferenceStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PreferenceStore")
            .field("namespace", &self.namespace())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::WriteMode;
    use crate::store::Change;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Counts slot reads so tests can see which path a getter took
    struct CountingBackend {
        inner: MemoryBackend,
        gets: AtomicUsize,
    }

    impl PreferenceBackend for CountingBackend {
        fn namespace(&self) -> &str {
            self.inner.namespace()
        }

        fn get(&self, key: &str) -> Option<PrefValue> {
            self.gets.fetch_add(1, Ordering::SeqCst);
            self.inner.get(key)
        }

        fn contains(&self, key: &str) -> bool {
            self.inner.contains(key)
        }

        fn snapshot(&self) -> HashMap<String, PrefValue> {
            self.inner.snapshot()
        }

        fn submit(&self, changes: Vec<Change>, mode: WriteMode) -> bool {
            self.inner.submit(changes, mode)
        }
    }

    fn set(items: &[&str]) -> HashSet<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_missing_keys_return_defaults() {
        let prefs = PreferenceStore::in_memory("test_preferences");

        assert!(prefs.get_bool("missing", true).unwrap());
        assert_eq!(prefs.get_float("missing", 1.5).unwrap(), 1.5);
        assert_eq!(prefs.get_int("missing", -1).unwrap(), -1);
        assert_eq!(prefs.get_long("missing", 7).unwrap(), 7);
        assert_eq!(prefs.get_double("missing", 2.5).unwrap(), 2.5);
        assert_eq!(prefs.get_string("missing", "none").unwrap(), "none");
        assert_eq!(prefs.get_string_set("missing", set(&["d"])).unwrap(), set(&["d"]));
    }

    #[test]
    fn test_or_default_constants() {
        let prefs = PreferenceStore::in_memory("test_preferences");

        assert_eq!(prefs.get_bool_or_default("k").unwrap(), false);
        assert_eq!(prefs.get_float_or_default("k").unwrap(), 0.0);
        assert_eq!(prefs.get_int_or_default("k").unwrap(), -1);
        assert_eq!(prefs.get_long_or_default("k").unwrap(), -1);
        assert_eq!(prefs.get_double_or_default("k").unwrap(), 0.0);
        assert_eq!(prefs.get_string_or_default("k").unwrap(), "");
        assert_eq!(prefs.get_string_set_or_default("k").unwrap(), None);
    }

    #[test]
    fn test_wrong_accessor_is_type_mismatch() {
        let prefs = PreferenceStore::in_memory("test_preferences");
        assert!(prefs.put_string("name", "ada"));

        let err = prefs.get_int("name", 0).unwrap_err();
        match err {
            PrefsError::TypeMismatch { key, expected, found } => {
                assert_eq!(key, "name");
                assert_eq!(expected, "int");
                assert_eq!(found, "string");
            }
            other => panic!("unexpected error {}", other),
        }
        assert!(prefs.get_double("name", 0.0).unwrap_err().is_type_mismatch());
    }

    #[test]
    fn test_get_double_absent_skips_slot_read() {
        let backend = Arc::new(CountingBackend {
            inner: MemoryBackend::new("count_preferences"),
            gets: AtomicUsize::new(0),
        });
        let prefs = PreferenceStore::with_backend(backend.clone());

        let default = f64::from_bits(0x7ff8_0000_0000_0001);
        assert_eq!(prefs.get_double("absent", default).unwrap().to_bits(), default.to_bits());
        assert_eq!(backend.gets.load(Ordering::SeqCst), 0);

        prefs.put_double("present", 1.25);
        assert_eq!(prefs.get_double("present", 0.0).unwrap(), 1.25);
        assert_eq!(backend.gets.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_debug_shows_namespace() {
        let prefs = PreferenceStore::in_memory("dbg_preferences");
        assert_eq!(
            format!("{:?}", prefs),
            "PreferenceStore { namespace: \"dbg_preferences\" }"
        );
    }
}
