//! The process-wide preference store

use super::PreferenceStore;
use crate::config::AppContext;
use crate::error::Result;
use once_cell::sync::OnceCell;
use tracing::info;

static INSTANCE: OnceCell<PreferenceStore> = OnceCell::new();

impl PreferenceStore {
    /// The process-wide store, opened on first use from `ctx`.
    ///
    /// Concurrent first callers all get the same store. Later calls return it
    /// whatever `ctx` they pass. If opening fails the error is returned and the
    /// next call tries again. The store is never closed, so `_async` writes
    /// still queued at process exit can be lost; commit the last write that matters.
    pub fn instance(ctx: &AppContext) -> Result<&'static PreferenceStore> {
        get_or_open(&INSTANCE, ctx)
    }

    /// The process-wide store if it has been opened already
    pub fn try_instance() -> Option<&'static PreferenceStore> {
        INSTANCE.get()
    }
}

fn get_or_open<'a>(cell: &'a OnceCell<PreferenceStore>, ctx: &AppContext) -> Result<&'a PreferenceStore> {
    cell.get_or_try_init(|| {
        info!("Opening shared preferences of {}", ctx.package_name());
        PreferenceStore::open(ctx)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::PrefsError;
    use std::sync::Arc;

    #[test]
    fn test_failed_open_is_not_cached() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("blocker");
        std::fs::write(&blocker, b"file").unwrap();

        let cell = OnceCell::new();
        let bad = AppContext::new("app", &blocker);
        assert!(matches!(get_or_open(&cell, &bad), Err(PrefsError::Init { .. })));
        assert!(cell.get().is_none());

        let good = AppContext::new("app", dir.path().join("data"));
        let store = get_or_open(&cell, &good).unwrap();
        assert_eq!(store.namespace(), "app_preferences");
    }

    #[test]
    fn test_concurrent_first_access_yields_one_store() {
        let dir = tempfile::tempdir().unwrap();
        let cell = Arc::new(OnceCell::new());
        let ctx = AppContext::new("race", dir.path());

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let cell = Arc::clone(&cell);
                let ctx = ctx.clone();
                std::thread::spawn(move || {
                    let store = get_or_open(&cell, &ctx).unwrap();
                    store as *const PreferenceStore as usize
                })
            })
            .collect();

        let addresses: Vec<usize> = handles.into_iter().map(|h| h.join().unwrap()).collect();
        assert!(addresses.windows(2).all(|w| w[0] == w[1]));
    }

    #[test]
    fn test_global_instance_ignores_later_context() {
        let dir = tempfile::tempdir().unwrap();
        let first = PreferenceStore::instance(&AppContext::new("first.app", dir.path())).unwrap();
        let second = PreferenceStore::instance(&AppContext::new("second.app", dir.path())).unwrap();

        assert!(std::ptr::eq(first, second));
        assert_eq!(second.namespace(), "first.app_preferences");
        assert!(PreferenceStore::try_instance().is_some());

        assert!(first.put_int("retries", 3));
        assert_eq!(second.get_int("retries", -1).unwrap(), 3);
    }
}
