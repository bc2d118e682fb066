//! Preffy - typed, persistent application preferences
//!
//! Preffy keeps one key-value namespace per application, named
//! `"<package_name>_preferences"`, and layers a typed façade on top:
//! - `store`: the value model and the in-memory map
//! - `journal`: the append-only file that makes changes durable
//! - `backend`: the seam between the façade and storage
//! - `preferences`: the typed getters, the put pairs and the process-wide instance

pub mod backend;
pub mod config;
pub mod error;
pub mod journal;
pub mod preferences;
pub mod store;

/// Re-export commonly used types
pub use backend::{JournaledBackend, MemoryBackend, PreferenceBackend, WriteMode};
pub use config::{AppContext, PrefsConfig};
pub use error::{PrefsError, Result};
pub use journal::SyncPolicy;
pub use preferences::{Editor, PreferenceStore};
pub use store::{Change, PrefValue};
