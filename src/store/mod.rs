//! In-memory storage module
//!
//! Provides the typed value model and the map holding one namespace.
//! This module knows nothing about the journal or the façade.

mod change;
mod memory;
mod value;

pub use change::Change;
pub use memory::{MemoryStore, StoreStats};
pub use value::PrefValue;
