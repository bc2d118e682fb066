//! A single pending modification to a namespace

use super::value::PrefValue;

/// One edit, applied in order with the others of its batch
#[derive(Debug, Clone, PartialEq)]
pub enum Change {
    /// Insert or overwrite a key with a value of any type
    Put(String, PrefValue),

    /// Delete a key (no-op if absent)
    Remove(String),

    /// Delete every key
    Clear,
}
