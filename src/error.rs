//! Error types for preference operations

use std::fmt;
use std::io;

/// Errors surfaced by the preference store
#[derive(Debug)]
pub enum PrefsError {
    /// The namespace could not be opened or its persister could not start
    Init {
        namespace: String,
        reason: String,
    },

    /// I/O failure outside of initialisation
    Io(io::Error),

    /// A typed read hit a value of another type
    TypeMismatch {
        key: String,
        expected: &'static str,
        found: &'static str,
    },

    /// Configuration could not be read or parsed
    Config(String),
}

impl PrefsError {
    /// Build an initialisation error for a namespace
    pub fn init(namespace: impl Into<String>, reason: impl fmt::Display) -> Self {
        PrefsError::Init {
            namespace: namespace.into(),
            reason: reason.to_string(),
        }
    }

    /// Check if this is a type mismatch
    pub fn is_type_mismatch(&self) -> bool {
        matches!(self, PrefsError::TypeMismatch { .. })
    }
}

impl fmt::Display for PrefsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PrefsError::Init { namespace, reason } => {
                write!(f, "Failed to open preferences '{}': {}", namespace, reason)
            }
            PrefsError::Io(e) => write!(f, "IO error: {}", e),
            PrefsError::TypeMismatch { key, expected, found } => write!(
                f,
                "Preference '{}' holds a {} value, expected {}",
                key, found, expected
            ),
            PrefsError::Config(msg) => write!(f, "Invalid configuration: {}", msg),
        }
    }
}

impl std::error::Error for PrefsError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            PrefsError::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<io::Error> for PrefsError {
    fn from(e: io::Error) -> Self {
        PrefsError::Io(e)
    }
}

/// Result alias for preference operations
pub type Result<T> = std::result::Result<T, PrefsError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_type_mismatch() {
        let err = PrefsError::TypeMismatch {
            key: "retries".to_string(),
            expected: "int",
            found: "string",
        };
        assert!(err.is_type_mismatch());
        assert_eq!(
            err.to_string(),
            "Preference 'retries' holds a string value, expected int"
        );
    }

    #[test]
    fn test_init_error_message() {
        let err = PrefsError::init("app_preferences", "disk full");
        assert_eq!(
            err.to_string(),
            "Failed to open preferences 'app_preferences': disk full"
        );
    }
}
