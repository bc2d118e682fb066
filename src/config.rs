//! Application context and store configuration

use crate::error::{PrefsError, Result};
use crate::journal::SyncPolicy;
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Suffix appended to the package name to form the namespace
pub const NAMESPACE_SUFFIX: &str = "_preferences";

/// The application a preference store belongs to
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppContext {
    package_name: String,
    data_dir: PathBuf,
}

impl AppContext {
    /// Create a context for `package_name` storing its files under `data_dir`
    pub fn new(package_name: impl Into<String>, data_dir: impl Into<PathBuf>) -> Self {
        AppContext {
            package_name: package_name.into(),
            data_dir: data_dir.into(),
        }
    }

    pub fn package_name(&self) -> &str {
        &self.package_name
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    /// Namespace of the default preferences: `"<package_name>_preferences"`
    pub fn preferences_namespace(&self) -> String {
        format!("{}{}", self.package_name, NAMESPACE_SUFFIX)
    }
}

/// Journal tuning for a preference store
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct PrefsConfig {
    /// Sync policy for apply-mode writes
    pub sync_policy: SyncPolicy,

    /// Journals shorter than this are never compacted
    pub compact_min_entries: usize,

    /// Compact when records exceed this many times the live key count
    pub compact_ratio: f64,
}

impl Default for PrefsConfig {
    fn default() -> Self {
        PrefsConfig {
            sync_policy: SyncPolicy::default(),
            compact_min_entries: 1024,
            compact_ratio: 4.0,
        }
    }
}

impl PrefsConfig {
    /// Parse a configuration from JSON; missing fields keep their defaults
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: PrefsConfig =
            serde_json::from_str(json).map_err(|e| PrefsError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Read a configuration from a JSON file
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)
            .map_err(|e| PrefsError::Config(format!("{}: {}", path.display(), e)))?;
        Self::from_json_str(&json)
    }

    pub(crate) fn validate(&self) -> Result<()> {
        if self.compact_ratio.is_nan() || self.compact_ratio < 1.0 {
            return Err(PrefsError::Config(format!(
                "compact_ratio must be at least 1.0, got {}",
                self.compact_ratio
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_namespace_name() {
        let ctx = AppContext::new("in.example.app", "/tmp/app");
        assert_eq!(ctx.preferences_namespace(), "in.example.app_preferences");
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let config = PrefsConfig::from_json_str(r#"{ "sync_policy": "always" }"#).unwrap();
        assert_eq!(config.sync_policy, SyncPolicy::Always);
        assert_eq!(config.compact_min_entries, 1024);
        assert_eq!(config.compact_ratio, 4.0);
    }

    #[test]
    fn test_invalid_ratio_rejected() {
        let err = PrefsConfig::from_json_str(r#"{ "compact_ratio": 0.5 }"#).unwrap_err();
        assert!(matches!(err, PrefsError::Config(_)));
    }

    #[test]
    fn test_unknown_policy_rejected() {
        assert!(PrefsConfig::from_json_str(r#"{ "sync_policy": "sometimes" }"#).is_err());
    }

    #[test]
    fn test_from_json_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("prefs.json");
        std::fs::write(&path, r#"{ "compact_min_entries": 8 }"#).unwrap();

        let config = PrefsConfig::from_json_file(&path).unwrap();
        assert_eq!(config.compact_min_entries, 8);
        assert!(PrefsConfig::from_json_file(dir.path().join("missing.json")).is_err());
    }
}
