//! Engine configuration.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Axis engine configuration.
///
/// Every field has a default, so an empty JSON object is a valid config.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AxisEngineConfig {
    /// Log dropped references at `warn` instead of `debug`.
    pub warn_on_unresolved: bool,
    /// Drop empty unit labels instead of emitting them.
    pub drop_empty_units: bool,
}

impl AxisEngineConfig {
    /// Parses a config from JSON.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        serde_json::from_str(json).map_err(|e| ConfigError::Parse {
            message: e.to_string(),
        })
    }

    /// Reads and parses a JSON config file.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
        Self::from_json_str(&json)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_object_is_default() {
        let config = AxisEngineConfig::from_json_str("{}").unwrap();
        assert_eq!(config, AxisEngineConfig::default());
        assert!(!config.warn_on_unresolved);
        assert!(!config.drop_empty_units);
    }

    #[test]
    fn partial_override() {
        let config = AxisEngineConfig::from_json_str(r#"{"warn_on_unresolved": true}"#).unwrap();
        assert!(config.warn_on_unresolved);
        assert!(!config.drop_empty_units);
    }

    #[test]
    fn unknown_keys_are_rejected() {
        let err = AxisEngineConfig::from_json_str(r#"{"skip_everything": true}"#).unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
    }

    #[test]
    fn missing_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = AxisEngineConfig::from_path(dir.path().join("absent.json")).unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }

    #[test]
    fn reads_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("axes.json");
        std::fs::write(&path, r#"{"drop_empty_units": true}"#).unwrap();
        let config = AxisEngineConfig::from_path(&path).unwrap();
        assert!(config.drop_empty_units);
    }
}
