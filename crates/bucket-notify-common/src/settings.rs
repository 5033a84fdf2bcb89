//! Persisted names of provisioned resources
//!
//! `setup` writes the settings file once; every other command loads it at
//! start and receives it by reference.

use crate::defaults::OUTPUT_BUCKET_ENV;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use thiserror::Error;

/// Settings file errors
#[derive(Debug, Error)]
pub enum SettingsError {
    /// The settings file does not exist yet
    #[error("settings file '{0}' not found, run `bucket-notify setup` first")]
    Missing(String),

    /// Failed to read or write the settings file
    #[error("Failed to access settings file '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// Failed to parse or serialize settings
    #[error("Failed to parse settings: {0}")]
    Parse(#[from] serde_json::Error),
}

impl SettingsError {
    /// Create an IO error with path context
    pub fn io(path: &Path, source: std::io::Error) -> Self {
        Self::Io {
            path: path.display().to_string(),
            source,
        }
    }
}

/// Final resource names plus the environment deployed with the function
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settings {
    /// Name of the function
    pub function_name: String,

    /// Bucket that triggers the function when it receives a new object
    pub input_bucket_name: String,

    /// Bucket the function writes its output to
    pub output_bucket_name: String,

    /// Environment variables deployed with the function
    #[serde(default)]
    pub function_environment: BTreeMap<String, String>,
}

impl Settings {
    /// Build settings for freshly resolved names.
    ///
    /// The function only needs the output bucket; it learns the input bucket
    /// from each notification.
    pub fn new(
        function_name: impl Into<String>,
        input_bucket_name: impl Into<String>,
        output_bucket_name: impl Into<String>,
    ) -> Self {
        let output_bucket_name = output_bucket_name.into();
        let function_environment =
            BTreeMap::from([(OUTPUT_BUCKET_ENV.to_string(), output_bucket_name.clone())]);
        Self {
            function_name: function_name.into(),
            input_bucket_name: input_bucket_name.into(),
            output_bucket_name,
            function_environment,
        }
    }

    /// Load settings from a JSON file
    pub fn load(path: &Path) -> Result<Self, SettingsError> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                SettingsError::Missing(path.display().to_string())
            } else {
                SettingsError::io(path, e)
            }
        })?;
        Ok(serde_json::from_str(&content)?)
    }

    /// Write settings to a JSON file, replacing any previous content
    pub fn save(&self, path: &Path) -> Result<(), SettingsError> {
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content + "\n").map_err(|e| SettingsError::io(path, e))
    }

    /// Destination bucket as the deployed function will see it
    pub fn function_output_bucket(&self) -> &str {
        self.function_environment
            .get(OUTPUT_BUCKET_ENV)
            .map(String::as_str)
            .unwrap_or(&self.output_bucket_name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_sets_output_bucket_env() {
        let settings = Settings::new("fn", "in", "out");
        assert_eq!(
            settings.function_environment.get(OUTPUT_BUCKET_ENV).map(String::as_str),
            Some("out")
        );
        assert_eq!(settings.function_output_bucket(), "out");
    }

    #[test]
    fn save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");

        let settings = Settings::new("demo-notification", "demo-in-kotebisa", "demo-out-kotebisa");
        settings.save(&path).unwrap();

        let loaded = Settings::load(&path).unwrap();
        assert_eq!(loaded, settings);
    }

    #[test]
    fn load_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = Settings::load(&dir.path().join("nope.json")).unwrap_err();
        assert!(matches!(err, SettingsError::Missing(_)));
        assert!(err.to_string().contains("bucket-notify setup"));
    }

    #[test]
    fn load_invalid_json() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        std::io::Write::write_all(&mut file, b"{ not json").unwrap();
        let err = Settings::load(file.path()).unwrap_err();
        assert!(matches!(err, SettingsError::Parse(_)));
    }

    #[test]
    fn environment_is_optional_in_file() {
        let json = r#"{
            "function_name": "f",
            "input_bucket_name": "i",
            "output_bucket_name": "o"
        }"#;
        let settings: Settings = serde_json::from_str(json).unwrap();
        assert!(settings.function_environment.is_empty());
        assert_eq!(settings.function_output_bucket(), "o");
    }
}
