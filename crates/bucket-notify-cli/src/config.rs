//! Configuration types for the CLI

use anyhow::{Context, Result};
use bucket_notify_common::Settings;
use std::path::PathBuf;

/// Options shared by every command
#[derive(Debug, Clone)]
pub struct GlobalConfig {
    /// AWS region
    pub region: String,
    /// Path of the settings file written by `setup`
    pub settings_path: PathBuf,
}

impl GlobalConfig {
    /// Load the settings written by `setup`
    pub fn load_settings(&self) -> Result<Settings> {
        Settings::load(&self.settings_path).context("Failed to load settings")
    }

    /// Persist freshly provisioned settings
    pub fn save_settings(&self, settings: &Settings) -> Result<()> {
        settings
            .save(&self.settings_path)
            .context("Failed to save settings")
    }
}

/// Options for `deploy`
#[derive(Debug, Clone)]
pub struct DeployConfig {
    /// Zipped handler package
    pub package: PathBuf,
    /// Execution role assumed by the function
    pub role_arn: String,
}
