//! Handler configuration from the environment

use crate::error::HandlerError;
use bucket_notify_common::defaults::OUTPUT_BUCKET_ENV;

/// Configuration the deployed function reads at cold start.
///
/// The values are fixed when the function is deployed; see the
/// `function_environment` in the settings file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HandlerConfig {
    /// Bucket the transformed objects are written to
    pub output_bucket: String,
}

impl HandlerConfig {
    pub fn new(output_bucket: impl Into<String>) -> Self {
        Self {
            output_bucket: output_bucket.into(),
        }
    }

    /// Read configuration from process environment variables
    pub fn from_env() -> Result<Self, HandlerError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Read configuration through an arbitrary variable lookup
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, HandlerError> {
        let output_bucket = lookup(OUTPUT_BUCKET_ENV)
            .filter(|v| !v.trim().is_empty())
            .ok_or(HandlerError::MissingEnv(OUTPUT_BUCKET_ENV))?;
        Ok(Self { output_bucket })
    }
}
