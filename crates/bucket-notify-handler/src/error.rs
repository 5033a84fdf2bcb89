//! Handler errors

use bucket_notify_common::ApiError;
use thiserror::Error;

/// Errors that abort a handler invocation
#[derive(Debug, Error)]
pub enum HandlerError {
    /// Required environment variable is not set
    #[error("environment variable {0} must be set")]
    MissingEnv(&'static str),

    /// Record lacks a field the handler needs
    #[error("event record {index} has no {field}")]
    MalformedRecord { index: usize, field: &'static str },

    /// Object key is not valid percent-encoded UTF-8
    #[error("object key '{key}' cannot be decoded: {source}")]
    KeyDecode {
        key: String,
        #[source]
        source: std::string::FromUtf8Error,
    },

    /// Remote call failed
    #[error(transparent)]
    Api(#[from] ApiError),
}
