//! Remote API error classification
//!
//! Every collaborator call returns an [`ApiError`]. Callers recover from
//! specific variants with exhaustive matches instead of inspecting messages.

use crate::resource_kind::ResourceKind;
use thiserror::Error;

/// Error categories for remote bucket, object, and function calls
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ApiError {
    /// Resource does not exist (the desired end state for teardown)
    #[error("{kind} '{name}' not found")]
    NotFound { kind: ResourceKind, name: String },

    /// Resource name is already taken
    #[error("{kind} '{name}' already exists")]
    Conflict { kind: ResourceKind, name: String },

    /// Anything else, propagated unchanged
    #[error("remote error{}: {message}", code_suffix(.code))]
    Other {
        code: Option<String>,
        message: String,
    },
}

impl ApiError {
    /// Create a not-found error
    pub fn not_found(kind: ResourceKind, name: impl Into<String>) -> Self {
        ApiError::NotFound {
            kind,
            name: name.into(),
        }
    }

    /// Create a conflict error
    pub fn conflict(kind: ResourceKind, name: impl Into<String>) -> Self {
        ApiError::Conflict {
            kind,
            name: name.into(),
        }
    }

    /// Create an unclassified error
    pub fn other(message: impl Into<String>) -> Self {
        ApiError::Other {
            code: None,
            message: message.into(),
        }
    }

    /// Check if this is a "not found" error
    pub fn is_not_found(&self) -> bool {
        matches!(self, ApiError::NotFound { .. })
    }

    /// Check if this is a "conflict" error
    pub fn is_conflict(&self) -> bool {
        matches!(self, ApiError::Conflict { .. })
    }
}

fn code_suffix(code: &Option<String>) -> String {
    code.as_deref().map(|c| format!(" ({c})")).unwrap_or_default()
}

/// Known error codes for "not found" conditions.
///
/// `NotFound` is what `HeadBucket` reports, since HEAD responses carry no body.
const NOT_FOUND_CODES: &[&str] = &[
    "NoSuchBucket",
    "NoSuchKey",
    "NotFound",
    "ResourceNotFoundException",
];

/// Known error codes for "already exists" conditions
const CONFLICT_CODES: &[&str] = &[
    "BucketAlreadyExists",
    "BucketAlreadyOwnedByYou",
    "ResourceConflictException",
];

/// Classify a remote error using its service error code.
///
/// `kind` and `name` identify the resource the call addressed and are
/// carried into the `NotFound` and `Conflict` variants.
pub fn classify_aws_error(
    code: Option<&str>,
    message: Option<&str>,
    kind: ResourceKind,
    name: &str,
) -> ApiError {
    match code {
        Some(c) if NOT_FOUND_CODES.contains(&c) => ApiError::not_found(kind, name),
        Some(c) if CONFLICT_CODES.contains(&c) => ApiError::conflict(kind, name),
        _ => ApiError::Other {
            code: code.map(str::to_string),
            message: message.unwrap_or("Unknown error").to_string(),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_found_codes() {
        for code in NOT_FOUND_CODES {
            let err = classify_aws_error(Some(code), Some("msg"), ResourceKind::Bucket, "b");
            assert!(err.is_not_found(), "Expected NotFound for code: {code}");
        }
    }

    #[test]
    fn conflict_codes() {
        for code in CONFLICT_CODES {
            let err = classify_aws_error(Some(code), Some("msg"), ResourceKind::Function, "f");
            assert!(err.is_conflict(), "Expected Conflict for code: {code}");
        }
    }

    #[test]
    fn unknown_code_is_other() {
        let err = classify_aws_error(
            Some("AccessDenied"),
            Some("no"),
            ResourceKind::Bucket,
            "b",
        );
        assert_eq!(
            err,
            ApiError::Other {
                code: Some("AccessDenied".to_string()),
                message: "no".to_string()
            }
        );
        assert!(!err.is_not_found());
        assert!(!err.is_conflict());
    }

    #[test]
    fn missing_code_is_other() {
        let err = classify_aws_error(None, None, ResourceKind::Object, "k");
        assert_eq!(err.to_string(), "remote error: Unknown error");
    }

    #[test]
    fn not_found_carries_resource() {
        let err = classify_aws_error(Some("NoSuchBucket"), None, ResourceKind::Bucket, "in");
        assert_eq!(err, ApiError::not_found(ResourceKind::Bucket, "in"));
        assert_eq!(err.to_string(), "bucket 'in' not found");
    }

    #[test]
    fn display_includes_code() {
        let err = ApiError::Other {
            code: Some("SlowDown".to_string()),
            message: "please".to_string(),
        };
        assert_eq!(err.to_string(), "remote error (SlowDown): please");
    }
}
