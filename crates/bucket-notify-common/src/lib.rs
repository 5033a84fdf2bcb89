//! bucket-notify-common - Shared types and utilities
//!
//! This crate provides the types shared by the CLI and the deployed handler,
//! without any AWS SDK dependencies to keep it lightweight.
//!
//! ## Modules
//!
//! - [`defaults`]: Base names, attempt ceilings, and other default values
//! - [`error`]: Closed error taxonomy for remote API calls
//! - [`naming`]: Readable random suffixes and suffixed resource names
//! - [`notifications`]: Bucket notification registration model
//! - [`ops`]: Collaborator traits for buckets, objects, and functions
//! - [`resource_kind`]: Kinds of remote resources managed by bucket-notify
//! - [`settings`]: Persisted names of provisioned resources

pub mod defaults;
pub mod error;
pub mod naming;
pub mod notifications;
pub mod ops;
pub mod resource_kind;
pub mod settings;

// Re-export commonly used types
pub use error::{ApiError, classify_aws_error};
pub use naming::{Suffix, generate_suffix};
pub use notifications::{FunctionNotification, Notifications};
pub use ops::{
    BucketOperations, FunctionDeployment, FunctionInfo, FunctionOperations, ObjectOperations,
    ObjectPage,
};
pub use resource_kind::ResourceKind;
pub use settings::{Settings, SettingsError};
