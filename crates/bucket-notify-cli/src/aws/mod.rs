//! AWS client modules for the CLI
//!
//! This module provides wrappers around AWS SDK clients for:
//! - S3: Bucket lifecycle and notification configuration
//! - Lambda: Function lifecycle and invoke permissions

pub mod context;
pub mod lambda;
pub mod s3;

pub use context::AwsContext;
pub use bucket_notify_handler::classify_sdk_error;
pub use lambda::LambdaClient;
pub use s3::S3Client;
