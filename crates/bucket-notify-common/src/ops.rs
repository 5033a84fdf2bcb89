//! Collaborator traits for the remote platform
//!
//! These traits abstract the bucket, object, and function APIs so that
//! provisioning, teardown, and the handler can be tested without hitting a
//! real account. The AWS-backed implementations live in the CLI and handler
//! crates; in-memory fakes live in `bucket-notify-test-utils`.

use crate::error::ApiError;
use crate::notifications::Notifications;
use std::collections::BTreeMap;
use std::future::Future;

/// One page of an object listing
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ObjectPage {
    /// Keys in this page, in no particular order
    pub keys: Vec<String>,
    /// Token for the next page, `None` on the final page
    pub next_token: Option<String>,
}

/// Identity of an existing function
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FunctionInfo {
    pub name: String,
    pub arn: String,
}

/// Everything needed to create or update a function
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FunctionDeployment {
    pub name: String,
    /// Zipped deployment package
    pub package: Vec<u8>,
    pub timeout_secs: i32,
    /// Environment variables the function sees at runtime
    pub environment: BTreeMap<String, String>,
    /// Execution role assumed by the function
    pub role_arn: String,
    pub runtime: String,
    pub handler: String,
}

/// Bucket management operations
pub trait BucketOperations: Send + Sync {
    /// Check that a bucket name is taken, by anyone (`NotFound` if free)
    fn probe_bucket(&self, bucket: &str) -> impl Future<Output = Result<(), ApiError>> + Send;

    /// Read a bucket's notification registration (`NotFound` if absent)
    fn read_bucket(&self, bucket: &str) -> impl Future<Output = Result<Notifications, ApiError>> + Send;

    /// Create a bucket, optionally with an initial registration (`Conflict` if taken)
    fn create_bucket(
        &self,
        bucket: &str,
        notifications: Option<Notifications>,
    ) -> impl Future<Output = Result<(), ApiError>> + Send;

    /// Replace a bucket's full notification registration
    fn update_notifications(
        &self,
        bucket: &str,
        notifications: Notifications,
    ) -> impl Future<Output = Result<(), ApiError>> + Send;

    /// List one page of object keys
    fn list_objects(
        &self,
        bucket: &str,
        continuation_token: Option<String>,
    ) -> impl Future<Output = Result<ObjectPage, ApiError>> + Send;

    /// Delete one object (`NotFound` if absent)
    fn delete_object(&self, bucket: &str, key: &str) -> impl Future<Output = Result<(), ApiError>> + Send;

    /// Delete an empty bucket (`NotFound` if absent)
    fn delete_bucket(&self, bucket: &str) -> impl Future<Output = Result<(), ApiError>> + Send;
}

/// Object content operations used by the handler
pub trait ObjectOperations: Send + Sync {
    /// Fetch an object's full content as UTF-8 text
    fn get_object_text(&self, bucket: &str, key: &str) -> impl Future<Output = Result<String, ApiError>> + Send;

    /// Store text under the given key, replacing any existing object
    fn put_object_text(
        &self,
        bucket: &str,
        key: &str,
        body: String,
    ) -> impl Future<Output = Result<(), ApiError>> + Send;
}

/// Function management operations
pub trait FunctionOperations: Send + Sync {
    /// Read a function (`NotFound` if absent)
    fn read_function(&self, name: &str) -> impl Future<Output = Result<FunctionInfo, ApiError>> + Send;

    /// Create a function (`Conflict` if it exists)
    fn create_function(
        &self,
        deployment: &FunctionDeployment,
    ) -> impl Future<Output = Result<FunctionInfo, ApiError>> + Send;

    /// Overwrite an existing function's code and configuration
    fn update_function(
        &self,
        deployment: &FunctionDeployment,
    ) -> impl Future<Output = Result<FunctionInfo, ApiError>> + Send;

    /// Delete a function (`NotFound` if absent)
    fn delete_function(&self, name: &str) -> impl Future<Output = Result<(), ApiError>> + Send;
}

/// Check whether a bucket exists.
///
/// `NotFound` means free; any other failure is returned unchanged.
pub async fn bucket_exists<B: BucketOperations>(buckets: &B, bucket: &str) -> Result<bool, ApiError> {
    match buckets.probe_bucket(bucket).await {
        Ok(_) => Ok(true),
        Err(ApiError::NotFound { .. }) => Ok(false),
        Err(e) => Err(e),
    }
}

/// Check whether a function exists.
///
/// `NotFound` means free; any other failure is returned unchanged.
pub async fn function_exists<F: FunctionOperations>(functions: &F, name: &str) -> Result<bool, ApiError> {
    match functions.read_function(name).await {
        Ok(_) => Ok(true),
        Err(ApiError::NotFound { .. }) => Ok(false),
        Err(e) => Err(e),
    }
}
