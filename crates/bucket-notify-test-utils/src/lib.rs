//! Shared test utilities for bucket-notify
//!
//! This crate provides in-memory fakes of the collaborator traits so that
//! provisioning, teardown, and the handler can be exercised without a real
//! account.
//!
//! ## Modules
//!
//! - [`buckets`]: Fake bucket and object store with call recording
//! - [`functions`]: Fake function registry with call recording

pub mod buckets;
pub mod functions;

// Re-export commonly used items
pub use buckets::{BucketCall, BucketOp, FakeBuckets};
pub use functions::{FakeFunctions, FunctionCall, FunctionOp};
