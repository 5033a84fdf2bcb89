//! bucket-notify-handler - Object notification handler
//!
//! The function deployed by `bucket-notify deploy`. For every new object in
//! the input bucket it reads the object, uppercases it, and stores the result
//! under the same key in the output bucket.

pub mod config;
pub mod error;
pub mod handler;
pub mod key;
pub mod records;
pub mod s3;
pub mod transform;

pub use config::HandlerConfig;
pub use error::HandlerError;
pub use handler::{ProcessSummary, process_event};
pub use records::{Notification, object_created_event};
pub use s3::{S3Objects, classify_sdk_error};
