//! Default configuration values shared between the CLI and the handler
//!
//! These constants keep names and limits consistent across all bucket-notify
//! components.

/// Desired name of the bucket that triggers the function
pub const INPUT_BUCKET_BASE_NAME: &str = "demo-notification-input";

/// Desired name of the bucket the function writes to
pub const OUTPUT_BUCKET_BASE_NAME: &str = "demo-notification-output";

/// Desired name of the function (only has to be unique per account)
pub const FUNCTION_BASE_NAME: &str = "demo-notification";

/// Upper bound on name probing rounds before setup gives up
pub const MAX_NAME_ATTEMPTS: u32 = 25;

/// Maximum execution time of the deployed function in seconds
pub const DEFAULT_FUNCTION_TIMEOUT_SECS: i32 = 900;

/// Runtime for the deployed function (custom runtime, `bootstrap` binary)
pub const DEFAULT_FUNCTION_RUNTIME: &str = "provided.al2023";

/// Handler name for custom runtimes
pub const DEFAULT_FUNCTION_HANDLER: &str = "bootstrap";

/// Default location of the settings file
pub const DEFAULT_SETTINGS_PATH: &str = "bucket-notify.json";

/// Default AWS region
pub const DEFAULT_REGION: &str = "us-east-1";

/// Environment variable naming the destination bucket of the handler
pub const OUTPUT_BUCKET_ENV: &str = "OUTPUT_BUCKET";

/// Event name the handler processes
pub const OBJECT_CREATED_PUT: &str = "ObjectCreated:Put";

/// Event type registered on the input bucket
pub const S3_OBJECT_CREATED_PUT: &str = "s3:ObjectCreated:Put";

/// Key used by the local test invocation
pub const DEFAULT_LOCAL_KEY: &str = "local.txt";
