//! In-process handler invocation

use anyhow::{Context, Result};
use bucket_notify_common::{ObjectOperations, Settings};
use bucket_notify_handler::{HandlerConfig, ProcessSummary, object_created_event, process_event};
use tracing::info;

/// Run the handler against a synthetic upload of `key` to the input bucket.
///
/// The handler sees the same destination bucket the deployed function is
/// configured with. The object must already exist.
pub async fn invoke_local<O: ObjectOperations>(
    objects: &O,
    settings: &Settings,
    key: &str,
) -> Result<ProcessSummary> {
    let event = object_created_event(&settings.input_bucket_name, key)
        .context("Failed to build synthetic S3 event")?;
    let config = HandlerConfig::new(settings.function_output_bucket());

    info!(bucket = %settings.input_bucket_name, key = %key, "Invoking handler locally");
    let summary = process_event(objects, &config, &event)
        .await
        .with_context(|| format!("Handler failed for s3://{}/{key}", settings.input_bucket_name))?;
    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use bucket_notify_common::defaults::OUTPUT_BUCKET_ENV;
    use bucket_notify_test_utils::FakeBuckets;

    #[tokio::test]
    async fn writes_to_configured_destination() {
        let mut settings = Settings::new("fn", "in", "out");
        settings
            .function_environment
            .insert(OUTPUT_BUCKET_ENV.to_string(), "elsewhere".to_string());
        let objects = FakeBuckets::new()
            .with_object("in", "local.txt", "shout")
            .with_bucket("elsewhere");

        let summary = invoke_local(&objects, &settings, "local.txt").await.unwrap();

        assert_eq!(summary.written, 1);
        assert_eq!(objects.object("elsewhere", "local.txt").as_deref(), Some("SHOUT"));
        assert!(!objects.has_bucket("out"));
    }

    #[tokio::test]
    async fn missing_object_is_an_error() {
        let settings = Settings::new("fn", "in", "out");
        let objects = FakeBuckets::new().with_bucket("in").with_bucket("out");

        let err = invoke_local(&objects, &settings, "absent.txt").await.unwrap_err();

        assert!(err.to_string().contains("absent.txt"));
    }

    #[tokio::test]
    async fn keys_with_spaces_round_trip() {
        let settings = Settings::new("fn", "in", "out");
        let objects = FakeBuckets::new()
            .with_object("in", "my notes.txt", "quiet")
            .with_bucket("out");

        invoke_local(&objects, &settings, "my notes.txt").await.unwrap();

        assert_eq!(objects.object("out", "my notes.txt").as_deref(), Some("QUIET"));
    }
}
