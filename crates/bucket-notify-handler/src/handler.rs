//! Event processing

use crate::config::HandlerConfig;
use crate::error::HandlerError;
use crate::records::{Notification, is_object_created, notification_from_record};
use crate::transform::transform;
use aws_lambda_events::event::s3::S3Event;
use bucket_notify_common::ObjectOperations;
use tracing::{debug, error, info};

/// Outcome counts for one invocation
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ProcessSummary {
    /// Objects transformed and written to the output bucket
    pub written: usize,
    /// Notifications skipped because they came from the output bucket
    pub skipped: usize,
    /// Records of event kinds other than `ObjectCreated:Put`
    pub ignored: usize,
}

/// Process every record in an S3 event.
///
/// Records are handled one after another in delivery order. The first
/// failure aborts the remaining records and is returned, so the platform's
/// retry policy sees it.
#[tracing::instrument(skip_all, fields(record_count = event.records.len()))]
pub async fn process_event<O: ObjectOperations>(
    objects: &O,
    config: &HandlerConfig,
    event: &S3Event,
) -> Result<ProcessSummary, HandlerError> {
    let mut summary = ProcessSummary::default();

    for (index, record) in event.records.iter().enumerate() {
        if !is_object_created(record) {
            debug!(index, event_name = ?record.event_name, "Ignoring record");
            summary.ignored += 1;
            continue;
        }

        let notification = notification_from_record(index, record)?;
        if process_notification(objects, config, &notification).await? {
            summary.written += 1;
        } else {
            summary.skipped += 1;
        }
    }

    info!(
        written = summary.written,
        skipped = summary.skipped,
        ignored = summary.ignored,
        "Processing complete"
    );
    Ok(summary)
}

/// Fetch, transform, and store one object.
///
/// Returns `false` if the notification came from the output bucket. Writing
/// there would trigger the function again and loop forever.
#[tracing::instrument(skip(objects, config), fields(bucket = %notification.bucket, key = %notification.key))]
pub async fn process_notification<O: ObjectOperations>(
    objects: &O,
    config: &HandlerConfig,
    notification: &Notification,
) -> Result<bool, HandlerError> {
    if notification.bucket == config.output_bucket {
        error!(
            bucket = %notification.bucket,
            key = %notification.key,
            "Input and output bucket are the same, skipping"
        );
        return Ok(false);
    }

    let contents = objects
        .get_object_text(&notification.bucket, &notification.key)
        .await?;

    objects
        .put_object_text(&config.output_bucket, &notification.key, transform(&contents))
        .await?;

    debug!(output_bucket = %config.output_bucket, "Stored transformed object");
    Ok(true)
}
