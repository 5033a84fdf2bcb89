//! S3 bucket management

use crate::aws::context::AwsContext;
use crate::aws::classify_sdk_error;
use aws_sdk_s3::Client;
use aws_sdk_s3::types::{
    BucketLocationConstraint, CreateBucketConfiguration, Event, LambdaFunctionConfiguration,
    NotificationConfiguration,
};
use bucket_notify_common::{
    ApiError, BucketOperations, FunctionNotification, Notifications, ObjectPage, ResourceKind,
};
use tracing::{debug, info};

/// Region whose buckets must be created without a location constraint
const DEFAULT_S3_REGION: &str = "us-east-1";

/// S3 client for the demo's buckets.
///
/// Function identifiers in [`Notifications`] are Lambda function ARNs, as
/// S3 notification configurations require.
pub struct S3Client {
    client: Client,
    region: String,
}

impl S3Client {
    /// Create an S3 client from a pre-loaded AWS context
    pub fn from_context(ctx: &AwsContext) -> Self {
        Self {
            client: ctx.s3_client(),
            region: ctx.region().to_string(),
        }
    }

    async fn read_configuration(&self, bucket: &str) -> Result<NotificationConfiguration, ApiError> {
        let output = self
            .client
            .get_bucket_notification_configuration()
            .bucket(bucket)
            .send()
            .await
            .map_err(|e| classify_sdk_error(&e, ResourceKind::Bucket, bucket))?;

        Ok(NotificationConfiguration::builder()
            .set_topic_configurations(Some(output.topic_configurations().to_vec()))
            .set_queue_configurations(Some(output.queue_configurations().to_vec()))
            .set_lambda_function_configurations(Some(
                output.lambda_function_configurations().to_vec(),
            ))
            .set_event_bridge_configuration(output.event_bridge_configuration().cloned())
            .build())
    }
}

/// Merge `notifications` into an existing configuration.
///
/// Topic, queue, and EventBridge targets are kept as-is. Every Lambda
/// config whose function is still listed is kept with its own events and
/// filters, including several configs for one function. Functions no
/// config covers are registered for `s3:ObjectCreated:Put`.
fn merge_configuration(
    existing: NotificationConfiguration,
    notifications: &Notifications,
) -> Result<NotificationConfiguration, ApiError> {
    let mut lambdas: Vec<LambdaFunctionConfiguration> = existing
        .lambda_function_configurations()
        .iter()
        .filter(|c| notifications.contains(c.lambda_function_arn()))
        .cloned()
        .collect();

    for FunctionNotification { function } in &notifications.functions {
        if lambdas.iter().any(|c| c.lambda_function_arn() == function.as_str()) {
            continue;
        }
        lambdas.push(
            LambdaFunctionConfiguration::builder()
                .lambda_function_arn(function)
                .events(Event::S3ObjectCreatedPut)
                .build()
                .map_err(|e| ApiError::other(e.to_string()))?,
        );
    }

    Ok(NotificationConfiguration::builder()
        .set_topic_configurations(Some(existing.topic_configurations().to_vec()))
        .set_queue_configurations(Some(existing.queue_configurations().to_vec()))
        .set_lambda_function_configurations(Some(lambdas))
        .set_event_bridge_configuration(existing.event_bridge_configuration().cloned())
        .build())
}

/// One registration entry per function, however many configs it has
fn notifications_from_configuration(config: &NotificationConfiguration) -> Notifications {
    let mut notifications = Notifications::default();
    for c in config.lambda_function_configurations() {
        notifications.add(c.lambda_function_arn());
    }
    notifications
}

/// Interpret the status of a failed `HeadBucket`.
///
/// HEAD responses carry no error code. Only 404 means the name is free;
/// redirects (another region), 400 (region mismatch) and 403 (another
/// account) all mean someone holds it. Server errors say nothing about the
/// name and are returned as failures.
fn head_bucket_status(status: u16) -> HeadBucketStatus {
    match status {
        404 => HeadBucketStatus::Free,
        500..=599 => HeadBucketStatus::Unknown,
        _ => HeadBucketStatus::Taken,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum HeadBucketStatus {
    Free,
    Taken,
    Unknown,
}

impl BucketOperations for S3Client {
    async fn probe_bucket(&self, bucket: &str) -> Result<(), ApiError> {
        let err = match self.client.head_bucket().bucket(bucket).send().await {
            Ok(_) => return Ok(()),
            Err(e) => e,
        };
        // No raw response means the request never got an answer
        let Some(status) = err.raw_response().map(|r| r.status().as_u16()) else {
            return Err(classify_sdk_error(&err, ResourceKind::Bucket, bucket));
        };
        match head_bucket_status(status) {
            HeadBucketStatus::Free => Err(ApiError::not_found(ResourceKind::Bucket, bucket)),
            HeadBucketStatus::Taken => {
                debug!(bucket = %bucket, status, "Bucket name held elsewhere");
                Ok(())
            }
            HeadBucketStatus::Unknown => Err(classify_sdk_error(&err, ResourceKind::Bucket, bucket)),
        }
    }

    async fn read_bucket(&self, bucket: &str) -> Result<Notifications, ApiError> {
        let config = self.read_configuration(bucket).await?;
        Ok(notifications_from_configuration(&config))
    }

    async fn create_bucket(
        &self,
        bucket: &str,
        notifications: Option<Notifications>,
    ) -> Result<(), ApiError> {
        info!(bucket = %bucket, region = %self.region, "Creating S3 bucket");

        let mut request = self.client.create_bucket().bucket(bucket);
        if self.region != DEFAULT_S3_REGION {
            request = request.create_bucket_configuration(
                CreateBucketConfiguration::builder()
                    .location_constraint(BucketLocationConstraint::from(self.region.as_str()))
                    .build(),
            );
        }
        request
            .send()
            .await
            .map_err(|e| classify_sdk_error(&e, ResourceKind::Bucket, bucket))?;

        match notifications {
            Some(n) if !n.is_empty() => self.update_notifications(bucket, n).await,
            _ => Ok(()),
        }
    }

    async fn update_notifications(
        &self,
        bucket: &str,
        notifications: Notifications,
    ) -> Result<(), ApiError> {
        let existing = self.read_configuration(bucket).await?;
        let config = merge_configuration(existing, &notifications)?;

        info!(bucket = %bucket, functions = notifications.len(), "Writing notification configuration");
        self.client
            .put_bucket_notification_configuration()
            .bucket(bucket)
            .notification_configuration(config)
            .send()
            .await
            .map_err(|e| classify_sdk_error(&e, ResourceKind::Bucket, bucket))?;
        Ok(())
    }

    async fn list_objects(
        &self,
        bucket: &str,
        continuation_token: Option<String>,
    ) -> Result<ObjectPage, ApiError> {
        let response = self
            .client
            .list_objects_v2()
            .bucket(bucket)
            .set_continuation_token(continuation_token)
            .send()
            .await
            .map_err(|e| classify_sdk_error(&e, ResourceKind::Bucket, bucket))?;

        let keys = response
            .contents()
            .iter()
            .filter_map(|o| o.key().map(str::to_string))
            .collect();
        let next_token = if response.is_truncated() == Some(true) {
            response.next_continuation_token().map(str::to_string)
        } else {
            None
        };
        Ok(ObjectPage { keys, next_token })
    }

    async fn delete_object(&self, bucket: &str, key: &str) -> Result<(), ApiError> {
        debug!(bucket = %bucket, key = %key, "Deleting object");
        self.client
            .delete_object()
            .bucket(bucket)
            .key(key)
            .send()
            .await
            .map_err(|e| classify_sdk_error(&e, ResourceKind::Object, key))?;
        Ok(())
    }

    async fn delete_bucket(&self, bucket: &str) -> Result<(), ApiError> {
        info!(bucket = %bucket, "Deleting bucket");
        self.client
            .delete_bucket()
            .bucket(bucket)
            .send()
            .await
            .map_err(|e| classify_sdk_error(&e, ResourceKind::Bucket, bucket))?;
        Ok(())
    }
}
