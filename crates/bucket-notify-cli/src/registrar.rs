//! Idempotent notification registration

use bucket_notify_common::{ApiError, BucketOperations, Notifications};
use std::fmt;
use tracing::info;

/// What registering a function changed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegistrationOutcome {
    /// The function was appended to an existing registration
    Added,
    /// The function was already registered; nothing was written
    AlreadyRegistered,
    /// The bucket did not exist and was created with only this function
    CreatedBucket,
}

impl RegistrationOutcome {
    /// Get a short string representation for command output
    pub fn as_str(self) -> &'static str {
        match self {
            RegistrationOutcome::Added => "registered",
            RegistrationOutcome::AlreadyRegistered => "already registered",
            RegistrationOutcome::CreatedBucket => "created bucket and registered",
        }
    }
}

impl fmt::Display for RegistrationOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Ensure `function` is in `bucket`'s notification registration.
///
/// Existing bindings are preserved. Any read failure other than `NotFound`
/// is returned unchanged.
#[tracing::instrument(skip(buckets))]
pub async fn register_notification<B: BucketOperations>(
    buckets: &B,
    bucket: &str,
    function: &str,
) -> Result<RegistrationOutcome, ApiError> {
    match buckets.read_bucket(bucket).await {
        Ok(mut notifications) => {
            if !notifications.add(function) {
                info!("Function already registered");
                return Ok(RegistrationOutcome::AlreadyRegistered);
            }
            buckets.update_notifications(bucket, notifications).await?;
            info!("Registered function");
            Ok(RegistrationOutcome::Added)
        }
        Err(ApiError::NotFound { .. }) => {
            buckets
                .create_bucket(bucket, Some(Notifications::with_function(function)))
                .await?;
            info!("Created bucket with registration");
            Ok(RegistrationOutcome::CreatedBucket)
        }
        Err(e) => Err(e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bucket_notify_test_utils::{BucketCall, BucketOp, FakeBuckets};

    #[tokio::test]
    async fn registering_twice_keeps_one_entry() {
        let buckets = FakeBuckets::new().with_bucket("in");

        let first = register_notification(&buckets, "in", "f").await.unwrap();
        let second = register_notification(&buckets, "in", "f").await.unwrap();

        assert_eq!(first, RegistrationOutcome::Added);
        assert_eq!(second, RegistrationOutcome::AlreadyRegistered);
        assert_eq!(buckets.notifications("in"), Some(Notifications::with_function("f")));
        assert_eq!(
            buckets.count_calls(|c| matches!(c, BucketCall::Update(_))),
            1
        );
    }

    #[tokio::test]
    async fn existing_bindings_are_preserved() {
        let buckets =
            FakeBuckets::new().with_notifications("in", Notifications::with_function("x"));

        register_notification(&buckets, "in", "y").await.unwrap();

        let notifications = buckets.notifications("in").unwrap();
        assert_eq!(notifications.len(), 2);
        assert!(notifications.contains("x"));
        assert!(notifications.contains("y"));
    }

    #[tokio::test]
    async fn missing_bucket_is_created_with_exactly_the_function() {
        let buckets = FakeBuckets::new();

        let outcome = register_notification(&buckets, "in", "f").await.unwrap();

        assert_eq!(outcome, RegistrationOutcome::CreatedBucket);
        assert_eq!(outcome.to_string(), "created bucket and registered");
        assert_eq!(buckets.notifications("in"), Some(Notifications::with_function("f")));
        assert_eq!(
            buckets.calls(),
            [
                BucketCall::Read("in".to_string()),
                BucketCall::Create("in".to_string())
            ]
        );
    }

    #[tokio::test]
    async fn other_read_failures_are_returned() {
        let buckets = FakeBuckets::new()
            .with_bucket("in")
            .fail_on(BucketOp::Read, "in", ApiError::other("throttled"));

        let err = register_notification(&buckets, "in", "f").await.unwrap_err();

        assert_eq!(err, ApiError::other("throttled"));
        assert_eq!(buckets.calls(), [BucketCall::Read("in".to_string())]);
    }
}
