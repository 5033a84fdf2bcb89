//! Bulk teardown of the demo's buckets and function
//!
//! The three deletions run concurrently and never cancel each other. A
//! resource that is already gone counts as cleaned up.

use bucket_notify_common::{
    ApiError, BucketOperations, FunctionOperations, ResourceKind, Settings,
};
use futures::future::join_all;
use std::fmt;
use tracing::{debug, error, info};

/// Result of a single resource cleanup operation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CleanupResult {
    /// Resource was successfully deleted
    Deleted,
    /// Resource was already deleted (not found)
    AlreadyDeleted,
    /// Cleanup failed with error
    Failed,
}

impl CleanupResult {
    /// Classify a settled deletion, logging failures
    fn classify(kind: ResourceKind, name: &str, result: Result<(), ApiError>) -> Self {
        match result {
            Ok(()) => {
                info!(resource_type = %kind, resource_id = %name, "Deleted");
                CleanupResult::Deleted
            }
            Err(ApiError::NotFound { .. }) => {
                info!(resource_type = %kind, resource_id = %name, "Already deleted");
                CleanupResult::AlreadyDeleted
            }
            Err(e) => {
                error!(
                    resource_type = %kind,
                    resource_id = %name,
                    error = %e,
                    "Cleanup failed"
                );
                CleanupResult::Failed
            }
        }
    }

    /// Get a short string representation for reports
    pub fn as_str(self) -> &'static str {
        match self {
            CleanupResult::Deleted => "deleted",
            CleanupResult::AlreadyDeleted => "already deleted",
            CleanupResult::Failed => "FAILED",
        }
    }
}

impl fmt::Display for CleanupResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome for one top-level resource
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TeardownEntry {
    pub kind: ResourceKind,
    pub name: String,
    pub result: CleanupResult,
}

/// Outcomes for all three resources, in input, output, function order
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TeardownReport {
    pub entries: Vec<TeardownEntry>,
}

impl TeardownReport {
    /// Number of resources that could not be deleted
    pub fn failed(&self) -> usize {
        self.entries
            .iter()
            .filter(|e| e.result == CleanupResult::Failed)
            .count()
    }

    pub fn is_success(&self) -> bool {
        self.failed() == 0
    }
}

/// Delete every object in a bucket, page by page.
///
/// Keys within a page are deleted concurrently and all settle before the
/// next page is requested. Individual key failures are ignored; the bucket
/// deletion that follows reports anything left behind. Returns the number
/// of keys deleted.
pub async fn empty_bucket<B: BucketOperations>(buckets: &B, bucket: &str) -> Result<usize, ApiError> {
    let mut deleted = 0;
    let mut continuation_token = None;
    loop {
        let page = buckets.list_objects(bucket, continuation_token).await?;

        let results = join_all(page.keys.iter().map(|key| buckets.delete_object(bucket, key))).await;
        for (key, result) in page.keys.iter().zip(results) {
            match result {
                Ok(()) => deleted += 1,
                Err(e) => debug!(bucket = %bucket, key = %key, error = %e, "Failed to delete object"),
            }
        }

        match page.next_token {
            Some(token) => continuation_token = Some(token),
            None => break,
        }
    }
    Ok(deleted)
}

/// Empty a bucket, then delete it
pub async fn delete_bucket_with_contents<B: BucketOperations>(
    buckets: &B,
    bucket: &str,
) -> Result<(), ApiError> {
    let deleted = empty_bucket(buckets, bucket).await?;
    debug!(bucket = %bucket, deleted, "Emptied bucket");
    buckets.delete_bucket(bucket).await
}

/// Delete both buckets and the function named in `settings`.
///
/// All three deletions are attempted regardless of each other's outcome.
#[tracing::instrument(skip_all, fields(function = %settings.function_name))]
pub async fn teardown<B, F>(buckets: &B, functions: &F, settings: &Settings) -> TeardownReport
where
    B: BucketOperations,
    F: FunctionOperations,
{
    let (input, output, function) = tokio::join!(
        delete_bucket_with_contents(buckets, &settings.input_bucket_name),
        delete_bucket_with_contents(buckets, &settings.output_bucket_name),
        functions.delete_function(&settings.function_name),
    );

    let entries = [
        (ResourceKind::Bucket, &settings.input_bucket_name, input),
        (ResourceKind::Bucket, &settings.output_bucket_name, output),
        (ResourceKind::Function, &settings.function_name, function),
    ]
    .into_iter()
    .map(|(kind, name, result)| TeardownEntry {
        kind,
        name: name.clone(),
        result: CleanupResult::classify(kind, name, result),
    })
    .collect();

    TeardownReport { entries }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bucket_notify_test_utils::{BucketCall, BucketOp, FakeBuckets, FakeFunctions};

    fn settings() -> Settings {
        Settings::new("fn", "in", "out")
    }

    #[tokio::test]
    async fn empties_every_page_before_deleting_bucket() {
        let mut buckets = FakeBuckets::new().with_page_size(2);
        for i in 0..6 {
            buckets = buckets.with_object("in", &format!("k{i}"), "");
        }

        delete_bucket_with_contents(&buckets, "in").await.unwrap();

        let calls = buckets.calls();
        let deletes = calls
            .iter()
            .filter(|c| matches!(c, BucketCall::DeleteObject { .. }))
            .count();
        assert_eq!(deletes, 6);
        assert_eq!(
            buckets.count_calls(|c| matches!(c, BucketCall::List { .. })),
            4
        );
        assert_eq!(calls.last(), Some(&BucketCall::DeleteBucket("in".to_string())));
        assert!(!buckets.has_bucket("in"));
    }

    #[tokio::test]
    async fn page_deletes_settle_before_next_listing() {
        let mut buckets = FakeBuckets::new().with_page_size(2);
        for i in 0..4 {
            buckets = buckets.with_object("in", &format!("k{i}"), "");
        }

        empty_bucket(&buckets, "in").await.unwrap();

        let kinds: Vec<&str> = buckets
            .calls()
            .iter()
            .map(|c| match c {
                BucketCall::List { .. } => "list",
                BucketCall::DeleteObject { .. } => "delete",
                _ => "other",
            })
            .collect();
        assert_eq!(
            kinds,
            ["list", "delete", "delete", "list", "delete", "delete", "list"]
        );
    }

    #[tokio::test]
    async fn everything_deleted() {
        let buckets = FakeBuckets::new()
            .with_object("in", "a", "1")
            .with_object("out", "a", "1");
        let functions = FakeFunctions::new().with_function("fn");

        let report = teardown(&buckets, &functions, &settings()).await;

        assert!(report.is_success());
        assert!(report.entries.iter().all(|e| e.result == CleanupResult::Deleted));
        assert!(buckets.bucket_names().is_empty());
        assert!(!functions.has_function("fn"));
    }

    #[tokio::test]
    async fn missing_resources_count_as_already_deleted() {
        let buckets = FakeBuckets::new();
        let functions = FakeFunctions::new();

        let report = teardown(&buckets, &functions, &settings()).await;

        assert!(report.is_success());
        assert!(
            report
                .entries
                .iter()
                .all(|e| e.result == CleanupResult::AlreadyDeleted)
        );
    }

    #[tokio::test]
    async fn one_failure_does_not_stop_the_others() {
        let buckets = FakeBuckets::new()
            .with_bucket("in")
            .with_bucket("out")
            .fail_on(BucketOp::DeleteBucket, "in", ApiError::other("access denied"));
        let functions = FakeFunctions::new().with_function("fn");

        let report = teardown(&buckets, &functions, &settings()).await;

        assert_eq!(report.failed(), 1);
        assert_eq!(report.entries[0].result, CleanupResult::Failed);
        assert_eq!(report.entries[1].result, CleanupResult::Deleted);
        assert_eq!(report.entries[2].result, CleanupResult::Deleted);
        assert!(!buckets.has_bucket("out"));
        assert!(!functions.has_function("fn"));
    }

    #[tokio::test]
    async fn object_delete_failures_are_ignored() {
        let buckets = FakeBuckets::new()
            .with_object("in", "a", "1")
            .fail_on(BucketOp::DeleteObject, "in", ApiError::other("denied"));

        let deleted = empty_bucket(&buckets, "in").await.unwrap();

        assert_eq!(deleted, 0);
        assert_eq!(buckets.object("in", "a").as_deref(), Some("1"));
    }

    #[tokio::test]
    async fn bucket_gone_at_delete_counts_as_already_deleted() {
        let buckets = FakeBuckets::new()
            .with_bucket("in")
            .with_bucket("out")
            .fail_on(
                BucketOp::DeleteBucket,
                "in",
                ApiError::not_found(ResourceKind::Bucket, "in"),
            );
        let functions = FakeFunctions::new().with_function("fn");

        let report = teardown(&buckets, &functions, &settings()).await;

        assert_eq!(report.entries[0].result, CleanupResult::AlreadyDeleted);
        assert!(report.is_success());
        assert_eq!(
            buckets.count_calls(|c| *c == BucketCall::DeleteBucket("in".to_string())),
            1
        );
    }
}
