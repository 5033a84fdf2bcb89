//! In-memory bucket and object store
//!
//! Implements both [`BucketOperations`] and [`ObjectOperations`], records
//! every call in order, and can be told to fail specific operations.

use bucket_notify_common::{
    ApiError, BucketOperations, Notifications, ObjectOperations, ObjectPage, ResourceKind,
};
use std::collections::{BTreeMap, HashMap};
use std::sync::Mutex;

/// Operation selector for failure injection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BucketOp {
    Probe,
    Read,
    Create,
    Update,
    List,
    DeleteObject,
    DeleteBucket,
    GetObject,
    PutObject,
}

/// A recorded call against the fake
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BucketCall {
    Probe(String),
    Read(String),
    Create(String),
    Update(String),
    List { bucket: String, token: Option<String> },
    DeleteObject { bucket: String, key: String },
    DeleteBucket(String),
    GetObject { bucket: String, key: String },
    PutObject { bucket: String, key: String },
}

#[derive(Debug, Default)]
struct Bucket {
    notifications: Notifications,
    objects: BTreeMap<String, String>,
}

#[derive(Debug)]
struct State {
    buckets: BTreeMap<String, Bucket>,
    calls: Vec<BucketCall>,
    failures: HashMap<(BucketOp, String), ApiError>,
    page_size: usize,
}

/// Fake bucket store
#[derive(Debug)]
pub struct FakeBuckets {
    state: Mutex<State>,
}

impl Default for FakeBuckets {
    fn default() -> Self {
        Self::new()
    }
}

impl FakeBuckets {
    /// Empty store with a listing page size of 1000 (the S3 default)
    pub fn new() -> Self {
        Self {
            state: Mutex::new(State {
                buckets: BTreeMap::new(),
                calls: Vec::new(),
                failures: HashMap::new(),
                page_size: 1000,
            }),
        }
    }

    /// Set the maximum number of keys per listing page
    pub fn with_page_size(self, page_size: usize) -> Self {
        self.state.lock().unwrap().page_size = page_size.max(1);
        self
    }

    /// Add an existing bucket
    pub fn with_bucket(self, bucket: &str) -> Self {
        self.state
            .lock()
            .unwrap()
            .buckets
            .entry(bucket.to_string())
            .or_default();
        self
    }

    /// Add an existing bucket with a registration
    pub fn with_notifications(self, bucket: &str, notifications: Notifications) -> Self {
        self.state
            .lock()
            .unwrap()
            .buckets
            .entry(bucket.to_string())
            .or_default()
            .notifications = notifications;
        self
    }

    /// Add an object, creating the bucket if needed
    pub fn with_object(self, bucket: &str, key: &str, body: &str) -> Self {
        self.state
            .lock()
            .unwrap()
            .buckets
            .entry(bucket.to_string())
            .or_default()
            .objects
            .insert(key.to_string(), body.to_string());
        self
    }

    /// Make every call of `op` against `bucket` fail with `error`
    pub fn fail_on(self, op: BucketOp, bucket: &str, error: ApiError) -> Self {
        self.state
            .lock()
            .unwrap()
            .failures
            .insert((op, bucket.to_string()), error);
        self
    }

    /// All calls so far, in order
    pub fn calls(&self) -> Vec<BucketCall> {
        self.state.lock().unwrap().calls.clone()
    }

    /// Number of recorded calls matching a predicate
    pub fn count_calls(&self, pred: impl Fn(&BucketCall) -> bool) -> usize {
        self.state.lock().unwrap().calls.iter().filter(|c| pred(c)).count()
    }

    pub fn has_bucket(&self, bucket: &str) -> bool {
        self.state.lock().unwrap().buckets.contains_key(bucket)
    }

    pub fn bucket_names(&self) -> Vec<String> {
        self.state.lock().unwrap().buckets.keys().cloned().collect()
    }

    pub fn notifications(&self, bucket: &str) -> Option<Notifications> {
        self.state
            .lock()
            .unwrap()
            .buckets
            .get(bucket)
            .map(|b| b.notifications.clone())
    }

    pub fn object(&self, bucket: &str, key: &str) -> Option<String> {
        self.state
            .lock()
            .unwrap()
            .buckets
            .get(bucket)
            .and_then(|b| b.objects.get(key).cloned())
    }

    /// Record a call and return the injected failure for it, if any
    fn record(&self, call: BucketCall, op: BucketOp, bucket: &str) -> Result<(), ApiError> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(call);
        match state.failures.get(&(op, bucket.to_string())) {
            Some(err) => Err(err.clone()),
            None => Ok(()),
        }
    }

    fn missing_bucket(bucket: &str) -> ApiError {
        ApiError::not_found(ResourceKind::Bucket, bucket)
    }
}

impl BucketOperations for FakeBuckets {
    async fn probe_bucket(&self, bucket: &str) -> Result<(), ApiError> {
        self.record(BucketCall::Probe(bucket.to_string()), BucketOp::Probe, bucket)?;
        if self.has_bucket(bucket) {
            Ok(())
        } else {
            Err(Self::missing_bucket(bucket))
        }
    }

    async fn read_bucket(&self, bucket: &str) -> Result<Notifications, ApiError> {
        self.record(BucketCall::Read(bucket.to_string()), BucketOp::Read, bucket)?;
        let state = self.state.lock().unwrap();
        state
            .buckets
            .get(bucket)
            .map(|b| b.notifications.clone())
            .ok_or_else(|| Self::missing_bucket(bucket))
    }

    async fn create_bucket(
        &self,
        bucket: &str,
        notifications: Option<Notifications>,
    ) -> Result<(), ApiError> {
        self.record(BucketCall::Create(bucket.to_string()), BucketOp::Create, bucket)?;
        let mut state = self.state.lock().unwrap();
        if state.buckets.contains_key(bucket) {
            return Err(ApiError::conflict(ResourceKind::Bucket, bucket));
        }
        state.buckets.insert(
            bucket.to_string(),
            Bucket {
                notifications: notifications.unwrap_or_default(),
                objects: BTreeMap::new(),
            },
        );
        Ok(())
    }

    async fn update_notifications(
        &self,
        bucket: &str,
        notifications: Notifications,
    ) -> Result<(), ApiError> {
        self.record(BucketCall::Update(bucket.to_string()), BucketOp::Update, bucket)?;
        let mut state = self.state.lock().unwrap();
        let entry = state
            .buckets
            .get_mut(bucket)
            .ok_or_else(|| Self::missing_bucket(bucket))?;
        entry.notifications = notifications;
        Ok(())
    }

    async fn list_objects(
        &self,
        bucket: &str,
        continuation_token: Option<String>,
    ) -> Result<ObjectPage, ApiError> {
        self.record(
            BucketCall::List {
                bucket: bucket.to_string(),
                token: continuation_token.clone(),
            },
            BucketOp::List,
            bucket,
        )?;
        let state = self.state.lock().unwrap();
        let entry = state
            .buckets
            .get(bucket)
            .ok_or_else(|| Self::missing_bucket(bucket))?;

        // The token is the last key of the previous page
        let keys: Vec<String> = entry
            .objects
            .keys()
            .filter(|k| continuation_token.as_deref().is_none_or(|t| k.as_str() > t))
            .take(state.page_size)
            .cloned()
            .collect();
        let next_token = if keys.len() == state.page_size {
            keys.last().cloned()
        } else {
            None
        };
        Ok(ObjectPage { keys, next_token })
    }

    async fn delete_object(&self, bucket: &str, key: &str) -> Result<(), ApiError> {
        self.record(
            BucketCall::DeleteObject {
                bucket: bucket.to_string(),
                key: key.to_string(),
            },
            BucketOp::DeleteObject,
            bucket,
        )?;
        let mut state = self.state.lock().unwrap();
        let entry = state
            .buckets
            .get_mut(bucket)
            .ok_or_else(|| Self::missing_bucket(bucket))?;
        entry
            .objects
            .remove(key)
            .map(|_| ())
            .ok_or_else(|| ApiError::not_found(ResourceKind::Object, key))
    }

    async fn delete_bucket(&self, bucket: &str) -> Result<(), ApiError> {
        self.record(
            BucketCall::DeleteBucket(bucket.to_string()),
            BucketOp::DeleteBucket,
            bucket,
        )?;
        let mut state = self.state.lock().unwrap();
        match state.buckets.get(bucket) {
            None => Err(Self::missing_bucket(bucket)),
            Some(b) if !b.objects.is_empty() => Err(ApiError::Other {
                code: Some("BucketNotEmpty".to_string()),
                message: format!("bucket '{bucket}' is not empty"),
            }),
            Some(_) => {
                state.buckets.remove(bucket);
                Ok(())
            }
        }
    }
}

impl ObjectOperations for FakeBuckets {
    async fn get_object_text(&self, bucket: &str, key: &str) -> Result<String, ApiError> {
        self.record(
            BucketCall::GetObject {
                bucket: bucket.to_string(),
                key: key.to_string(),
            },
            BucketOp::GetObject,
            bucket,
        )?;
        let state = self.state.lock().unwrap();
        let entry = state
            .buckets
            .get(bucket)
            .ok_or_else(|| Self::missing_bucket(bucket))?;
        entry
            .objects
            .get(key)
            .cloned()
            .ok_or_else(|| ApiError::not_found(ResourceKind::Object, key))
    }

    async fn put_object_text(&self, bucket: &str, key: &str, body: String) -> Result<(), ApiError> {
        self.record(
            BucketCall::PutObject {
                bucket: bucket.to_string(),
                key: key.to_string(),
            },
            BucketOp::PutObject,
            bucket,
        )?;
        let mut state = self.state.lock().unwrap();
        let entry = state
            .buckets
            .get_mut(bucket)
            .ok_or_else(|| Self::missing_bucket(bucket))?;
        entry.objects.insert(key.to_string(), body);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn listing_pages_end_with_empty_page_on_exact_multiple() {
        let fake = FakeBuckets::new()
            .with_page_size(2)
            .with_object("b", "k1", "")
            .with_object("b", "k2", "")
            .with_object("b", "k3", "")
            .with_object("b", "k4", "");

        let first = fake.list_objects("b", None).await.unwrap();
        assert_eq!(first.keys, ["k1", "k2"]);
        let second = fake.list_objects("b", first.next_token).await.unwrap();
        assert_eq!(second.keys, ["k3", "k4"]);
        let last = fake.list_objects("b", second.next_token).await.unwrap();
        assert!(last.keys.is_empty());
        assert!(last.next_token.is_none());
    }

    #[tokio::test]
    async fn injected_failure_is_returned_and_recorded() {
        let fake = FakeBuckets::new()
            .with_bucket("b")
            .fail_on(BucketOp::DeleteBucket, "b", ApiError::other("boom"));

        let err = fake.delete_bucket("b").await.unwrap_err();
        assert_eq!(err, ApiError::other("boom"));
        assert!(fake.has_bucket("b"));
        assert_eq!(fake.calls(), [BucketCall::DeleteBucket("b".to_string())]);
    }

    #[tokio::test]
    async fn non_empty_bucket_cannot_be_deleted() {
        let fake = FakeBuckets::new().with_object("b", "k", "v");
        let err = fake.delete_bucket("b").await.unwrap_err();
        assert!(matches!(err, ApiError::Other { .. }));
    }
}
