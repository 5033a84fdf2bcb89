//! S3-backed object operations

use aws_sdk_s3::Client;
use aws_sdk_s3::error::{DisplayErrorContext, ProvideErrorMetadata};
use aws_sdk_s3::primitives::ByteStream;
use bucket_notify_common::{ApiError, ObjectOperations, ResourceKind, classify_aws_error};

/// Object reads and writes through the S3 API
#[derive(Debug, Clone)]
pub struct S3Objects {
    client: Client,
}

impl S3Objects {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    /// Create a client from a loaded SDK config
    pub fn from_config(config: &aws_config::SdkConfig) -> Self {
        Self::new(Client::new(config))
    }
}

/// Classify an SDK error for the resource the call addressed.
///
/// Works for any AWS service client, since they share the error metadata
/// trait. Falls back to the full error context when the service sent no
/// message, which is always the case for HEAD requests.
pub fn classify_sdk_error<E>(err: &E, kind: ResourceKind, name: &str) -> ApiError
where
    E: ProvideErrorMetadata + std::error::Error,
{
    let message = err
        .message()
        .map(str::to_string)
        .unwrap_or_else(|| DisplayErrorContext(err).to_string());
    classify_aws_error(err.code(), Some(&message), kind, name)
}

impl ObjectOperations for S3Objects {
    async fn get_object_text(&self, bucket: &str, key: &str) -> Result<String, ApiError> {
        let output = self
            .client
            .get_object()
            .bucket(bucket)
            .key(key)
            .send()
            .await
            .map_err(|e| classify_sdk_error(&e, ResourceKind::Object, key))?;

        let bytes = output
            .body
            .collect()
            .await
            .map_err(|e| ApiError::other(format!("Failed to read body of '{key}': {e}")))?
            .into_bytes();

        String::from_utf8(bytes.to_vec())
            .map_err(|e| ApiError::other(format!("Object '{key}' is not UTF-8 text: {e}")))
    }

    async fn put_object_text(&self, bucket: &str, key: &str, body: String) -> Result<(), ApiError> {
        self.client
            .put_object()
            .bucket(bucket)
            .key(key)
            .content_type("text/plain; charset=utf-8")
            .body(ByteStream::from(body.into_bytes()))
            .send()
            .await
            .map_err(|e| classify_sdk_error(&e, ResourceKind::Object, key))?;
        Ok(())
    }
}
