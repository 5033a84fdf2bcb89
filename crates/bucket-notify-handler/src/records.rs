//! Extraction of notifications from S3 events

use crate::error::HandlerError;
use crate::key::decode_key;
use aws_lambda_events::event::s3::{S3Event, S3EventRecord};
use bucket_notify_common::defaults::OBJECT_CREATED_PUT;

/// The part of an event record the handler needs
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    /// Bucket that sent the notification
    pub bucket: String,
    /// Decoded object key
    pub key: String,
}

/// Whether a record announces a newly put object.
///
/// Other event kinds are ignored so new kinds can be added to the bucket
/// configuration without breaking the function.
pub fn is_object_created(record: &S3EventRecord) -> bool {
    record.event_name.as_deref() == Some(OBJECT_CREATED_PUT)
}

/// Convert a record into a notification with a decoded key
pub fn notification_from_record(
    index: usize,
    record: &S3EventRecord,
) -> Result<Notification, HandlerError> {
    let bucket = record
        .s3
        .bucket
        .name
        .clone()
        .filter(|b| !b.is_empty())
        .ok_or(HandlerError::MalformedRecord {
            index,
            field: "bucket name",
        })?;
    let raw_key = record
        .s3
        .object
        .key
        .as_deref()
        .filter(|k| !k.is_empty())
        .ok_or(HandlerError::MalformedRecord {
            index,
            field: "object key",
        })?;
    Ok(Notification {
        bucket,
        key: decode_key(raw_key)?,
    })
}

/// Build an `ObjectCreated:Put` event for one object.
///
/// The record resembles what S3 delivers, trimmed to fixed example values
/// for everything the handler ignores. Used by the local test invocation.
pub fn object_created_event(bucket: &str, key: &str) -> Result<S3Event, serde_json::Error> {
    let encoded_key = urlencoding::encode(key).replace("%20", "+");
    serde_json::from_value(serde_json::json!({
        "Records": [{
            "eventVersion": "2.1",
            "eventSource": "aws:s3",
            "awsRegion": "us-east-1",
            "eventTime": "1970-01-01T00:00:00.000Z",
            "eventName": OBJECT_CREATED_PUT,
            "userIdentity": { "principalId": "EXAMPLE" },
            "requestParameters": { "sourceIPAddress": "127.0.0.1" },
            "responseElements": {
                "x-amz-request-id": "EXAMPLE123456789",
                "x-amz-id-2": "EXAMPLE123/5678abcdefghijklambdaisawesome/mnopqrstuvwxyzABCDEFGH"
            },
            "s3": {
                "s3SchemaVersion": "1.0",
                "configurationId": "bucket-notify",
                "bucket": {
                    "name": bucket,
                    "ownerIdentity": { "principalId": "EXAMPLE" },
                    "arn": format!("arn:aws:s3:::{bucket}")
                },
                "object": {
                    "key": encoded_key,
                    "size": 0,
                    "eTag": "0123456789abcdef0123456789abcdef",
                    "sequencer": "0A1B2C3D4E5F678901"
                }
            }
        }]
    }))
}
