//! bucket-notify-handler: Lambda entry point
//!
//! Reads `OUTPUT_BUCKET` once at cold start, then processes S3 object
//! notifications until the runtime shuts the process down.

use aws_config::BehaviorVersion;
use aws_lambda_events::event::s3::S3Event;
use bucket_notify_common::ObjectOperations;
use bucket_notify_handler::{HandlerConfig, S3Objects, process_event};
use lambda_runtime::{Error, LambdaEvent, run, service_fn};
use tracing::info;

#[tokio::main]
async fn main() -> Result<(), Error> {
    // CloudWatch adds its own timestamps and does not render colors
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .with_ansi(false)
        .without_time()
        .init();

    let config = HandlerConfig::from_env()?;
    info!(output_bucket = %config.output_bucket, "Starting bucket-notify-handler");

    let sdk_config = aws_config::defaults(BehaviorVersion::latest()).load().await;
    let objects = S3Objects::from_config(&sdk_config);

    run(service_fn(|event: LambdaEvent<S3Event>| {
        function_handler(&objects, &config, event)
    }))
    .await
}

async fn function_handler<O: ObjectOperations>(
    objects: &O,
    config: &HandlerConfig,
    event: LambdaEvent<S3Event>,
) -> Result<(), Error> {
    info!(request_id = %event.context.request_id, "Received S3 event");
    process_event(objects, config, &event.payload).await?;
    Ok(())
}
