//! Lambda function management

use crate::aws::context::AwsContext;
use crate::aws::classify_sdk_error;
use aws_sdk_lambda::Client;
use aws_sdk_lambda::primitives::Blob;
use aws_sdk_lambda::types::{Environment, FunctionCode, LastUpdateStatus, Runtime};
use bucket_notify_common::{
    ApiError, FunctionDeployment, FunctionInfo, FunctionOperations, ResourceKind,
};
use std::collections::HashMap;
use std::time::Duration;
use tracing::{debug, info};

/// Service principal S3 uses to invoke notification targets
const S3_PRINCIPAL: &str = "s3.amazonaws.com";

/// How long to wait between update status checks
const UPDATE_POLL_INTERVAL: Duration = Duration::from_secs(2);

/// Maximum status checks before giving up on a code update
const UPDATE_POLL_ATTEMPTS: u32 = 60;

/// Lambda client for the demo's function
pub struct LambdaClient {
    client: Client,
}

impl LambdaClient {
    /// Create a Lambda client from a pre-loaded AWS context
    pub fn from_context(ctx: &AwsContext) -> Self {
        Self {
            client: ctx.lambda_client(),
        }
    }

    /// Allow S3 to invoke `function` for events from `bucket`.
    ///
    /// Returns `false` if the statement was already present.
    pub async fn add_s3_invoke_permission(
        &self,
        function: &str,
        bucket: &str,
    ) -> Result<bool, ApiError> {
        let statement_id = format!("bucket-notify-{bucket}");
        let result = self
            .client
            .add_permission()
            .function_name(function)
            .statement_id(&statement_id)
            .action("lambda:InvokeFunction")
            .principal(S3_PRINCIPAL)
            .source_arn(format!("arn:aws:s3:::{bucket}"))
            .send()
            .await
            .map_err(|e| classify_sdk_error(&e, ResourceKind::Function, function));

        match result {
            Ok(_) => {
                info!(function = %function, bucket = %bucket, "Granted S3 invoke permission");
                Ok(true)
            }
            Err(ApiError::Conflict { .. }) => {
                debug!(function = %function, statement_id = %statement_id, "Invoke permission already present");
                Ok(false)
            }
            Err(e) => Err(e),
        }
    }

    /// Wait for an in-flight code update to settle before touching configuration
    async fn wait_for_update(&self, name: &str) -> Result<(), ApiError> {
        for attempt in 1..=UPDATE_POLL_ATTEMPTS {
            let config = self
                .client
                .get_function_configuration()
                .function_name(name)
                .send()
                .await
                .map_err(|e| classify_sdk_error(&e, ResourceKind::Function, name))?;

            match config.last_update_status() {
                Some(LastUpdateStatus::InProgress) => {
                    debug!(function = %name, attempt, "Function update in progress");
                    tokio::time::sleep(UPDATE_POLL_INTERVAL).await;
                }
                Some(LastUpdateStatus::Failed) => {
                    return Err(ApiError::other(format!(
                        "Update of function '{name}' failed: {}",
                        config.last_update_status_reason().unwrap_or("no reason given")
                    )));
                }
                _ => return Ok(()),
            }
        }
        Err(ApiError::other(format!(
            "Function '{name}' still updating after {UPDATE_POLL_ATTEMPTS} checks"
        )))
    }
}

fn environment(deployment: &FunctionDeployment) -> Environment {
    let variables: HashMap<String, String> = deployment
        .environment
        .iter()
        .map(|(k, v)| (k.clone(), v.clone()))
        .collect();
    Environment::builder().set_variables(Some(variables)).build()
}

fn function_info(name: &str, arn: Option<&str>) -> Result<FunctionInfo, ApiError> {
    let arn = arn.ok_or_else(|| ApiError::other(format!("No ARN returned for function '{name}'")))?;
    Ok(FunctionInfo {
        name: name.to_string(),
        arn: arn.to_string(),
    })
}

impl FunctionOperations for LambdaClient {
    async fn read_function(&self, name: &str) -> Result<FunctionInfo, ApiError> {
        let output = self
            .client
            .get_function()
            .function_name(name)
            .send()
            .await
            .map_err(|e| classify_sdk_error(&e, ResourceKind::Function, name))?;

        function_info(name, output.configuration().and_then(|c| c.function_arn()))
    }

    async fn create_function(&self, deployment: &FunctionDeployment) -> Result<FunctionInfo, ApiError> {
        let name = deployment.name.as_str();
        info!(function = %name, size = deployment.package.len(), "Creating function");

        let output = self
            .client
            .create_function()
            .function_name(name)
            .role(&deployment.role_arn)
            .runtime(Runtime::from(deployment.runtime.as_str()))
            .handler(&deployment.handler)
            .timeout(deployment.timeout_secs)
            .environment(environment(deployment))
            .code(
                FunctionCode::builder()
                    .zip_file(Blob::new(deployment.package.clone()))
                    .build(),
            )
            .send()
            .await
            .map_err(|e| classify_sdk_error(&e, ResourceKind::Function, name))?;

        function_info(name, output.function_arn())
    }

    async fn update_function(&self, deployment: &FunctionDeployment) -> Result<FunctionInfo, ApiError> {
        let name = deployment.name.as_str();
        info!(function = %name, size = deployment.package.len(), "Updating function code");

        self.client
            .update_function_code()
            .function_name(name)
            .zip_file(Blob::new(deployment.package.clone()))
            .send()
            .await
            .map_err(|e| classify_sdk_error(&e, ResourceKind::Function, name))?;

        self.wait_for_update(name).await?;

        info!(function = %name, "Updating function configuration");
        let output = self
            .client
            .update_function_configuration()
            .function_name(name)
            .role(&deployment.role_arn)
            .runtime(Runtime::from(deployment.runtime.as_str()))
            .handler(&deployment.handler)
            .timeout(deployment.timeout_secs)
            .environment(environment(deployment))
            .send()
            .await
            .map_err(|e| classify_sdk_error(&e, ResourceKind::Function, name))?;

        function_info(name, output.function_arn())
    }

    async fn delete_function(&self, name: &str) -> Result<(), ApiError> {
        info!(function = %name, "Deleting function");
        self.client
            .delete_function()
            .function_name(name)
            .send()
            .await
            .map_err(|e| classify_sdk_error(&e, ResourceKind::Function, name))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    #[test]
    fn environment_carries_every_variable() {
        let deployment = FunctionDeployment {
            name: "f".to_string(),
            package: Vec::new(),
            timeout_secs: 900,
            environment: BTreeMap::from([("OUTPUT_BUCKET".to_string(), "out".to_string())]),
            role_arn: "arn:aws:iam::123456789012:role/r".to_string(),
            runtime: "provided.al2023".to_string(),
            handler: "bootstrap".to_string(),
        };

        let env = environment(&deployment);
        let vars = env.variables().unwrap();
        assert_eq!(vars.len(), 1);
        assert_eq!(vars.get("OUTPUT_BUCKET").map(String::as_str), Some("out"));
    }

    #[test]
    fn missing_arn_is_an_error() {
        assert!(function_info("f", None).is_err());
        assert_eq!(function_info("f", Some("arn")).unwrap().arn, "arn");
    }

    #[test]
    fn lambda_errors_share_the_classifier() {
        use aws_sdk_lambda::error::ErrorMetadata;
        use aws_sdk_lambda::operation::add_permission::AddPermissionError;

        let err = AddPermissionError::generic(
            ErrorMetadata::builder()
                .code("ResourceConflictException")
                .message("The statement id provided already exists.")
                .build(),
        );
        assert!(classify_sdk_error(&err, ResourceKind::Function, "f").is_conflict());
    }
}
