//! Function deployment
//!
//! The function is created on first deploy and updated in place afterwards,
//! so redeploying new code never requires re-provisioning the buckets.

use anyhow::{Context, Result};
use bucket_notify_common::defaults::{
    DEFAULT_FUNCTION_HANDLER, DEFAULT_FUNCTION_RUNTIME, DEFAULT_FUNCTION_TIMEOUT_SECS,
};
use bucket_notify_common::{ApiError, FunctionDeployment, FunctionInfo, FunctionOperations, Settings};
use std::path::Path;
use tracing::info;

/// Whether the function was created or updated
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeployOutcome {
    Created(FunctionInfo),
    Updated(FunctionInfo),
}

impl DeployOutcome {
    pub fn info(&self) -> &FunctionInfo {
        match self {
            DeployOutcome::Created(info) | DeployOutcome::Updated(info) => info,
        }
    }
}

/// Build the deployment for the function named in `settings`
pub fn deployment_from_settings(settings: &Settings, package: Vec<u8>, role_arn: &str) -> FunctionDeployment {
    FunctionDeployment {
        name: settings.function_name.clone(),
        package,
        timeout_secs: DEFAULT_FUNCTION_TIMEOUT_SECS,
        environment: settings.function_environment.clone(),
        role_arn: role_arn.to_string(),
        runtime: DEFAULT_FUNCTION_RUNTIME.to_string(),
        handler: DEFAULT_FUNCTION_HANDLER.to_string(),
    }
}

/// Read a zipped deployment package from disk
pub async fn read_package(path: &Path) -> Result<Vec<u8>> {
    tokio::fs::read(path)
        .await
        .with_context(|| format!("Failed to read deployment package {}", path.display()))
}

/// Create the function, or update it if it already exists
#[tracing::instrument(skip_all, fields(function = %deployment.name))]
pub async fn deploy<F: FunctionOperations>(
    functions: &F,
    deployment: &FunctionDeployment,
) -> Result<DeployOutcome, ApiError> {
    match functions.create_function(deployment).await {
        Ok(info) => {
            info!(arn = %info.arn, "Created function");
            Ok(DeployOutcome::Created(info))
        }
        Err(ApiError::Conflict { .. }) => {
            let info = functions.update_function(deployment).await?;
            info!(arn = %info.arn, "Updated function");
            Ok(DeployOutcome::Updated(info))
        }
        Err(e) => Err(e),
    }
}
