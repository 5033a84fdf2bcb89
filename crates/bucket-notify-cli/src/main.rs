//! bucket-notify: operator CLI for the bucket notification demo
//!
//! Provisions an input and an output bucket, deploys the handler function,
//! wires the input bucket's notifications to it, and tears it all down.

use anyhow::{Result, bail};
use bucket_notify_cli::aws::{AwsContext, LambdaClient, S3Client};
use bucket_notify_cli::config::{DeployConfig, GlobalConfig};
use bucket_notify_cli::deploy::{DeployOutcome, deploy, deployment_from_settings, read_package};
use bucket_notify_cli::local::invoke_local;
use bucket_notify_cli::provision::{BaseNames, provision};
use bucket_notify_cli::registrar::register_notification;
use bucket_notify_cli::teardown::teardown;
use bucket_notify_common::FunctionOperations;
use bucket_notify_common::defaults::{DEFAULT_LOCAL_KEY, DEFAULT_REGION, DEFAULT_SETTINGS_PATH};
use bucket_notify_handler::S3Objects;
use clap::{Parser, Subcommand};
use rand::SeedableRng;
use rand::rngs::StdRng;
use std::path::PathBuf;
use tracing::info;

#[derive(Parser, Debug)]
#[command(name = "bucket-notify")]
#[command(about = "Wire an S3 bucket to a Lambda function that uppercases new objects")]
#[command(version)]
struct Args {
    /// AWS region
    #[arg(long, global = true, env = "AWS_REGION", default_value = DEFAULT_REGION)]
    region: String,

    /// Settings file written by `setup`
    #[arg(long, global = true, env = "BUCKET_NOTIFY_SETTINGS", default_value = DEFAULT_SETTINGS_PATH)]
    settings: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Pick unique names, create both buckets, and write the settings file
    Setup,

    /// Create or update the handler function
    Deploy {
        /// Zipped handler package (a `bootstrap` binary at the archive root)
        #[arg(long)]
        package: PathBuf,

        /// Execution role ARN for the function
        #[arg(long, env = "BUCKET_NOTIFY_ROLE_ARN")]
        role_arn: String,
    },

    /// Register the function for uploads to the input bucket
    Notification,

    /// Run the handler in-process against an object already in the input bucket
    Local {
        /// Object key in the input bucket
        #[arg(long, default_value = DEFAULT_LOCAL_KEY)]
        key: String,
    },

    /// Delete both buckets (with contents) and the function
    Clean,
}

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        print_error(&e);
        std::process::exit(1);
    }
}

/// Print error in a user-friendly way
fn print_error(e: &anyhow::Error) {
    use std::io::Write;

    let mut stderr = std::io::stderr();

    // Print main error message
    let _ = writeln!(stderr, "\n\x1b[1;31mError:\x1b[0m {e}");

    // Print error chain (causes)
    let mut source = e.source();
    while let Some(cause) = source {
        let _ = writeln!(stderr, "  \x1b[33mCaused by:\x1b[0m {cause}");
        source = cause.source();
    }

    // Only print backtrace hint if not already showing
    if std::env::var("RUST_BACKTRACE").is_err() {
        let _ = writeln!(
            stderr,
            "\n\x1b[2mSet RUST_BACKTRACE=1 for a detailed backtrace\x1b[0m"
        );
    } else {
        // Print backtrace if available and requested
        let backtrace = e.backtrace();
        if backtrace.status() == std::backtrace::BacktraceStatus::Captured {
            let _ = writeln!(stderr, "\n\x1b[2mBacktrace:\x1b[0m\n{backtrace}");
        }
    }
}

async fn run() -> Result<()> {
    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    let config = GlobalConfig {
        region: args.region,
        settings_path: args.settings,
    };

    match args.command {
        Command::Setup => handle_setup(&config).await,
        Command::Deploy { package, role_arn } => {
            handle_deploy(&config, &DeployConfig { package, role_arn }).await
        }
        Command::Notification => handle_notification(&config).await,
        Command::Local { key } => handle_local(&config, &key).await,
        Command::Clean => handle_clean(&config).await,
    }
}

/// Handle the setup command
async fn handle_setup(config: &GlobalConfig) -> Result<()> {
    let aws = AwsContext::new(&config.region).await;
    let s3 = S3Client::from_context(&aws);
    let lambda = LambdaClient::from_context(&aws);
    let mut rng = StdRng::from_entropy();

    let settings = provision(&s3, &lambda, &BaseNames::default(), &mut rng).await?;
    config.save_settings(&settings)?;

    info!(path = %config.settings_path.display(), "Wrote settings");
    println!("Input bucket:  {}", settings.input_bucket_name);
    println!("Output bucket: {}", settings.output_bucket_name);
    println!("Function:      {}", settings.function_name);
    Ok(())
}

/// Handle the deploy command
async fn handle_deploy(config: &GlobalConfig, deploy_config: &DeployConfig) -> Result<()> {
    let settings = config.load_settings()?;
    let package = read_package(&deploy_config.package).await?;

    let aws = AwsContext::new(&config.region).await;
    let lambda = LambdaClient::from_context(&aws);

    let deployment = deployment_from_settings(&settings, package, &deploy_config.role_arn);
    match deploy(&lambda, &deployment).await? {
        DeployOutcome::Created(info) => println!("Created {}", info.arn),
        DeployOutcome::Updated(info) => println!("Updated {}", info.arn),
    }
    Ok(())
}

/// Handle the notification command
async fn handle_notification(config: &GlobalConfig) -> Result<()> {
    let settings = config.load_settings()?;

    let aws = AwsContext::new(&config.region).await;
    let s3 = S3Client::from_context(&aws);
    let lambda = LambdaClient::from_context(&aws);

    // S3 rejects the configuration unless it can invoke the target
    let function = lambda.read_function(&settings.function_name).await?;
    lambda
        .add_s3_invoke_permission(&function.name, &settings.input_bucket_name)
        .await?;

    let outcome = register_notification(&s3, &settings.input_bucket_name, &function.arn).await?;
    println!(
        "{} -> {}: {outcome}",
        settings.input_bucket_name, settings.function_name
    );
    Ok(())
}

/// Handle the local command
async fn handle_local(config: &GlobalConfig, key: &str) -> Result<()> {
    let settings = config.load_settings()?;

    let aws = AwsContext::new(&config.region).await;
    let objects = S3Objects::from_config(aws.sdk_config());

    let summary = invoke_local(&objects, &settings, key).await?;
    println!(
        "written: {}, skipped: {}, ignored: {}",
        summary.written, summary.skipped, summary.ignored
    );
    Ok(())
}

/// Handle the clean command
async fn handle_clean(config: &GlobalConfig) -> Result<()> {
    let settings = config.load_settings()?;

    let aws = AwsContext::new(&config.region).await;
    let s3 = S3Client::from_context(&aws);
    let lambda = LambdaClient::from_context(&aws);

    let report = teardown(&s3, &lambda, &settings).await;

    println!("{:<10} {:<50} {:<16}", "TYPE", "NAME", "RESULT");
    println!("{}", "-".repeat(76));
    for entry in &report.entries {
        println!("{:<10} {:<50} {:<16}", entry.kind.as_str(), entry.name, entry.result.as_str());
    }

    if !report.is_success() {
        bail!("{} of {} resources could not be deleted", report.failed(), report.entries.len());
    }
    Ok(())
}
