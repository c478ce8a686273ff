use crate::cloud_config::BoshCloudConfigUpdater;
use crate::validator::StateValidator;
use bootflow_cloud::{
    AttachOutcome, CreateLbs, CreateLbsConfig, FileStateStore, InputDispatcher, ReconcileError,
    StoreError,
};
use bootflow_cloud_aws::AwsInputGenerator;
use bootflow_cloud_azure::AzureInputGenerator;
use bootflow_cloud_gcp::GcpInputGenerator;
use bootflow_config::Paths;
use bootflow_terraform::{Terraform, TerraformManager};
use colored::Colorize;
use std::path::{Path, PathBuf};
use std::sync::Arc;

pub struct CreateLbsArgs {
    pub lb_type: String,
    pub cert: PathBuf,
    pub key: PathBuf,
    pub chain: Option<PathBuf>,
    pub domain: Option<String>,
    pub skip_if_exists: bool,
    pub terraform_dir: Option<PathBuf>,
}

pub async fn handle(state_dir: &Path, args: CreateLbsArgs) -> anyhow::Result<()> {
    let paths = Paths::new(state_dir);
    let store = Arc::new(FileStateStore::new(state_dir));

    let lock = store.acquire_lock("create-lbs").await?;
    let state = store.load().await?;

    let dispatcher = InputDispatcher::new(
        AwsInputGenerator::new(),
        GcpInputGenerator::new(),
        AzureInputGenerator::new(),
    );
    let template_dir = args
        .terraform_dir
        .unwrap_or_else(|| paths.terraform_templates_dir());
    let engine = TerraformManager::new(
        Terraform::new(bootflow_config::terraform_binary()),
        dispatcher,
        template_dir,
        paths.terraform_work_dir(),
    );
    let updater =
        BoshCloudConfigUpdater::new(bootflow_config::bosh_binary(), paths.cloud_config_dir());

    let command = CreateLbs::new(
        store.clone(),
        Arc::new(engine),
        Arc::new(StateValidator),
        Arc::new(updater),
    );

    let config = CreateLbsConfig {
        lb_type: args.lb_type,
        cert_path: args.cert,
        key_path: args.key,
        chain_path: args.chain,
        domain: args.domain,
        skip_if_exists: args.skip_if_exists,
    };

    let result = command.execute(&config, state).await;
    let outcome = settle(result, lock.release().await)?;
    match outcome {
        AttachOutcome::Skipped(_) => {
            println!("{}", outcome.to_string().yellow());
        }
        AttachOutcome::Attached(kind) => {
            println!();
            println!(
                "{}",
                format!("✓ {} load balancer attached", kind).green().bold()
            );
        }
    }

    Ok(())
}

/// The attach result wins over a failed lock release.
fn settle(
    result: Result<AttachOutcome, ReconcileError>,
    released: Result<(), StoreError>,
) -> anyhow::Result<AttachOutcome> {
    match (result, released) {
        (Ok(outcome), released) => {
            released?;
            Ok(outcome)
        }
        (Err(err), Ok(())) => Err(err.into()),
        (Err(err), Err(lock_err)) => {
            tracing::warn!("failed to release state lock: {}", lock_err);
            Err(err.into())
        }
    }
}
