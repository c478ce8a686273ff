mod cloud_config;
mod commands;
mod validator;

use clap::{Parser, Subcommand};
use colored::Colorize;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "bootflow")]
#[command(about = "Infrastructure for BOSH environments, reconciled", long_about = None)]
struct Cli {
    /// State directory (default: BOOTFLOW_STATE_DIR, then the current directory)
    #[arg(long, global = true)]
    state_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Attach a load balancer to the environment
    CreateLbs {
        /// Load balancer type (concourse, cf)
        #[arg(long = "type", default_value = "")]
        lb_type: String,
        /// Path to the SSL certificate
        #[arg(long)]
        cert: PathBuf,
        /// Path to the SSL certificate private key
        #[arg(long)]
        key: PathBuf,
        /// Path to the SSL certificate chain
        #[arg(long)]
        chain: Option<PathBuf>,
        /// System domain (cf only)
        #[arg(long)]
        domain: Option<String>,
        /// Do nothing if a load balancer is already attached
        #[arg(long)]
        skip_if_exists: bool,
        /// Directory holding the terraform templates
        #[arg(long, env = "BOOTFLOW_TERRAFORM_DIR")]
        terraform_dir: Option<PathBuf>,
    },
    /// Print the CloudFormation template for the environment
    Template {
        /// Load balancer type (concourse, cf)
        #[arg(long = "type", default_value = "")]
        lb_type: String,
        /// Availability zones, comma separated
        #[arg(long, value_delimiter = ',', required = true)]
        azs: Vec<String>,
        /// ARN of the uploaded SSL certificate
        #[arg(long, default_value = "")]
        cert_arn: String,
    },
    /// Show version information
    Version,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Logs go to stderr; stdout carries command output
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    if matches!(cli.command, Commands::Version) {
        println!("bootflow {}", env!("CARGO_PKG_VERSION"));
        return Ok(());
    }

    let state_dir = bootflow_config::resolve_state_dir(cli.state_dir.as_deref())?;

    let result = match cli.command {
        Commands::CreateLbs {
            lb_type,
            cert,
            key,
            chain,
            domain,
            skip_if_exists,
            terraform_dir,
        } => {
            let args = commands::create_lbs::CreateLbsArgs {
                lb_type,
                cert,
                key,
                chain,
                domain,
                skip_if_exists,
                terraform_dir,
            };
            commands::create_lbs::handle(&state_dir, args).await
        }
        Commands::Template {
            lb_type,
            azs,
            cert_arn,
        } => commands::template::handle(&state_dir, &lb_type, azs, cert_arn).await,
        Commands::Version => {
            unreachable!("Version is handled before state directory resolution");
        }
    };

    if let Err(e) = result {
        eprintln!("{}", e.to_string().red());
        std::process::exit(1);
    }

    Ok(())
}
