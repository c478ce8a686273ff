//! terraform CLI wrapper

use crate::error::{Result, TerraformError};
use crate::outputs::TerraformOutputs;
use std::io::ErrorKind;
use std::path::Path;
use std::process::Stdio;
use tokio::process::Command;

/// Runs terraform commands inside a working directory
#[derive(Debug, Clone)]
pub struct Terraform {
    binary: String,
}

impl Terraform {
    pub fn new(binary: impl Into<String>) -> Self {
        Self {
            binary: binary.into(),
        }
    }

    pub fn binary(&self) -> &str {
        &self.binary
    }

    pub async fn init(&self, dir: &Path) -> Result<()> {
        self.run_command(dir, &["init", "-input=false", "-no-color"])
            .await?;
        Ok(())
    }

    pub async fn apply(&self, dir: &Path) -> Result<()> {
        self.run_command(dir, &["apply", "-auto-approve", "-input=false", "-no-color"])
            .await?;
        Ok(())
    }

    pub async fn outputs(&self, dir: &Path) -> Result<TerraformOutputs> {
        let output = self.run_command(dir, &["output", "-json"]).await?;
        TerraformOutputs::from_json(&output)
    }

    /// Run a terraform command and return stdout
    async fn run_command(&self, dir: &Path, args: &[&str]) -> Result<String> {
        let mut cmd = Command::new(&self.binary);
        cmd.args(args);
        cmd.current_dir(dir);
        cmd.stdout(Stdio::piped());
        cmd.stderr(Stdio::piped());

        tracing::debug!("Running: {} {} in {}", self.binary, args.join(" "), dir.display());

        let output = cmd.output().await.map_err(|e| match e.kind() {
            ErrorKind::NotFound => TerraformError::BinaryNotFound(self.binary.clone()),
            _ => TerraformError::Io(e),
        })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(TerraformError::CommandFailed {
                command: args.first().copied().unwrap_or_default().to_string(),
                stderr: stderr.trim().to_string(),
            });
        }

        Ok(String::from_utf8_lossy(&output.stdout).to_string())
    }
}
