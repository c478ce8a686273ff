//! Apply engine backed by terraform

use crate::error::{Result, TerraformError};
use crate::executor::Terraform;
use async_trait::async_trait;
use bootflow_cloud::{ApplyEngine, ApplyFailure, InputGenerator, Inputs, State};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::fs;

pub const VARS_FILE: &str = "terraform.tfvars.json";
pub const STATE_FILE: &str = "terraform.tfstate";

/// Reconciles infrastructure by running terraform against a template
/// directory
///
/// Every run copies the `*.tf` templates into the working directory, writes
/// the generated inputs next to them together with the recorded terraform
/// state, then runs `init` and `apply` there.
pub struct TerraformManager {
    terraform: Terraform,
    input_generator: Box<dyn InputGenerator>,
    template_dir: PathBuf,
    work_dir: PathBuf,
}

impl TerraformManager {
    pub fn new(
        terraform: Terraform,
        input_generator: impl InputGenerator + 'static,
        template_dir: impl Into<PathBuf>,
        work_dir: impl Into<PathBuf>,
    ) -> Self {
        Self {
            terraform,
            input_generator: Box::new(input_generator),
            template_dir: template_dir.into(),
            work_dir: work_dir.into(),
        }
    }

    pub fn work_dir(&self) -> &Path {
        &self.work_dir
    }

    fn state_path(&self) -> PathBuf {
        self.work_dir.join(STATE_FILE)
    }

    /// Lay out templates, inputs and the current state in the working
    /// directory.
    async fn prepare(&self, state: &State, inputs: &Inputs) -> Result<()> {
        fs::create_dir_all(&self.work_dir).await?;

        let copied = self.copy_templates().await?;
        tracing::debug!(count = copied, "copied terraform templates");

        let vars = serde_json::to_string_pretty(inputs)?;
        fs::write(self.work_dir.join(VARS_FILE), vars).await?;

        let state_path = self.state_path();
        if state.tf_state.is_empty() {
            if state_path.exists() {
                fs::remove_file(&state_path).await?;
            }
        } else {
            fs::write(&state_path, &state.tf_state).await?;
        }

        Ok(())
    }

    async fn copy_templates(&self) -> Result<usize> {
        let mut entries = fs::read_dir(&self.template_dir).await.map_err(|e| match e.kind() {
            ErrorKind::NotFound => TerraformError::TemplatesNotFound(self.template_dir.clone()),
            _ => TerraformError::Io(e),
        })?;

        let mut copied = 0;
        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            if path.extension().is_some_and(|ext| ext == "tf") {
                fs::copy(&path, self.work_dir.join(entry.file_name())).await?;
                copied += 1;
            }
        }

        if copied == 0 {
            return Err(TerraformError::TemplatesNotFound(self.template_dir.clone()));
        }
        Ok(copied)
    }

    /// Current contents of the working state file. `None` when terraform
    /// never wrote one.
    async fn read_state(&self) -> Result<Option<String>> {
        let path = self.state_path();
        match fs::read_to_string(&path).await {
            Ok(content) => Ok(Some(content)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(source) => Err(TerraformError::StateUnreadable { path, source }),
        }
    }

    /// Attach whatever state the failed run left behind. Without a state
    /// file the recorded terraform state stands.
    async fn recover(&self, state: State, error: TerraformError) -> ApplyFailure {
        let failure = ApplyFailure::new(error);
        match self.read_state().await {
            Ok(Some(tf_state)) => failure.with_partial_state(State { tf_state, ..state }),
            Ok(None) => failure.with_partial_state(state),
            Err(err) => {
                tracing::warn!("could not read terraform state after failed run: {}", err);
                failure.with_retrieval_failure(err)
            }
        }
    }

    /// Collect state and outputs once `apply` has succeeded.
    async fn finish(&self, state: &State) -> Result<State> {
        let tf_state = self
            .read_state()
            .await?
            .unwrap_or_else(|| state.tf_state.clone());
        let outputs = self.terraform.outputs(&self.work_dir).await?;

        Ok(State {
            tf_state,
            network: outputs.network_facts(),
            ..state.clone()
        })
    }
}

#[async_trait]
impl ApplyEngine for TerraformManager {
    async fn apply(&self, state: State) -> std::result::Result<State, ApplyFailure> {
        let inputs = self
            .input_generator
            .generate(&state)
            .map_err(ApplyFailure::new)?;

        self.prepare(&state, &inputs)
            .await
            .map_err(ApplyFailure::new)?;

        tracing::info!(dir = %self.work_dir.display(), "terraform init");
        self.terraform
            .init(&self.work_dir)
            .await
            .map_err(ApplyFailure::new)?;

        tracing::info!(dir = %self.work_dir.display(), "terraform apply");
        if let Err(err) = self.terraform.apply(&self.work_dir).await {
            tracing::warn!("terraform apply failed: {}", err);
            return Err(self.recover(state, err).await);
        }

        match self.finish(&state).await {
            Ok(state) => Ok(state),
            Err(err) => {
                // apply succeeded, so the work dir holds the newest tfstate
                tracing::warn!("reading terraform results failed: {}", err);
                Err(self.recover(state, err).await)
            }
        }
    }
}
