//! Load balancer attach orchestration
//!
//! [`CreateLbs::execute`] runs one attach request to completion:
//!
//! 1. skip when asked to and a load balancer is already attached
//! 2. reject missing, unknown or conflicting kinds
//! 3. ask the environment validator
//! 4. read certificate material
//! 5. record the request in state and checkpoint it
//! 6. apply, checkpointing the result or whatever partial state the failure
//!    left behind
//! 7. update the director's cloud config when there is a director
//!
//! Every failure is terminal for the invocation. Re-running the command is
//! the retry.

use crate::error::{ReconcileError, Result};
use crate::provider::{
    ApplyEngine, ApplyFailure, ConfigUpdater, EnvironmentValidator, PartialState,
};
use crate::state::{CertificateMaterial, LoadBalancerKind, State};
use crate::store::StateStore;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// An attach request
#[derive(Debug, Clone, Default)]
pub struct CreateLbsConfig {
    /// Requested kind as typed by the user
    pub lb_type: String,
    pub cert_path: PathBuf,
    pub key_path: PathBuf,
    pub chain_path: Option<PathBuf>,
    pub domain: Option<String>,
    pub skip_if_exists: bool,
}

/// How an attach request finished
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttachOutcome {
    Attached(LoadBalancerKind),
    /// Nothing was done; the recorded kind was already attached.
    Skipped(LoadBalancerKind),
}

impl fmt::Display for AttachOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AttachOutcome::Attached(kind) => write!(f, "attached {kind} load balancer"),
            AttachOutcome::Skipped(kind) => {
                write!(f, "lb type {:?} exists, skipping...", kind.as_str())
            }
        }
    }
}

/// Attaches load balancers to an environment
pub struct CreateLbs {
    state_store: Arc<dyn StateStore>,
    apply_engine: Arc<dyn ApplyEngine>,
    environment_validator: Arc<dyn EnvironmentValidator>,
    config_updater: Arc<dyn ConfigUpdater>,
}

impl CreateLbs {
    pub fn new(
        state_store: Arc<dyn StateStore>,
        apply_engine: Arc<dyn ApplyEngine>,
        environment_validator: Arc<dyn EnvironmentValidator>,
        config_updater: Arc<dyn ConfigUpdater>,
    ) -> Self {
        Self {
            state_store,
            apply_engine,
            environment_validator,
            config_updater,
        }
    }

    pub async fn execute(&self, config: &CreateLbsConfig, state: State) -> Result<AttachOutcome> {
        if config.skip_if_exists
            && let Some(existing) = state.lb.kind
        {
            tracing::info!(lb_type = %existing, "load balancer exists, skipping");
            return Ok(AttachOutcome::Skipped(existing));
        }

        let requested = check_fast_fails(&config.lb_type, &state)?;

        self.environment_validator
            .validate(&state)
            .await
            .map_err(ReconcileError::EnvironmentPrecondition)?;

        let material = read_material(config).await?;

        let mut state = state;
        state.lb.attach(requested, material, config.domain.clone());

        tracing::info!(lb_type = %requested, "checkpointing state before apply");
        self.state_store
            .set(&state)
            .await
            .map_err(ReconcileError::Persistence)?;

        tracing::info!(lb_type = %requested, "applying");
        let state = match self.apply_engine.apply(state).await {
            Ok(state) => state,
            Err(failure) => return Err(self.handle_apply_failure(failure).await),
        };

        self.state_store
            .set(&state)
            .await
            .map_err(ReconcileError::Persistence)?;

        if state.has_director() {
            tracing::info!("updating cloud config");
            self.config_updater
                .update(&state)
                .await
                .map_err(ReconcileError::PostApplyConfiguration)?;
        }

        Ok(AttachOutcome::Attached(requested))
    }

    /// Persist whatever the failed apply left behind and build the error to
    /// return. The apply error always comes first.
    async fn handle_apply_failure(&self, failure: ApplyFailure) -> ReconcileError {
        let (error, partial_state) = failure.into_parts();
        let apply_error = ReconcileError::Apply(error);

        match partial_state {
            PartialState::Unavailable => apply_error,
            PartialState::RetrievalFailed(retrieval) => {
                tracing::warn!("apply failed and its partial state could not be retrieved");
                ReconcileError::composite(
                    apply_error,
                    ReconcileError::PartialStateRetrieval(retrieval),
                )
            }
            PartialState::Recovered(partial) => {
                tracing::warn!("apply failed, checkpointing partial state");
                match self.state_store.set(&partial).await {
                    Ok(()) => apply_error,
                    Err(persist) => ReconcileError::composite(
                        apply_error,
                        ReconcileError::Persistence(persist),
                    ),
                }
            }
        }
    }
}

fn check_fast_fails(lb_type: &str, state: &State) -> Result<LoadBalancerKind> {
    if lb_type.is_empty() {
        return Err(ReconcileError::Validation(
            "--type is a required flag".to_string(),
        ));
    }

    let requested = lb_type
        .parse::<LoadBalancerKind>()
        .map_err(|e| ReconcileError::Validation(e.to_string()))?;

    state.lb.check_attach(requested)?;
    Ok(requested)
}

async fn read_material(config: &CreateLbsConfig) -> Result<CertificateMaterial> {
    let cert = read_file(&config.cert_path).await?;
    let key = read_file(&config.key_path).await?;
    let chain = match &config.chain_path {
        Some(path) => Some(read_file(path).await?),
        None => None,
    };

    Ok(CertificateMaterial { cert, key, chain })
}

async fn read_file(path: &Path) -> Result<String> {
    tokio::fs::read_to_string(path)
        .await
        .map_err(|source| {
            tracing::error!(path = %path.display(), "could not read certificate material");
            ReconcileError::InputMaterialization {
                path: path.to_path_buf(),
                source,
            }
        })
}
