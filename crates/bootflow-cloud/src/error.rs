//! Reconciliation error types

use std::path::PathBuf;
use thiserror::Error;

/// Error returned by an external collaborator (state store, apply engine,
/// validator, config updater, input generator).
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Result returned by external collaborators.
pub type ExternalResult<T> = std::result::Result<T, BoxError>;

/// Errors surfaced by the reconciliation core
#[derive(Error, Debug)]
pub enum ReconcileError {
    /// Missing, invalid or conflicting configuration. Nothing was persisted.
    #[error("{0}")]
    Validation(String),

    /// The environment validator rejected the operation.
    #[error("{0}")]
    EnvironmentPrecondition(#[source] BoxError),

    /// Certificate material could not be read. Displays the I/O error as is.
    #[error("{source}")]
    InputMaterialization {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The apply engine failed. The wrapped error is the engine's own.
    #[error("{0}")]
    Apply(#[source] BoxError),

    /// A failed apply could not report its partial state.
    #[error("{0}")]
    PartialStateRetrieval(#[source] BoxError),

    /// The state store rejected a write.
    #[error("{0}")]
    Persistence(#[source] BoxError),

    /// The director configuration update failed after a successful apply.
    #[error("{0}")]
    PostApplyConfiguration(#[source] BoxError),

    #[error("invalid iaas: {0:?}")]
    UnsupportedProvider(String),

    #[error(transparent)]
    Composite(#[from] CompositeError),
}

impl ReconcileError {
    /// Combine two failures, keeping both as typed values.
    pub fn composite(primary: ReconcileError, secondary: ReconcileError) -> Self {
        ReconcileError::Composite(CompositeError {
            primary: Box::new(primary),
            secondary: Box::new(secondary),
        })
    }

    /// Walks the boxed collaborator error for variants that carry one.
    pub fn external(&self) -> Option<&(dyn std::error::Error + Send + Sync + 'static)> {
        match self {
            ReconcileError::EnvironmentPrecondition(e)
            | ReconcileError::Apply(e)
            | ReconcileError::PartialStateRetrieval(e)
            | ReconcileError::Persistence(e)
            | ReconcileError::PostApplyConfiguration(e) => Some(e.as_ref()),
            _ => None,
        }
    }
}

/// Two failures reported together, primary first.
#[derive(Error, Debug)]
#[error("the following errors occurred:\n{primary},\n{secondary}")]
pub struct CompositeError {
    primary: Box<ReconcileError>,
    secondary: Box<ReconcileError>,
}

impl CompositeError {
    pub fn primary(&self) -> &ReconcileError {
        &self.primary
    }

    pub fn secondary(&self) -> &ReconcileError {
        &self.secondary
    }

    pub fn into_parts(self) -> (ReconcileError, ReconcileError) {
        (*self.primary, *self.secondary)
    }
}

/// State file errors
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("state file version {found} is newer than supported version {supported}")]
    VersionTooNew { found: u32, supported: u32 },

    #[error("refusing to replace environment id {current:?} with {requested:?}")]
    EnvIdChanged { current: String, requested: String },

    #[error("refusing to change iaas of a provisioned environment from {current:?} to {requested:?}")]
    IaasChanged { current: String, requested: String },

    #[error("state directory is in use by {holder} since {since}; remove lock.json if that process is gone")]
    Locked { holder: String, since: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, ReconcileError>;
