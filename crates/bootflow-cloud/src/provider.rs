//! External collaborator contracts
//!
//! The orchestrator drives provisioning through these traits. Implementations
//! live in other crates (the terraform adapter, the CLI's validator and
//! cloud-config updater) or in test fakes.

use crate::error::{BoxError, ExternalResult};
use crate::state::State;
use async_trait::async_trait;
use std::fmt;

/// Plan/apply engine that reconciles real infrastructure toward a state
#[async_trait]
pub trait ApplyEngine: Send + Sync {
    /// Returns the refreshed state on success.
    async fn apply(&self, state: State) -> Result<State, ApplyFailure>;
}

/// Rejects operations on environments that fail environment-level checks
#[async_trait]
pub trait EnvironmentValidator: Send + Sync {
    async fn validate(&self, state: &State) -> ExternalResult<()>;
}

/// Pushes post-apply configuration to the director
#[async_trait]
pub trait ConfigUpdater: Send + Sync {
    async fn update(&self, state: &State) -> ExternalResult<()>;
}

/// Best-known state left behind by a failed apply
#[derive(Debug)]
pub enum PartialState {
    /// The engine offers no partial state for this failure.
    Unavailable,
    /// The engine recovered the state it reached before failing.
    Recovered(State),
    /// The engine tried to recover its state and could not.
    RetrievalFailed(BoxError),
}

/// A failed apply and whatever state it managed to produce
#[derive(Debug)]
pub struct ApplyFailure {
    error: BoxError,
    partial_state: PartialState,
}

impl ApplyFailure {
    /// A failure without recoverable state.
    pub fn new(error: impl Into<BoxError>) -> Self {
        Self {
            error: error.into(),
            partial_state: PartialState::Unavailable,
        }
    }

    pub fn with_partial_state(mut self, state: State) -> Self {
        self.partial_state = PartialState::Recovered(state);
        self
    }

    pub fn with_retrieval_failure(mut self, error: impl Into<BoxError>) -> Self {
        self.partial_state = PartialState::RetrievalFailed(error.into());
        self
    }

    pub fn error(&self) -> &BoxError {
        &self.error
    }

    pub fn partial_state(&self) -> &PartialState {
        &self.partial_state
    }

    pub fn into_parts(self) -> (BoxError, PartialState) {
        (self.error, self.partial_state)
    }
}

impl fmt::Display for ApplyFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.error, f)
    }
}

impl std::error::Error for ApplyFailure {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.error.source()
    }
}
