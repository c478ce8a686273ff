//! Provider input generation
//!
//! The plan/apply engine is driven by a flat set of string inputs derived
//! from the state. Each IaaS has its own [`InputGenerator`]; the
//! [`InputDispatcher`] holds one per [`IaasKind`] and forwards to the one the
//! state names.

use crate::error::ExternalResult;
use crate::state::{IaasKind, State};
use std::collections::BTreeMap;
use std::sync::Arc;

/// Input name -> value
pub type Inputs = BTreeMap<String, String>;

/// Derives apply-engine inputs from a state snapshot
pub trait InputGenerator: Send + Sync {
    fn generate(&self, state: &State) -> ExternalResult<Inputs>;
}

impl<T: InputGenerator + ?Sized> InputGenerator for Arc<T> {
    fn generate(&self, state: &State) -> ExternalResult<Inputs> {
        (**self).generate(state)
    }
}

impl<T: InputGenerator + ?Sized> InputGenerator for Box<T> {
    fn generate(&self, state: &State) -> ExternalResult<Inputs> {
        (**self).generate(state)
    }
}

/// Per-provider strategy table
pub struct InputDispatcher {
    aws: Box<dyn InputGenerator>,
    gcp: Box<dyn InputGenerator>,
    azure: Box<dyn InputGenerator>,
}

impl InputDispatcher {
    pub fn new(
        aws: impl InputGenerator + 'static,
        gcp: impl InputGenerator + 'static,
        azure: impl InputGenerator + 'static,
    ) -> Self {
        Self {
            aws: Box::new(aws),
            gcp: Box::new(gcp),
            azure: Box::new(azure),
        }
    }

    /// The strategy registered for `kind`.
    pub fn strategy(&self, kind: IaasKind) -> &dyn InputGenerator {
        match kind {
            IaasKind::Aws => self.aws.as_ref(),
            IaasKind::Gcp => self.gcp.as_ref(),
            IaasKind::Azure => self.azure.as_ref(),
        }
    }
}

impl InputGenerator for InputDispatcher {
    /// Fails with `ReconcileError::UnsupportedProvider` when the state names no
    /// known IaaS. A strategy's own failure is returned untouched.
    fn generate(&self, state: &State) -> ExternalResult<Inputs> {
        let kind = state.iaas_kind()?;

        tracing::debug!(iaas = %kind, "generating apply inputs");
        self.strategy(kind).generate(state)
    }
}
