//! GCP provider for bootflow
//!
//! Derives terraform inputs for environments on Google Cloud from the
//! recorded project, region and service account key.

use bootflow_cloud::{ExternalResult, InputGenerator, Inputs, State};
use thiserror::Error;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum GcpError {
    #[error("gcp service account key must be provided")]
    MissingServiceAccountKey,

    #[error("gcp project id must be provided")]
    MissingProjectId,

    #[error("gcp region must be provided")]
    MissingRegion,

    #[error("gcp zone must be provided")]
    MissingZone,
}

pub type Result<T> = std::result::Result<T, GcpError>;

#[derive(Debug, Default, Clone, Copy)]
pub struct GcpInputGenerator;

impl GcpInputGenerator {
    pub fn new() -> Self {
        Self
    }

    fn inputs(&self, state: &State) -> Result<Inputs> {
        let gcp = &state.gcp;
        if gcp.service_account_key.is_empty() {
            return Err(GcpError::MissingServiceAccountKey);
        }
        if gcp.project_id.is_empty() {
            return Err(GcpError::MissingProjectId);
        }
        if gcp.region.is_empty() {
            return Err(GcpError::MissingRegion);
        }
        if gcp.zone.is_empty() {
            return Err(GcpError::MissingZone);
        }

        let mut inputs = Inputs::from([
            ("env_id".to_string(), state.env_id.clone()),
            ("project_id".to_string(), gcp.project_id.clone()),
            ("region".to_string(), gcp.region.clone()),
            ("zone".to_string(), gcp.zone.clone()),
            ("credentials".to_string(), gcp.service_account_key.clone()),
        ]);

        if state.lb.kind.is_some() {
            inputs.insert("ssl_certificate".to_string(), state.lb.cert.clone());
            inputs.insert(
                "ssl_certificate_private_key".to_string(),
                state.lb.key.clone(),
            );
            if let Some(domain) = &state.lb.domain {
                inputs.insert("system_domain".to_string(), domain.clone());
            }
        }

        Ok(inputs)
    }
}

impl InputGenerator for GcpInputGenerator {
    fn generate(&self, state: &State) -> ExternalResult<Inputs> {
        tracing::debug!(env_id = %state.env_id, "generating gcp inputs");
        Ok(self.inputs(state)?)
    }
}
