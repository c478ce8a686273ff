//! Azure provider for bootflow

use bootflow_cloud::{ExternalResult, InputGenerator, Inputs, State};
use thiserror::Error;

/// Storage account names cap out at 24 characters; prefixes take the rest.
const SIMPLE_ENV_ID_LEN: usize = 15;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum AzureError {
    #[error("azure subscription id must be provided")]
    MissingSubscriptionId,

    #[error("azure tenant id must be provided")]
    MissingTenantId,

    #[error("azure client id must be provided")]
    MissingClientId,

    #[error("azure client secret must be provided")]
    MissingClientSecret,
}

pub type Result<T> = std::result::Result<T, AzureError>;

#[derive(Debug, Default, Clone, Copy)]
pub struct AzureInputGenerator;

impl AzureInputGenerator {
    pub fn new() -> Self {
        Self
    }

    fn inputs(&self, state: &State) -> Result<Inputs> {
        let azure = &state.azure;
        let required = [
            (&azure.subscription_id, AzureError::MissingSubscriptionId),
            (&azure.tenant_id, AzureError::MissingTenantId),
            (&azure.client_id, AzureError::MissingClientId),
            (&azure.client_secret, AzureError::MissingClientSecret),
        ];
        if let Some((_, err)) = required.into_iter().find(|(value, _)| value.is_empty()) {
            return Err(err);
        }

        Ok(Inputs::from([
            ("env_id".to_string(), state.env_id.clone()),
            ("simple_env_id".to_string(), simple_env_id(&state.env_id)),
            ("subscription_id".to_string(), azure.subscription_id.clone()),
            ("tenant_id".to_string(), azure.tenant_id.clone()),
            ("client_id".to_string(), azure.client_id.clone()),
            ("client_secret".to_string(), azure.client_secret.clone()),
            ("location".to_string(), azure.location.clone()),
        ]))
    }
}

/// Env id reduced to lower-case alphanumerics, for resource names that allow
/// nothing else.
fn simple_env_id(env_id: &str) -> String {
    env_id
        .chars()
        .filter(char::is_ascii_alphanumeric)
        .map(|c| c.to_ascii_lowercase())
        .take(SIMPLE_ENV_ID_LEN)
        .collect()
}

impl InputGenerator for AzureInputGenerator {
    fn generate(&self, state: &State) -> ExternalResult<Inputs> {
        tracing::debug!(env_id = %state.env_id, "generating azure inputs");
        Ok(self.inputs(state)?)
    }
}
