use async_trait::async_trait;
use bootflow_cloud::{EnvironmentValidator, ExternalResult, State};

const NO_ENVIRONMENT: &str = "a bootflow environment could not be found, please create a new environment before running this command again";

/// Requires an existing environment on a known IaaS
pub struct StateValidator;

#[async_trait]
impl EnvironmentValidator for StateValidator {
    async fn validate(&self, state: &State) -> ExternalResult<()> {
        if state.env_id.is_empty() {
            return Err(NO_ENVIRONMENT.into());
        }
        if state.iaas.is_empty() {
            return Err("the environment has no iaas recorded".into());
        }
        Ok(())
    }
}
