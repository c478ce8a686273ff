//! Terraform inputs for AWS environments

use crate::error::{AwsError, Result};
use bootflow_cloud::{ExternalResult, InputGenerator, Inputs, State};

/// Resource names built from the env id are capped at this length.
const SHORT_ENV_ID_LEN: usize = 20;

#[derive(Debug, Default, Clone, Copy)]
pub struct AwsInputGenerator;

impl AwsInputGenerator {
    pub fn new() -> Self {
        Self
    }

    fn inputs(&self, state: &State) -> Result<Inputs> {
        let aws = &state.aws;
        if aws.access_key_id.is_empty() {
            return Err(AwsError::MissingAccessKeyId);
        }
        if aws.secret_access_key.is_empty() {
            return Err(AwsError::MissingSecretAccessKey);
        }
        if aws.region.is_empty() {
            return Err(AwsError::MissingRegion);
        }

        let mut inputs = Inputs::new();
        inputs.insert("env_id".into(), state.env_id.clone());
        inputs.insert("short_env_id".into(), short_env_id(&state.env_id));
        inputs.insert("access_key".into(), aws.access_key_id.clone());
        inputs.insert("secret_key".into(), aws.secret_access_key.clone());
        inputs.insert("region".into(), aws.region.clone());
        inputs.insert(
            "bosh_availability_zone".into(),
            state.stack.bosh_az.clone(),
        );

        if state.lb.kind.is_some() {
            inputs.insert("ssl_certificate".into(), state.lb.cert.clone());
            inputs.insert("ssl_certificate_private_key".into(), state.lb.key.clone());
            if let Some(chain) = &state.lb.chain {
                inputs.insert("ssl_certificate_chain".into(), chain.clone());
            }
            if let Some(domain) = &state.lb.domain {
                inputs.insert("system_domain".into(), domain.clone());
            }
        }

        Ok(inputs)
    }
}

fn short_env_id(env_id: &str) -> String {
    env_id.chars().take(SHORT_ENV_ID_LEN).collect()
}

impl InputGenerator for AwsInputGenerator {
    fn generate(&self, state: &State) -> ExternalResult<Inputs> {
        tracing::debug!(env_id = %state.env_id, "generating aws inputs");
        Ok(self.inputs(state)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bootflow_cloud::{AwsCredentials, LoadBalancer, LoadBalancerKind, Stack};

    fn aws_state() -> State {
        State {
            iaas: "aws".to_string(),
            env_id: "some-env-id-that-is-quite-long".to_string(),
            aws: AwsCredentials {
                access_key_id: "some-access-key-id".to_string(),
                secret_access_key: "some-secret-access-key".to_string(),
                region: "some-region".to_string(),
            },
            stack: Stack {
                bosh_az: "some-zone".to_string(),
                ..Default::default()
            },
            ..Default::default()
        }
    }

    #[test]
    fn test_generates_base_inputs() {
        let inputs = AwsInputGenerator::new().generate(&aws_state()).unwrap();

        assert_eq!(inputs["env_id"], "some-env-id-that-is-quite-long");
        assert_eq!(inputs["short_env_id"], "some-env-id-that-is-");
        assert_eq!(inputs["access_key"], "some-access-key-id");
        assert_eq!(inputs["secret_key"], "some-secret-access-key");
        assert_eq!(inputs["region"], "some-region");
        assert_eq!(inputs["bosh_availability_zone"], "some-zone");
        assert!(!inputs.contains_key("ssl_certificate"));
    }

    #[test]
    fn test_includes_load_balancer_inputs() {
        let state = State {
            lb: LoadBalancer {
                kind: Some(LoadBalancerKind::Cf),
                cert: "some-cert".to_string(),
                key: "some-key".to_string(),
                chain: Some("some-chain".to_string()),
                domain: Some("example.com".to_string()),
            },
            ..aws_state()
        };

        let inputs = AwsInputGenerator::new().generate(&state).unwrap();

        assert_eq!(inputs["ssl_certificate"], "some-cert");
        assert_eq!(inputs["ssl_certificate_private_key"], "some-key");
        assert_eq!(inputs["ssl_certificate_chain"], "some-chain");
        assert_eq!(inputs["system_domain"], "example.com");
    }

    #[test]
    fn test_omits_absent_chain_and_domain() {
        let state = State {
            lb: LoadBalancer {
                kind: Some(LoadBalancerKind::Concourse),
                cert: "some-cert".to_string(),
                key: "some-key".to_string(),
                ..Default::default()
            },
            ..aws_state()
        };

        let inputs = AwsInputGenerator::new().generate(&state).unwrap();

        assert!(inputs.contains_key("ssl_certificate"));
        assert!(!inputs.contains_key("ssl_certificate_chain"));
        assert!(!inputs.contains_key("system_domain"));
    }

    #[test]
    fn test_rejects_missing_credentials() {
        let mut state = aws_state();
        state.aws.secret_access_key.clear();

        let err = AwsInputGenerator::new().generate(&state).unwrap_err();
        assert_eq!(
            err.downcast_ref::<AwsError>(),
            Some(&AwsError::MissingSecretAccessKey)
        );
    }
}
