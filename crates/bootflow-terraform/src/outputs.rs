//! `terraform output -json` parsing

use crate::error::Result;
use bootflow_cloud::NetworkFacts;
use serde::Deserialize;
use std::collections::BTreeMap;

const SECURITY_GROUP_SUFFIX: &str = "_security_group";
const LOAD_BALANCER_SUFFIX: &str = "_lb_name";

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct OutputValue {
    #[serde(default)]
    pub sensitive: bool,
    pub value: serde_json::Value,
}

/// Output name -> value, as reported by terraform
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(transparent)]
pub struct TerraformOutputs(BTreeMap<String, OutputValue>);

impl TerraformOutputs {
    pub fn from_json(json: &str) -> Result<Self> {
        if json.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_json::from_str(json)?)
    }

    pub fn get_str(&self, name: &str) -> Option<&str> {
        self.0.get(name).and_then(|output| output.value.as_str())
    }

    /// Collect the provider identifiers later steps need
    ///
    /// `*_security_group` outputs become security groups and `*_lb_name`
    /// outputs become load balancers, keyed by the name before the suffix.
    pub fn network_facts(&self) -> NetworkFacts {
        let mut facts = NetworkFacts {
            vpc_id: self.get_str("vpc_id").unwrap_or_default().to_string(),
            key_pair_name: self.get_str("key_pair_name").unwrap_or_default().to_string(),
            ..Default::default()
        };

        if let Some(ids) = self
            .0
            .get("internal_subnet_ids")
            .and_then(|output| output.value.as_array())
        {
            facts.subnet_ids = ids
                .iter()
                .filter_map(|id| id.as_str().map(str::to_string))
                .collect();
        }

        for (name, output) in &self.0 {
            let Some(value) = output.value.as_str() else {
                continue;
            };
            if let Some(group) = name.strip_suffix(SECURITY_GROUP_SUFFIX) {
                facts
                    .security_groups
                    .insert(group.to_string(), value.to_string());
            } else if let Some(lb) = name.strip_suffix(LOAD_BALANCER_SUFFIX) {
                facts
                    .load_balancers
                    .insert(lb.to_string(), value.to_string());
            }
        }

        facts
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const OUTPUT_JSON: &str = r#"{
        "vpc_id": {"sensitive": false, "type": "string", "value": "vpc-123"},
        "key_pair_name": {"sensitive": false, "type": "string", "value": "keypair-env"},
        "internal_subnet_ids": {"sensitive": false, "type": ["list", "string"], "value": ["subnet-1", "subnet-2"]},
        "internal_security_group": {"sensitive": false, "type": "string", "value": "sg-internal"},
        "cf_router_lb_name": {"sensitive": false, "type": "string", "value": "env-cf-router"},
        "cf_ssh_proxy_lb_name": {"sensitive": false, "type": "string", "value": "env-cf-ssh"},
        "bosh_director_password": {"sensitive": true, "type": "string", "value": "secret"}
    }"#;

    #[test]
    fn test_network_facts() {
        let outputs = TerraformOutputs::from_json(OUTPUT_JSON).unwrap();
        let facts = outputs.network_facts();

        assert_eq!(facts.vpc_id, "vpc-123");
        assert_eq!(facts.key_pair_name, "keypair-env");
        assert_eq!(facts.subnet_ids, vec!["subnet-1", "subnet-2"]);
        assert_eq!(facts.security_groups["internal"], "sg-internal");
        assert_eq!(facts.load_balancers["cf_router"], "env-cf-router");
        assert_eq!(facts.load_balancers["cf_ssh_proxy"], "env-cf-ssh");
        assert_eq!(facts.load_balancers.len(), 2);
    }

    #[test]
    fn test_empty_output() {
        let outputs = TerraformOutputs::from_json("\n").unwrap();
        assert_eq!(outputs.network_facts(), NetworkFacts::default());
    }

    #[test]
    fn test_invalid_output() {
        assert!(TerraformOutputs::from_json("not json").is_err());
    }
}
