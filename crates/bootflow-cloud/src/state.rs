//! Infrastructure state model
//!
//! [`State`] is the single record describing an environment. It is read and
//! written whole: callers load it, merge their change in memory and hand the
//! complete snapshot back to the [`StateStore`](crate::store::StateStore).

use crate::error::ReconcileError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// Current on-disk schema version
pub const STATE_VERSION: u32 = 1;

/// Environment state
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct State {
    /// Schema version of the persisted representation
    pub version: u32,

    /// Stable environment identifier
    pub env_id: String,

    /// Target IaaS as recorded on disk; parsed with [`State::iaas_kind`]
    pub iaas: String,

    /// Set when the environment has no BOSH director
    pub no_director: bool,

    pub aws: AwsCredentials,
    pub gcp: GcpCredentials,
    pub azure: AzureCredentials,
    pub key_pair: KeyPair,
    pub bosh: Director,
    pub stack: Stack,

    /// Attached load balancer
    pub lb: LoadBalancer,

    /// Provider identifiers written by successful applies
    #[serde(rename = "networkFacts")]
    pub network: NetworkFacts,

    /// Opaque blob owned by the apply engine
    pub tf_state: String,
}

impl State {
    /// Whether post-apply director configuration should run.
    pub fn has_director(&self) -> bool {
        !self.no_director
    }

    /// Parse the recorded IaaS.
    pub fn iaas_kind(&self) -> Result<IaasKind, ReconcileError> {
        self.iaas.parse()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AwsCredentials {
    pub access_key_id: String,
    pub secret_access_key: String,
    pub region: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct GcpCredentials {
    pub service_account_key: String,
    pub project_id: String,
    pub zone: String,
    pub region: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AzureCredentials {
    pub subscription_id: String,
    pub tenant_id: String,
    pub client_id: String,
    pub client_secret: String,
    pub location: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct KeyPair {
    pub name: String,
    pub private_key: String,
}

/// BOSH director connection details
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Director {
    pub director_address: String,
    pub director_username: String,
    pub director_password: String,
    pub director_ssl_ca: String,
}

/// CloudFormation stack details
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Stack {
    pub name: String,
    #[serde(rename = "boshAZ")]
    pub bosh_az: String,
}

/// Provider-native identifiers reported by the apply engine
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct NetworkFacts {
    pub vpc_id: String,
    pub subnet_ids: Vec<String>,
    pub key_pair_name: String,
    /// Security group name -> id
    pub security_groups: BTreeMap<String, String>,
    /// Load balancer name -> DNS name
    pub load_balancers: BTreeMap<String, String>,
}

/// Supported IaaS providers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IaasKind {
    Aws,
    Gcp,
    Azure,
}

impl IaasKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            IaasKind::Aws => "aws",
            IaasKind::Gcp => "gcp",
            IaasKind::Azure => "azure",
        }
    }
}

impl fmt::Display for IaasKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for IaasKind {
    type Err = ReconcileError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "aws" => Ok(IaasKind::Aws),
            "gcp" => Ok(IaasKind::Gcp),
            "azure" => Ok(IaasKind::Azure),
            other => Err(ReconcileError::UnsupportedProvider(other.to_string())),
        }
    }
}

/// Supported load balancer layouts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LoadBalancerKind {
    /// Single externally facing balancer
    Concourse,
    /// Router balancer plus SSH proxy balancer
    Cf,
}

impl LoadBalancerKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            LoadBalancerKind::Concourse => "concourse",
            LoadBalancerKind::Cf => "cf",
        }
    }

    /// Parse a kind where `""` and `"none"` mean no load balancer.
    pub fn parse_optional(s: &str) -> Result<Option<Self>, UnknownLoadBalancerKind> {
        match s {
            "" | "none" => Ok(None),
            other => other.parse().map(Some),
        }
    }
}

impl fmt::Display for LoadBalancerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{0:?} is not a valid lb type, valid lb types are: concourse and cf")]
pub struct UnknownLoadBalancerKind(pub String);

impl FromStr for LoadBalancerKind {
    type Err = UnknownLoadBalancerKind;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "concourse" => Ok(LoadBalancerKind::Concourse),
            "cf" => Ok(LoadBalancerKind::Cf),
            other => Err(UnknownLoadBalancerKind(other.to_string())),
        }
    }
}

/// Certificate material read from disk for an attach request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CertificateMaterial {
    pub cert: String,
    pub key: String,
    pub chain: Option<String>,
}

/// Load balancer record
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoadBalancer {
    #[serde(
        rename = "type",
        with = "kind_serde",
        skip_serializing_if = "Option::is_none"
    )]
    pub kind: Option<LoadBalancerKind>,
    pub cert: String,
    pub key: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub chain: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub domain: Option<String>,
}

impl LoadBalancer {
    /// Reject attaching `requested` when a different kind is already attached.
    pub fn check_attach(&self, requested: LoadBalancerKind) -> Result<(), ReconcileError> {
        match self.kind {
            Some(current) if current != requested => Err(ReconcileError::Validation(format!(
                "bootflow already has a {current} load balancer attached, please remove the previous load balancer before attaching a new one"
            ))),
            _ => Ok(()),
        }
    }

    /// Record an attach request.
    ///
    /// Certificate and key are always replaced. Chain and domain keep their
    /// previous values when the request omits them.
    pub fn attach(
        &mut self,
        kind: LoadBalancerKind,
        material: CertificateMaterial,
        domain: Option<String>,
    ) {
        self.kind = Some(kind);
        self.cert = material.cert;
        self.key = material.key;
        if let Some(chain) = material.chain {
            self.chain = Some(chain);
        }
        if let Some(domain) = domain.filter(|d| !d.is_empty()) {
            self.domain = Some(domain);
        }
    }
}

mod kind_serde {
    use super::LoadBalancerKind;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(
        kind: &Option<LoadBalancerKind>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        match kind {
            Some(kind) => serializer.serialize_str(kind.as_str()),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<LoadBalancerKind>, D::Error> {
        let raw = Option::<String>::deserialize(deserializer)?.unwrap_or_default();
        LoadBalancerKind::parse_optional(&raw).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn material(cert: &str, chain: Option<&str>) -> CertificateMaterial {
        CertificateMaterial {
            cert: cert.to_string(),
            key: "some-key".to_string(),
            chain: chain.map(str::to_string),
        }
    }

    #[test]
    fn test_parse_optional_kind() {
        assert_eq!(LoadBalancerKind::parse_optional(""), Ok(None));
        assert_eq!(LoadBalancerKind::parse_optional("none"), Ok(None));
        assert_eq!(
            LoadBalancerKind::parse_optional("cf"),
            Ok(Some(LoadBalancerKind::Cf))
        );
        assert_eq!(
            LoadBalancerKind::parse_optional("elb").unwrap_err().to_string(),
            r#""elb" is not a valid lb type, valid lb types are: concourse and cf"#
        );
    }

    #[test]
    fn test_iaas_kind_rejects_unknown() {
        let state = State {
            iaas: "openstack".to_string(),
            ..Default::default()
        };
        match state.iaas_kind() {
            Err(ReconcileError::UnsupportedProvider(value)) => assert_eq!(value, "openstack"),
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn test_check_attach_rejects_different_kind() {
        let lb = LoadBalancer {
            kind: Some(LoadBalancerKind::Cf),
            ..Default::default()
        };

        let err = lb.check_attach(LoadBalancerKind::Concourse).unwrap_err();
        assert_eq!(
            err.to_string(),
            "bootflow already has a cf load balancer attached, please remove the previous load balancer before attaching a new one"
        );
        assert!(lb.check_attach(LoadBalancerKind::Cf).is_ok());
        assert!(LoadBalancer::default()
            .check_attach(LoadBalancerKind::Concourse)
            .is_ok());
    }

    #[test]
    fn test_attach_keeps_domain_and_chain_when_omitted() {
        let mut lb = LoadBalancer {
            kind: Some(LoadBalancerKind::Cf),
            cert: "old-cert".to_string(),
            key: "old-key".to_string(),
            chain: Some("old-chain".to_string()),
            domain: Some("example.com".to_string()),
        };

        lb.attach(LoadBalancerKind::Cf, material("new-cert", None), None);

        assert_eq!(lb.cert, "new-cert");
        assert_eq!(lb.key, "some-key");
        assert_eq!(lb.chain.as_deref(), Some("old-chain"));
        assert_eq!(lb.domain.as_deref(), Some("example.com"));
    }

    #[test]
    fn test_state_json_layout() {
        let state = State {
            env_id: "some-env-id".to_string(),
            iaas: "aws".to_string(),
            lb: LoadBalancer {
                kind: Some(LoadBalancerKind::Concourse),
                cert: "some-cert".to_string(),
                key: "some-key".to_string(),
                ..Default::default()
            },
            ..Default::default()
        };

        let json = serde_json::to_value(&state).unwrap();
        assert_eq!(json["envId"], "some-env-id");
        assert_eq!(json["lb"]["type"], "concourse");
        assert!(json["lb"].get("domain").is_none());
        assert_eq!(json["stack"]["boshAZ"], "");
        assert!(json["networkFacts"]["loadBalancers"].is_object());
    }

    #[test]
    fn test_state_tolerates_unknown_fields_and_none_kind() {
        let json = r#"{
            "version": 1,
            "envId": "env",
            "lb": { "type": "none", "cert": "c" },
            "addedLater": { "anything": true }
        }"#;

        let state: State = serde_json::from_str(json).unwrap();
        assert_eq!(state.env_id, "env");
        assert_eq!(state.lb.kind, None);
        assert_eq!(state.lb.cert, "c");
        assert!(state.has_director());
    }
}
