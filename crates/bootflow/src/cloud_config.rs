//! Director cloud-config updates
//!
//! After a load balancer is attached the director needs `vm_extensions` that
//! place VMs behind it. The extensions are written as a BOSH ops file and
//! applied on top of the director's current cloud config.

use anyhow::Context;
use async_trait::async_trait;
use bootflow_cloud::{ConfigUpdater, ExternalResult, LoadBalancerKind, State};
use serde::Serialize;
use std::path::PathBuf;
use std::process::Stdio;
use tokio::process::Command;

const CLOUD_CONFIG_FILE: &str = "cloud-config.yml";
const OPS_FILE: &str = "ops.yml";

#[derive(Debug, Serialize, PartialEq)]
struct Operation {
    #[serde(rename = "type")]
    kind: &'static str,
    path: String,
    value: VmExtension,
}

#[derive(Debug, Serialize, PartialEq)]
struct VmExtension {
    name: &'static str,
    cloud_properties: CloudProperties,
}

#[derive(Debug, Serialize, PartialEq)]
struct CloudProperties {
    elbs: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    security_groups: Vec<String>,
}

/// VM extension name -> load balancer key in the network facts
fn extensions(kind: LoadBalancerKind) -> &'static [(&'static str, &'static str)] {
    match kind {
        LoadBalancerKind::Concourse => &[("lb", "concourse")],
        LoadBalancerKind::Cf => &[
            ("cf-router-network-properties", "cf_router"),
            ("cf-ssh-proxy-network-properties", "cf_ssh_proxy"),
        ],
    }
}

/// Render the ops document for the load balancer recorded in `state`
///
/// Produces an empty document when no load balancer is attached.
pub fn generate_ops(state: &State) -> anyhow::Result<String> {
    let Some(kind) = state.lb.kind else {
        return Ok(serde_yaml::to_string(&Vec::<Operation>::new())?);
    };

    let network = &state.network;
    let mut operations = Vec::new();
    for &(name, lb_key) in extensions(kind) {
        let lb_name = network
            .load_balancers
            .get(lb_key)
            .with_context(|| format!("load balancer {lb_key} was not reported by the last apply"))?;

        let security_groups = [format!("{lb_key}_internal"), "internal".to_string()]
            .iter()
            .filter_map(|group| network.security_groups.get(group).cloned())
            .collect();

        operations.push(Operation {
            kind: "replace",
            path: format!("/vm_extensions/name={name}?"),
            value: VmExtension {
                name,
                cloud_properties: CloudProperties {
                    elbs: vec![lb_name.clone()],
                    security_groups,
                },
            },
        });
    }

    Ok(serde_yaml::to_string(&operations)?)
}

/// Applies the load balancer ops file through the `bosh` CLI
pub struct BoshCloudConfigUpdater {
    bosh_binary: String,
    dir: PathBuf,
}

impl BoshCloudConfigUpdater {
    pub fn new(bosh_binary: impl Into<String>, dir: impl Into<PathBuf>) -> Self {
        Self {
            bosh_binary: bosh_binary.into(),
            dir: dir.into(),
        }
    }

    /// Run a bosh command against the state's director and return stdout
    async fn run_command(&self, state: &State, args: &[&str]) -> anyhow::Result<String> {
        let director = &state.bosh;
        let mut cmd = Command::new(&self.bosh_binary);
        cmd.arg("-n").args(args);
        cmd.env("BOSH_ENVIRONMENT", &director.director_address)
            .env("BOSH_CLIENT", &director.director_username)
            .env("BOSH_CLIENT_SECRET", &director.director_password)
            .env("BOSH_CA_CERT", &director.director_ssl_ca);
        cmd.stdout(Stdio::piped());
        cmd.stderr(Stdio::piped());

        tracing::debug!("Running: {} -n {}", self.bosh_binary, args.join(" "));

        let output = cmd
            .output()
            .await
            .with_context(|| format!("failed to run {}", self.bosh_binary))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            anyhow::bail!("bosh {} failed: {}", args.join(" "), stderr.trim());
        }

        Ok(String::from_utf8_lossy(&output.stdout).to_string())
    }

    async fn update_cloud_config(&self, state: &State) -> anyhow::Result<()> {
        tokio::fs::create_dir_all(&self.dir).await?;

        let ops_path = self.dir.join(OPS_FILE);
        tokio::fs::write(&ops_path, generate_ops(state)?).await?;

        let current = self.run_command(state, &["cloud-config"]).await?;
        let cloud_config_path = self.dir.join(CLOUD_CONFIG_FILE);
        tokio::fs::write(&cloud_config_path, current).await?;

        let cloud_config_arg = cloud_config_path.to_string_lossy().into_owned();
        let ops_arg = ops_path.to_string_lossy().into_owned();

        tracing::info!(ops = %ops_arg, "updating cloud config");
        self.run_command(
            state,
            &["update-cloud-config", cloud_config_arg.as_str(), "-o", ops_arg.as_str()],
        )
        .await?;

        Ok(())
    }
}

#[async_trait]
impl ConfigUpdater for BoshCloudConfigUpdater {
    async fn update(&self, state: &State) -> ExternalResult<()> {
        Ok(self.update_cloud_config(state).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bootflow_cloud::{LoadBalancer, NetworkFacts};

    fn state_with(kind: Option<LoadBalancerKind>) -> State {
        State {
            lb: LoadBalancer {
                kind,
                ..Default::default()
            },
            network: NetworkFacts {
                security_groups: [
                    ("internal".to_string(), "sg-internal".to_string()),
                    ("cf_router_internal".to_string(), "sg-router".to_string()),
                ]
                .into(),
                load_balancers: [
                    ("cf_router".to_string(), "env-cf-router".to_string()),
                    ("cf_ssh_proxy".to_string(), "env-cf-ssh".to_string()),
                    ("concourse".to_string(), "env-concourse".to_string()),
                ]
                .into(),
                ..Default::default()
            },
            ..Default::default()
        }
    }

    #[test]
    fn test_cf_ops() {
        let ops = generate_ops(&state_with(Some(LoadBalancerKind::Cf))).unwrap();
        let parsed: serde_yaml::Value = serde_yaml::from_str(&ops).unwrap();

        assert_eq!(parsed.as_sequence().unwrap().len(), 2);
        assert_eq!(parsed[0]["type"], "replace");
        assert_eq!(
            parsed[0]["path"],
            "/vm_extensions/name=cf-router-network-properties?"
        );
        assert_eq!(parsed[0]["value"]["cloud_properties"]["elbs"][0], "env-cf-router");
        assert_eq!(
            parsed[0]["value"]["cloud_properties"]["security_groups"][0],
            "sg-router"
        );
        assert_eq!(parsed[1]["value"]["name"], "cf-ssh-proxy-network-properties");
        assert_eq!(parsed[1]["value"]["cloud_properties"]["elbs"][0], "env-cf-ssh");
    }

    #[test]
    fn test_concourse_ops() {
        let ops = generate_ops(&state_with(Some(LoadBalancerKind::Concourse))).unwrap();
        let parsed: serde_yaml::Value = serde_yaml::from_str(&ops).unwrap();

        assert_eq!(parsed.as_sequence().unwrap().len(), 1);
        assert_eq!(parsed[0]["value"]["name"], "lb");
        assert_eq!(parsed[0]["value"]["cloud_properties"]["elbs"][0], "env-concourse");
    }

    #[test]
    fn test_no_lb_no_ops() {
        let ops = generate_ops(&state_with(None)).unwrap();
        let parsed: serde_yaml::Value = serde_yaml::from_str(&ops).unwrap();
        assert!(parsed.as_sequence().unwrap().is_empty());
    }

    #[test]
    fn test_missing_lb_name_is_an_error() {
        let mut state = state_with(Some(LoadBalancerKind::Cf));
        state.network.load_balancers.remove("cf_ssh_proxy");

        let err = generate_ops(&state).unwrap_err();
        assert!(err.to_string().contains("cf_ssh_proxy"));
    }
}
