use bootflow_cloud::{FileStateStore, LoadBalancerKind};
use bootflow_cloud_aws::{TemplateBuilder, TemplateRequest};
use std::path::Path;

pub async fn handle(
    state_dir: &Path,
    lb_type: &str,
    availability_zones: Vec<String>,
    lb_certificate_arn: String,
) -> anyhow::Result<()> {
    let lb_kind = LoadBalancerKind::parse_optional(lb_type)?;
    let state = FileStateStore::new(state_dir).load().await?;

    let request = TemplateRequest {
        key_pair_name: state.key_pair.name.clone(),
        availability_zones,
        lb_kind,
        lb_certificate_arn,
        iam_user_name: format!("bosh-iam-user-{}", state.env_id),
        bosh_az: state.stack.bosh_az.clone(),
        env_id: state.env_id,
    };

    let template = TemplateBuilder::new().build(&request);
    println!("{}", template.to_json_pretty()?);

    Ok(())
}
