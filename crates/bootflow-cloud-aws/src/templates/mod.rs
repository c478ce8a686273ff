//! CloudFormation template for a BOSH environment on AWS
//!
//! Each submodule builds one fragment. [`TemplateBuilder::build`] composes
//! the base infrastructure and, when a load balancer kind is requested, the
//! fragments for that balancer on top.

pub mod bosh;
pub mod load_balancers;
pub mod security_groups;
pub mod subnets;
pub mod vpc;

use bootflow_cloud::{LoadBalancerKind, Template, compose};
use load_balancers::LoadBalancer;

pub const BASE_DESCRIPTION: &str = "Infrastructure for a BOSH deployment.";
pub const CONCOURSE_DESCRIPTION: &str =
    "Infrastructure for a BOSH deployment with a Concourse ELB.";
pub const CF_DESCRIPTION: &str = "Infrastructure for a BOSH deployment with a CloudFoundry ELB.";

/// Everything the composed template is parameterised by
#[derive(Debug, Clone, Default)]
pub struct TemplateRequest {
    pub key_pair_name: String,
    pub availability_zones: Vec<String>,
    pub lb_kind: Option<LoadBalancerKind>,
    pub lb_certificate_arn: String,
    pub iam_user_name: String,
    pub env_id: String,
    pub bosh_az: String,
}

#[derive(Debug, Default, Clone, Copy)]
pub struct TemplateBuilder;

impl TemplateBuilder {
    pub fn new() -> Self {
        Self
    }

    pub fn build(&self, request: &TemplateRequest) -> Template {
        tracing::info!("generating cloudformation template");

        let zones = &request.availability_zones;
        let base = compose(
            Template::new(BASE_DESCRIPTION),
            [
                subnets::internal_subnets(zones),
                bosh::ssh_key_pair_name(&request.key_pair_name),
                bosh::bosh_iam_user(&request.iam_user_name),
                bosh::nat(),
                vpc::vpc(&request.env_id),
                subnets::bosh_subnet(&request.bosh_az),
                security_groups::internal_security_group(),
                security_groups::bosh_security_group(),
                bosh::bosh_eip(),
            ],
        );

        let Some(kind) = request.lb_kind else {
            return base;
        };

        let arn = request.lb_certificate_arn.as_str();
        let (description, balancers) = match kind {
            LoadBalancerKind::Concourse => {
                (CONCOURSE_DESCRIPTION, vec![LoadBalancer::concourse(arn)])
            }
            LoadBalancerKind::Cf => (
                CF_DESCRIPTION,
                vec![LoadBalancer::cf_router(arn), LoadBalancer::cf_ssh_proxy()],
            ),
        };
        tracing::debug!(lb_type = %kind, "adding load balancer fragments");

        let mut fragments = vec![subnets::load_balancer_subnets(zones)];
        for lb in &balancers {
            fragments.push(lb.template(zones.len()));
            fragments.push(security_groups::lb_security_group(lb));
            fragments.push(security_groups::lb_internal_security_group(lb));
        }

        Template {
            description: description.to_string(),
            ..compose(base, fragments)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(lb_kind: Option<LoadBalancerKind>) -> TemplateRequest {
        TemplateRequest {
            key_pair_name: "some-key-pair-name".to_string(),
            availability_zones: vec!["us-east-1a".into(), "us-east-1b".into(), "us-east-1c".into()],
            lb_kind,
            lb_certificate_arn: "some-certificate-arn".to_string(),
            iam_user_name: "some-iam-user-name".to_string(),
            env_id: "some-env-id".to_string(),
            bosh_az: "us-east-1c".to_string(),
        }
    }

    #[test]
    fn test_base_template() {
        let template = TemplateBuilder::new().build(&request(None));

        assert_eq!(template.format_version, "2010-09-09");
        assert_eq!(template.description, BASE_DESCRIPTION);
        for name in [
            "VPC",
            "BOSHSubnet",
            "InternalSubnet1",
            "InternalSubnet3",
            "NATGateway",
            "BOSHEIP",
            "BOSHUser",
            "InternalSecurityGroup",
            "BOSHSecurityGroup",
        ] {
            assert!(template.resources.contains_key(name), "missing {name}");
        }
        assert!(template.parameters.contains_key("SSHKeyPairName"));
        assert!(!template.resources.contains_key("LoadBalancerSubnet1"));
        assert!(
            !template
                .resources
                .keys()
                .any(|name| name.ends_with("LoadBalancer"))
        );
    }

    #[test]
    fn test_concourse_template() {
        let template = TemplateBuilder::new().build(&request(Some(LoadBalancerKind::Concourse)));

        assert_eq!(template.description, CONCOURSE_DESCRIPTION);
        for name in [
            "ConcourseLoadBalancer",
            "ConcourseSecurityGroup",
            "ConcourseInternalSecurityGroup",
            "LoadBalancerSubnet3",
            "VPC",
        ] {
            assert!(template.resources.contains_key(name), "missing {name}");
        }
        assert!(!template.resources.contains_key("CFRouterLoadBalancer"));
    }

    #[test]
    fn test_cf_template() {
        let template = TemplateBuilder::new().build(&request(Some(LoadBalancerKind::Cf)));

        assert_eq!(template.description, CF_DESCRIPTION);
        for name in [
            "CFRouterLoadBalancer",
            "CFRouterSecurityGroup",
            "CFRouterInternalSecurityGroup",
            "CFSSHProxyLoadBalancer",
            "CFSSHProxySecurityGroup",
            "CFSSHProxyInternalSecurityGroup",
            "LoadBalancerSubnet1",
        ] {
            assert!(template.resources.contains_key(name), "missing {name}");
        }
        assert!(!template.resources.contains_key("ConcourseLoadBalancer"));
    }

    #[test]
    fn test_load_balancer_fragments_leave_base_entries_alone() {
        let base = TemplateBuilder::new().build(&request(None));

        for kind in [LoadBalancerKind::Concourse, LoadBalancerKind::Cf] {
            let template = TemplateBuilder::new().build(&request(Some(kind)));
            for (name, resource) in &base.resources {
                assert_eq!(&template.resources[name], resource, "{kind}: {name}");
            }
            for (name, parameter) in &base.parameters {
                assert_eq!(&template.parameters[name], parameter, "{kind}: {name}");
            }
            for (name, output) in &base.outputs {
                assert_eq!(&template.outputs[name], output, "{kind}: {name}");
            }
        }
    }

    #[test]
    fn test_template_is_cloudformation_json() {
        let template = TemplateBuilder::new().build(&request(Some(LoadBalancerKind::Cf)));
        let json: serde_json::Value =
            serde_json::from_str(&template.to_json_pretty().unwrap()).unwrap();

        assert_eq!(json["Description"], CF_DESCRIPTION);
        assert_eq!(
            json["Resources"]["CFRouterLoadBalancer"]["Type"],
            "AWS::ElasticLoadBalancing::LoadBalancer"
        );
        assert_eq!(json["Outputs"]["VPCID"]["Value"]["Ref"], "VPC");
    }
}
