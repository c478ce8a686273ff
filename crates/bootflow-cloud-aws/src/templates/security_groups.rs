//! Security groups for the director, its VMs and load balancers

use super::load_balancers::LoadBalancer;
use bootflow_cloud::template::{Output, Parameter, Resource, Template, reference};
use serde_json::{Value, json};

/// Group shared by every VM the director deploys.
pub fn internal_security_group() -> Template {
    let mut template = Template::default()
        .with_resource(
            "InternalSecurityGroup",
            Resource::new("AWS::EC2::SecurityGroup").with_properties(json!({
                "VpcId": reference("VPC"),
                "GroupDescription": "Internal",
                "SecurityGroupEgress": [],
                "SecurityGroupIngress": [
                    { "IpProtocol": "tcp", "FromPort": "0", "ToPort": "65535" },
                    { "IpProtocol": "udp", "FromPort": "0", "ToPort": "65535" },
                    { "IpProtocol": "icmp", "FromPort": "-1", "ToPort": "-1", "CidrIp": "0.0.0.0/0" },
                ],
            })),
        )
        .with_output(
            "InternalSecurityGroup",
            Output::new(reference("InternalSecurityGroup")),
        );

    for protocol in ["tcp", "udp"] {
        template.merge_in(Template::default().with_resource(
            format!("InternalSecurityGroupIngress{}fromBOSH", protocol.to_uppercase()),
            ingress_from("InternalSecurityGroup", "BOSHSecurityGroup", protocol),
        ));
        template.merge_in(Template::default().with_resource(
            format!("InternalSecurityGroupIngress{}fromSelf", protocol.to_uppercase()),
            ingress_from("InternalSecurityGroup", "InternalSecurityGroup", protocol),
        ));
    }

    template
}

/// Group for the director VM.
pub fn bosh_security_group() -> Template {
    let admin = |port: &str| {
        json!({
            "CidrIp": reference("BOSHInboundCIDR"),
            "IpProtocol": "tcp",
            "FromPort": port,
            "ToPort": port,
        })
    };
    let internal = |protocol: &str| {
        json!({
            "SourceSecurityGroupId": reference("InternalSecurityGroup"),
            "IpProtocol": protocol,
            "FromPort": "0",
            "ToPort": "65535",
        })
    };

    Template::default()
        .with_parameter(
            "BOSHInboundCIDR",
            Parameter::string(
                "CIDR to permit access to BOSH (e.g. 205.103.216.37/32 for your specific IP)",
                Some("0.0.0.0/0"),
            ),
        )
        .with_resource(
            "BOSHSecurityGroup",
            Resource::new("AWS::EC2::SecurityGroup").with_properties(json!({
                "VpcId": reference("VPC"),
                "GroupDescription": "BOSH",
                "SecurityGroupEgress": [],
                "SecurityGroupIngress": [
                    admin("22"),
                    admin("6868"),
                    admin("25555"),
                    internal("tcp"),
                    internal("udp"),
                ],
            })),
        )
        .with_output("BOSHSecurityGroup", Output::new(reference("BOSHSecurityGroup")))
}

/// Group admitting public traffic on each listener's front-end port.
pub fn lb_security_group(lb: &LoadBalancer) -> Template {
    let ingress: Vec<Value> = lb
        .listeners
        .iter()
        .map(|listener| {
            json!({
                "CidrIp": "0.0.0.0/0",
                "IpProtocol": "tcp",
                "FromPort": listener.load_balancer_port.to_string(),
                "ToPort": listener.load_balancer_port.to_string(),
            })
        })
        .collect();

    Template::default()
        .with_resource(
            lb.security_group,
            Resource::new("AWS::EC2::SecurityGroup").with_properties(json!({
                "VpcId": reference("VPC"),
                "GroupDescription": lb.security_group_description,
                "SecurityGroupEgress": [],
                "SecurityGroupIngress": ingress,
            })),
        )
        .with_output(lb.security_group, Output::new(reference(lb.security_group)))
}

/// Group admitting balancer traffic on each listener's instance port.
pub fn lb_internal_security_group(lb: &LoadBalancer) -> Template {
    let ingress: Vec<Value> = lb
        .listeners
        .iter()
        .map(|listener| {
            json!({
                "SourceSecurityGroupId": reference(lb.security_group),
                "IpProtocol": "tcp",
                "FromPort": listener.instance_port.to_string(),
                "ToPort": listener.instance_port.to_string(),
            })
        })
        .collect();

    Template::default()
        .with_resource(
            lb.internal_security_group,
            Resource::new("AWS::EC2::SecurityGroup").with_properties(json!({
                "VpcId": reference("VPC"),
                "GroupDescription": lb.internal_security_group_description,
                "SecurityGroupEgress": [],
                "SecurityGroupIngress": ingress,
            })),
        )
        .with_output(
            lb.internal_security_group,
            Output::new(reference(lb.internal_security_group)),
        )
}

fn ingress_from(group: &str, source: &str, protocol: &str) -> Resource {
    Resource::new("AWS::EC2::SecurityGroupIngress").with_properties(json!({
        "GroupId": reference(group),
        "SourceSecurityGroupId": reference(source),
        "IpProtocol": protocol,
        "FromPort": "0",
        "ToPort": "65535",
    }))
}
