//! Director-side resources: key pair, elastic IP, NAT and IAM user

use bootflow_cloud::template::{Output, Parameter, Resource, Template, get_att, reference};
use serde_json::json;

/// EC2 actions the BOSH AWS CPI needs.
const CPI_ACTIONS: &[&str] = &[
    "ec2:AssociateAddress",
    "ec2:AttachVolume",
    "ec2:CopyImage",
    "ec2:CreateVolume",
    "ec2:CreateSnapshot",
    "ec2:CreateTags",
    "ec2:DeleteVolume",
    "ec2:DeleteSnapshot",
    "ec2:DescribeAddresses",
    "ec2:DescribeImages",
    "ec2:DescribeInstances",
    "ec2:DescribeRegions",
    "ec2:DescribeSecurityGroups",
    "ec2:DescribeSnapshots",
    "ec2:DescribeSubnets",
    "ec2:DescribeVolumes",
    "ec2:DetachVolume",
    "ec2:RunInstances",
    "ec2:TerminateInstances",
    "ec2:RegisterImage",
    "ec2:DeregisterImage",
    "elasticloadbalancing:*",
];

pub fn ssh_key_pair_name(key_pair_name: &str) -> Template {
    Template::default().with_parameter(
        "SSHKeyPairName",
        Parameter {
            description: "SSH Keypair to use for instances".to_string(),
            kind: "AWS::EC2::KeyPair::KeyName".to_string(),
            default: Some(key_pair_name.to_string()),
        },
    )
}

/// IAM user the director authenticates as, with its access key.
pub fn bosh_iam_user(user_name: &str) -> Template {
    let mut properties = json!({
        "Policies": [{
            "PolicyName": "aws-cpi",
            "PolicyDocument": {
                "Version": "2012-10-17",
                "Statement": [{
                    "Action": CPI_ACTIONS,
                    "Effect": "Allow",
                    "Resource": "*",
                }],
            },
        }],
    });
    if !user_name.is_empty() {
        properties["UserName"] = json!(user_name);
    }

    Template::default()
        .with_resource(
            "BOSHUser",
            Resource::new("AWS::IAM::User").with_properties(properties),
        )
        .with_resource(
            "BOSHUserAccessKey",
            Resource::new("AWS::IAM::AccessKey")
                .with_properties(json!({ "UserName": reference("BOSHUser") })),
        )
        .with_output("BOSHUserAccessKey", Output::new(reference("BOSHUserAccessKey")))
        .with_output(
            "BOSHUserSecretAccessKey",
            Output::new(get_att("BOSHUserAccessKey", "SecretAccessKey")),
        )
}

/// NAT gateway in the BOSH subnet for outbound traffic from internal subnets.
pub fn nat() -> Template {
    Template::default()
        .with_resource(
            "NATEIP",
            Resource::new("AWS::EC2::EIP")
                .with_properties(json!({ "Domain": "vpc" }))
                .depends_on("VPCGatewayAttachment"),
        )
        .with_resource(
            "NATGateway",
            Resource::new("AWS::EC2::NatGateway").with_properties(json!({
                "AllocationId": get_att("NATEIP", "AllocationId"),
                "SubnetId": reference("BOSHSubnet"),
            })),
        )
}

/// Public address for the director.
pub fn bosh_eip() -> Template {
    Template::default()
        .with_resource(
            "BOSHEIP",
            Resource::new("AWS::EC2::EIP")
                .with_properties(json!({ "Domain": "vpc" }))
                .depends_on("VPCGatewayAttachment"),
        )
        .with_output("BOSHEIP", Output::new(reference("BOSHEIP")))
        .with_output(
            "BOSHURL",
            Output::new(json!({
                "Fn::Join": ["", ["https://", reference("BOSHEIP"), ":25555"]],
            })),
        )
}
