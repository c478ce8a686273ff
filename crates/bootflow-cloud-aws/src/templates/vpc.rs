use bootflow_cloud::template::{Output, Parameter, Resource, Template, reference};
use serde_json::json;

/// VPC with an attached internet gateway.
pub fn vpc(env_id: &str) -> Template {
    Template::default()
        .with_parameter(
            "VPCCIDR",
            Parameter::string("CIDR block for the VPC.", Some("10.0.0.0/16")),
        )
        .with_resource(
            "VPC",
            Resource::new("AWS::EC2::VPC")
                .with_properties(json!({
                    "CidrBlock": reference("VPCCIDR"),
                    "Tags": [{ "Key": "Name", "Value": format!("vpc-{env_id}") }],
                }))
                .retain(),
        )
        .with_resource(
            "VPCGatewayInternetGateway",
            Resource::new("AWS::EC2::InternetGateway").retain(),
        )
        .with_resource(
            "VPCGatewayAttachment",
            Resource::new("AWS::EC2::VPCGatewayAttachment")
                .with_properties(json!({
                    "VpcId": reference("VPC"),
                    "InternetGatewayId": reference("VPCGatewayInternetGateway"),
                }))
                .retain(),
        )
        .with_output("VPCID", Output::new(reference("VPC")))
        .with_output(
            "VPCInternetGatewayID",
            Output::new(reference("VPCGatewayInternetGateway")),
        )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vpc_parameters() {
        let vpc = vpc("");

        assert_eq!(vpc.parameters.len(), 1);
        assert_eq!(
            vpc.parameters["VPCCIDR"],
            Parameter {
                description: "CIDR block for the VPC.".to_string(),
                kind: "String".to_string(),
                default: Some("10.0.0.0/16".to_string()),
            }
        );
    }

    #[test]
    fn test_vpc_resources() {
        let vpc = vpc("some-env-id-42");

        assert_eq!(vpc.resources.len(), 3);
        assert_eq!(
            vpc.resources["VPC"],
            Resource {
                kind: "AWS::EC2::VPC".to_string(),
                properties: Some(json!({
                    "CidrBlock": { "Ref": "VPCCIDR" },
                    "Tags": [{ "Key": "Name", "Value": "vpc-some-env-id-42" }],
                })),
                depends_on: None,
                deletion_policy: Some("Retain".to_string()),
            }
        );
        assert_eq!(
            vpc.resources["VPCGatewayInternetGateway"],
            Resource::new("AWS::EC2::InternetGateway").retain()
        );
        assert_eq!(
            vpc.resources["VPCGatewayAttachment"].properties,
            Some(json!({
                "VpcId": { "Ref": "VPC" },
                "InternetGatewayId": { "Ref": "VPCGatewayInternetGateway" },
            }))
        );
    }

    #[test]
    fn test_vpc_outputs() {
        let vpc = vpc("");

        assert_eq!(vpc.outputs["VPCID"], Output::new(json!({ "Ref": "VPC" })));
        assert_eq!(
            vpc.outputs["VPCInternetGatewayID"],
            Output::new(json!({ "Ref": "VPCGatewayInternetGateway" }))
        );
    }
}
