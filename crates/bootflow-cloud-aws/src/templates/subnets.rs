//! Subnets, their route tables and associations

use bootflow_cloud::template::{Output, Parameter, Resource, Template, reference};
use serde_json::json;

/// One private subnet per zone, routed through the NAT gateway.
pub fn internal_subnets(availability_zones: &[String]) -> Template {
    let mut template = Template::default()
        .with_resource(
            "InternalRouteTable",
            Resource::new("AWS::EC2::RouteTable")
                .with_properties(json!({ "VpcId": reference("VPC") })),
        )
        .with_resource(
            "InternalRoute",
            Resource::new("AWS::EC2::Route")
                .with_properties(json!({
                    "DestinationCidrBlock": "0.0.0.0/0",
                    "NatGatewayId": reference("NATGateway"),
                    "RouteTableId": reference("InternalRouteTable"),
                }))
                .depends_on("NATGateway"),
        );

    for (index, zone) in availability_zones.iter().enumerate() {
        let n = index + 1;
        template.merge_in(zone_subnet(
            &format!("InternalSubnet{n}"),
            &format!("Internal{n}"),
            &format!("10.0.{}.0/20", 16 * n),
            zone,
            "InternalRouteTable",
        ));
    }

    template
}

/// Public subnet for the director, routed through the internet gateway.
pub fn bosh_subnet(availability_zone: &str) -> Template {
    zone_subnet(
        "BOSHSubnet",
        "BOSH",
        "10.0.0.0/24",
        availability_zone,
        "BOSHRouteTable",
    )
    .with_resource(
        "BOSHRouteTable",
        Resource::new("AWS::EC2::RouteTable").with_properties(json!({ "VpcId": reference("VPC") })),
    )
    .with_resource(
        "BOSHRoute",
        Resource::new("AWS::EC2::Route")
            .with_properties(json!({
                "DestinationCidrBlock": "0.0.0.0/0",
                "GatewayId": reference("VPCGatewayInternetGateway"),
                "RouteTableId": reference("BOSHRouteTable"),
            }))
            .depends_on("VPCGatewayInternetGateway"),
    )
}

/// One public subnet per zone for load balancers.
pub fn load_balancer_subnets(availability_zones: &[String]) -> Template {
    let mut template = Template::default()
        .with_resource(
            "LoadBalancerRouteTable",
            Resource::new("AWS::EC2::RouteTable")
                .with_properties(json!({ "VpcId": reference("VPC") })),
        )
        .with_resource(
            "LoadBalancerRoute",
            Resource::new("AWS::EC2::Route")
                .with_properties(json!({
                    "DestinationCidrBlock": "0.0.0.0/0",
                    "GatewayId": reference("VPCGatewayInternetGateway"),
                    "RouteTableId": reference("LoadBalancerRouteTable"),
                }))
                .depends_on("VPCGatewayInternetGateway"),
        );

    for (index, zone) in availability_zones.iter().enumerate() {
        let n = index + 1;
        template.merge_in(zone_subnet(
            &format!("LoadBalancerSubnet{n}"),
            &format!("LoadBalancer{n}"),
            &format!("10.0.{}.0/24", n + 1),
            zone,
            "LoadBalancerRouteTable",
        ));
    }

    template
}

/// Names of the load balancer subnets for `count` zones, as references.
pub(crate) fn load_balancer_subnet_refs(count: usize) -> Vec<serde_json::Value> {
    (1..=count)
        .map(|n| reference(&format!("LoadBalancerSubnet{n}")))
        .collect()
}

fn zone_subnet(name: &str, tag: &str, cidr: &str, zone: &str, route_table: &str) -> Template {
    let cidr_parameter = format!("{name}CIDR");

    Template::default()
        .with_parameter(
            cidr_parameter.clone(),
            Parameter::string(format!("CIDR block for {name}."), Some(cidr)),
        )
        .with_resource(
            name,
            Resource::new("AWS::EC2::Subnet").with_properties(json!({
                "AvailabilityZone": zone,
                "CidrBlock": reference(&cidr_parameter),
                "VpcId": reference("VPC"),
                "Tags": [{ "Key": "Name", "Value": tag }],
            })),
        )
        .with_resource(
            format!("{name}RouteTableAssociation"),
            Resource::new("AWS::EC2::SubnetRouteTableAssociation").with_properties(json!({
                "RouteTableId": reference(route_table),
                "SubnetId": reference(name),
            })),
        )
        .with_output(format!("{name}Name"), Output::new(reference(name)))
        .with_output(format!("{name}AZ"), Output::new(json!(zone)))
        .with_output(cidr_parameter.clone(), Output::new(reference(&cidr_parameter)))
}
