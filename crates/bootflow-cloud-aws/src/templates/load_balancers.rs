//! Classic ELBs for Concourse and Cloud Foundry

use super::subnets::load_balancer_subnet_refs;
use bootflow_cloud::template::{Output, Resource, Template, get_att, reference};
use serde_json::{Value, json};

/// A front-end port and the instance port it forwards to
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Listener {
    pub protocol: &'static str,
    pub load_balancer_port: u16,
    pub instance_protocol: &'static str,
    pub instance_port: u16,
    pub ssl_certificate_id: Option<String>,
}

impl Listener {
    fn plain(
        protocol: &'static str,
        port: u16,
        instance_protocol: &'static str,
        instance_port: u16,
    ) -> Self {
        Self {
            protocol,
            load_balancer_port: port,
            instance_protocol,
            instance_port,
            ssl_certificate_id: None,
        }
    }

    fn secure(
        protocol: &'static str,
        port: u16,
        instance_protocol: &'static str,
        instance_port: u16,
        certificate_arn: &str,
    ) -> Self {
        Self {
            ssl_certificate_id: Some(certificate_arn.to_string()),
            ..Self::plain(protocol, port, instance_protocol, instance_port)
        }
    }

    fn to_json(&self) -> Value {
        let mut listener = json!({
            "Protocol": self.protocol,
            "LoadBalancerPort": self.load_balancer_port.to_string(),
            "InstanceProtocol": self.instance_protocol,
            "InstancePort": self.instance_port.to_string(),
        });
        if let Some(arn) = &self.ssl_certificate_id {
            listener["SSLCertificateId"] = json!(arn);
        }
        listener
    }
}

/// A load balancer and the security groups that front it
#[derive(Debug, Clone)]
pub struct LoadBalancer {
    /// Logical resource name
    pub name: &'static str,
    /// Security group admitting public traffic to the balancer
    pub security_group: &'static str,
    pub security_group_description: &'static str,
    /// Security group admitting balancer traffic to instances
    pub internal_security_group: &'static str,
    pub internal_security_group_description: &'static str,
    pub health_check_target: &'static str,
    pub listeners: Vec<Listener>,
}

impl LoadBalancer {
    pub fn concourse(certificate_arn: &str) -> Self {
        Self {
            name: "ConcourseLoadBalancer",
            security_group: "ConcourseSecurityGroup",
            security_group_description: "Concourse",
            internal_security_group: "ConcourseInternalSecurityGroup",
            internal_security_group_description: "ConcourseInternal",
            health_check_target: "tcp:8080",
            listeners: vec![
                Listener::plain("tcp", 80, "tcp", 8080),
                Listener::plain("tcp", 2222, "tcp", 2222),
                Listener::secure("ssl", 443, "tcp", 4443, certificate_arn),
            ],
        }
    }

    pub fn cf_router(certificate_arn: &str) -> Self {
        Self {
            name: "CFRouterLoadBalancer",
            security_group: "CFRouterSecurityGroup",
            security_group_description: "Router",
            internal_security_group: "CFRouterInternalSecurityGroup",
            internal_security_group_description: "CFRouterInternal",
            health_check_target: "tcp:80",
            listeners: vec![
                Listener::plain("http", 80, "http", 80),
                Listener::secure("https", 443, "http", 80, certificate_arn),
                Listener::secure("ssl", 4443, "tcp", 80, certificate_arn),
            ],
        }
    }

    pub fn cf_ssh_proxy() -> Self {
        Self {
            name: "CFSSHProxyLoadBalancer",
            security_group: "CFSSHProxySecurityGroup",
            security_group_description: "CFSSHProxy",
            internal_security_group: "CFSSHProxyInternalSecurityGroup",
            internal_security_group_description: "CFSSHProxyInternal",
            health_check_target: "tcp:2222",
            listeners: vec![Listener::plain("tcp", 2222, "tcp", 2222)],
        }
    }

    /// The balancer itself, spread over the first `zone_count` load
    /// balancer subnets.
    pub fn template(&self, zone_count: usize) -> Template {
        let listeners: Vec<Value> = self.listeners.iter().map(Listener::to_json).collect();

        Template::default()
            .with_resource(
                self.name,
                Resource::new("AWS::ElasticLoadBalancing::LoadBalancer")
                    .with_properties(json!({
                        "CrossZone": true,
                        "HealthCheck": {
                            "HealthyThreshold": "5",
                            "Interval": "12",
                            "Target": self.health_check_target,
                            "Timeout": "2",
                            "UnhealthyThreshold": "2",
                        },
                        "Listeners": listeners,
                        "SecurityGroups": [reference(self.security_group)],
                        "Subnets": load_balancer_subnet_refs(zone_count),
                    }))
                    .depends_on("VPCGatewayAttachment"),
            )
            .with_output(self.name, Output::new(reference(self.name)))
            .with_output(
                format!("{}URL", self.name),
                Output::new(get_att(self.name, "DNSName")),
            )
    }
}
