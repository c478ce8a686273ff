//! AWS provider for bootflow
//!
//! - [`templates`]: CloudFormation fragment builders and the top-level
//!   [`TemplateBuilder`] that composes them into a stack document
//! - [`AwsInputGenerator`]: terraform inputs for AWS environments
//!
//! # Example
//!
//! ```ignore
//! use bootflow_cloud_aws::{TemplateBuilder, TemplateRequest};
//! use bootflow_cloud::LoadBalancerKind;
//!
//! let template = TemplateBuilder::new().build(&TemplateRequest {
//!     key_pair_name: "keypair-bbl-env".into(),
//!     availability_zones: vec!["us-east-1a".into(), "us-east-1b".into()],
//!     lb_kind: Some(LoadBalancerKind::Cf),
//!     ..Default::default()
//! });
//! println!("{}", template.to_json_pretty()?);
//! ```

pub mod error;
pub mod inputs;
pub mod templates;

pub use error::{AwsError, Result};
pub use inputs::AwsInputGenerator;
pub use templates::{TemplateBuilder, TemplateRequest};
