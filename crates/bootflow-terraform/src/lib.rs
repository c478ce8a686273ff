//! Terraform apply engine for bootflow
//!
//! [`TerraformManager`] implements [`bootflow_cloud::ApplyEngine`] by driving
//! the `terraform` binary. Inputs come from an
//! [`InputGenerator`](bootflow_cloud::InputGenerator), normally the provider
//! [`InputDispatcher`](bootflow_cloud::InputDispatcher).
//!
//! # Requirements
//!
//! - `terraform` (or the binary named by `BOOTFLOW_TERRAFORM_BIN`) on the path
//! - a directory of `*.tf` templates for the target IaaS

pub mod error;
pub mod executor;
pub mod manager;
pub mod outputs;

pub use error::{Result, TerraformError};
pub use executor::Terraform;
pub use manager::TerraformManager;
pub use outputs::{OutputValue, TerraformOutputs};
