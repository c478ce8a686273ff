//! bootflow reconciliation core
//!
//! This crate holds everything that decides *what* happens when an
//! environment is provisioned, independent of the engines that do the work.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────┐
//! │                  bootflow CLI                    │
//! │               (bootflow create-lbs)              │
//! └─────────────────┬───────────────────────────────┘
//!                   │
//! ┌─────────────────▼───────────────────────────────┐
//! │                bootflow-cloud                    │
//! │  ┌──────────────────────────────────────────┐   │
//! │  │   CreateLbs (apply orchestration)        │   │
//! │  └──────────────────────────────────────────┘   │
//! │  ┌──────────────┐ ┌────────────┐ ┌──────────┐   │
//! │  │  Template    │ │   Input    │ │  State   │   │
//! │  │  Composer    │ │ Dispatcher │ │  Store   │   │
//! │  └──────────────┘ └────────────┘ └──────────┘   │
//! └───────┬─────────────────┬───────────────────────┘
//!         │                 │
//! ┌───────▼───────┐ ┌───────▼────────────────────┐
//! │ cloudformation│ │ terraform + aws/gcp/azure  │
//! │   fragments   │ │      input generators      │
//! └───────────────┘ └────────────────────────────┘
//! ```

pub mod error;
pub mod inputs;
pub mod orchestrator;
pub mod provider;
pub mod state;
pub mod store;
pub mod template;

// Re-exports
pub use error::{BoxError, CompositeError, ExternalResult, ReconcileError, Result, StoreError};
pub use inputs::{InputDispatcher, InputGenerator, Inputs};
pub use orchestrator::{AttachOutcome, CreateLbs, CreateLbsConfig};
pub use provider::{ApplyEngine, ApplyFailure, ConfigUpdater, EnvironmentValidator, PartialState};
pub use state::{
    AwsCredentials, AzureCredentials, CertificateMaterial, Director, GcpCredentials, IaasKind,
    KeyPair, LoadBalancer, LoadBalancerKind, NetworkFacts, STATE_VERSION, Stack, State,
    UnknownLoadBalancerKind,
};
pub use store::{FileStateStore, StateLock, StateStore};
pub use template::{Output, Parameter, Resource, Template, compose};
