//! Storeforge Provisioner - Store provisioning state machine
//!
//! Takes an accepted [`OrchestrationJob`](storeforge_types::OrchestrationJob)
//! and drives it to a running store:
//!
//! 1. Render the engine's default values and install the store chart
//! 2. Poll the namespace until every pod is up, within a fixed attempt budget
//! 3. Configure the platform through its adapter
//! 4. Report READY or FAILED to the backend, exactly once
//!
//! ## Collaborators
//!
//! All cluster and network access goes through traits so the driver can be
//! exercised without a cluster:
//!
//! - [`CommandRunner`]: external program execution
//! - [`DeploymentTool`]: release install and removal
//! - [`ReadinessProber`]: namespace pod readiness
//! - [`PlatformAdapter`]: per-engine values, configuration and credentials
//! - [`StatusNotifier`]: backend status callbacks

#![deny(unsafe_code)]
#![cfg_attr(feature = "strict-docs", warn(missing_docs))]
#![cfg_attr(not(feature = "strict-docs"), allow(missing_docs))]

pub mod adapters;
pub mod callback;
pub mod command;
pub mod driver;
pub mod error;
pub mod helm;
pub mod readiness;

#[cfg(test)]
mod testing;

pub use adapters::{
    AdapterError, AdapterRegistry, ChartDependency, ConfigureOutcome, MedusaAdapter,
    PlatformAdapter, WooCommerceAdapter,
};
pub use callback::{
    CallbackError, HttpCallbackNotifier, StatusNotifier, TerminalReporter, TOKEN_HEADER,
};
pub use command::{CommandError, CommandRunner, ProcessCommandRunner};
pub use driver::{DriverSettings, JobOutcome, ProvisioningDriver, MOCK_PASSWORD};
pub use error::{ProvisionError, Result};
pub use helm::{DeploymentTool, HelmDeploymentTool};
pub use readiness::{KubectlReadinessProber, ReadinessProber, DEFAULT_READINESS_SENTINEL};
