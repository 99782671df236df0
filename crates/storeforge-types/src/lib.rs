//! Storeforge Types - Core types for store provisioning
//!
//! Storeforge turns an accepted provisioning job into a deployed, configured
//! and verified e-commerce store on a Kubernetes cluster, then reports the
//! outcome to the owning backend.
//!
//! ## Key Concepts
//!
//! - **OrchestrationJob**: One provisioning attempt for one store
//! - **StoreEngine**: Which platform adapter handles the store
//! - **StatusPayload**: Terminal report sent back to the backend
//! - **ProvisioningState**: Where a job sits in the provisioning state machine

#![deny(unsafe_code)]
#![cfg_attr(feature = "strict-docs", warn(missing_docs))]
#![cfg_attr(not(feature = "strict-docs"), allow(missing_docs))]

pub mod engine;
pub mod error;
pub mod job;
pub mod status;

pub use engine::StoreEngine;
pub use error::JobError;
pub use job::{validate_release, OrchestrateRequest, OrchestrationJob};
pub use status::{ProvisioningState, StatusPayload, StoreStatus};
