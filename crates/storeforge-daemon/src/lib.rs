//! Storeforge Daemon library
//!
//! This module provides the core components for the orchestrator daemon:
//! - Job intake, teardown and introspection REST API
//! - Token authentication
//! - Configuration loading
//! - Server lifecycle management

#![deny(unsafe_code)]
#![cfg_attr(feature = "strict-docs", warn(missing_docs))]
#![cfg_attr(not(feature = "strict-docs"), allow(missing_docs))]

pub mod api;
pub mod auth;
pub mod config;
pub mod error;
pub mod server;

pub use api::{create_router, AppState};
pub use config::{ConfigOverrides, OrchestratorConfig};
pub use error::{ApiError, ApiResult, DaemonError, DaemonResult};
pub use server::Server;
