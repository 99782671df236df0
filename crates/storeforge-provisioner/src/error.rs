//! Provisioning error types

use crate::adapters::AdapterError;
use crate::command::CommandError;
use storeforge_types::StoreEngine;
use thiserror::Error;

/// Errors that end a provisioning job. The `Display` text becomes the
/// `error` field of the FAILED callback.
#[derive(Debug, Error)]
pub enum ProvisionError {
    #[error("Unsupported store engine: {0}")]
    UnknownEngine(StoreEngine),

    #[error(transparent)]
    Unsupported(#[from] AdapterError),

    #[error("Failed to prepare deployment values: {0}")]
    Values(String),

    /// Deployment tool failure, carrying its stderr verbatim
    #[error(transparent)]
    Deploy(CommandError),

    #[error("{0}")]
    Configure(String),

    #[error("platform configuration timed out")]
    Timeout { attempts: u32 },
}

impl From<serde_yaml::Error> for ProvisionError {
    fn from(err: serde_yaml::Error) -> Self {
        ProvisionError::Values(err.to_string())
    }
}

impl From<std::io::Error> for ProvisionError {
    fn from(err: std::io::Error) -> Self {
        ProvisionError::Values(err.to_string())
    }
}

/// Result type for provisioning operations
pub type Result<T> = std::result::Result<T, ProvisionError>;
