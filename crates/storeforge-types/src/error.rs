//! Job validation errors

use thiserror::Error;

/// Errors raised while turning a request into an [`OrchestrationJob`](crate::OrchestrationJob)
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum JobError {
    #[error("Unsupported store engine: {0}. Supported engines: woocommerce, medusa")]
    UnknownEngine(String),

    #[error("Missing required field: {0}")]
    MissingField(&'static str),

    #[error("Invalid {field}: {reason}")]
    InvalidField { field: &'static str, reason: String },
}
