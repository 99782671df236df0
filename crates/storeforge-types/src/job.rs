//! Orchestration jobs
//!
//! An [`OrchestrationJob`] identifies one provisioning attempt. It is built
//! from the backend's [`OrchestrateRequest`] and never changes afterwards.

use crate::engine::StoreEngine;
use crate::error::JobError;
use serde::{Deserialize, Serialize};

/// Helm caps release names at 53 characters
const MAX_RELEASE_NAME_LEN: usize = 53;

/// Kubernetes caps namespace names at 63 characters
const MAX_NAMESPACE_LEN: usize = 63;

/// Job submission body as sent by the backend
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrchestrateRequest {
    pub store_id: String,
    pub name: String,
    pub engine: String,
    #[serde(default)]
    pub namespace: Option<String>,
    pub host: String,
    pub base_url: String,
    pub store_url: String,
    #[serde(default)]
    pub creator_id: Option<String>,
}

/// One accepted provisioning attempt
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrchestrationJob {
    /// Caller-assigned correlation key
    pub store_id: String,

    /// Release name, also the default namespace
    pub name: String,

    /// Platform adapter selector
    pub engine: StoreEngine,

    /// Cluster namespace owned by this store
    pub namespace: String,

    /// Fully-qualified hostname the store is served from
    pub host: String,

    pub base_url: String,

    /// Host plus the engine-specific path suffix
    pub store_url: String,

    pub creator_id: Option<String>,
}

impl OrchestrationJob {
    /// Check the invariants a job must hold before it is scheduled.
    ///
    /// Release and namespace names end up as arguments to external tools, so
    /// they are restricted to DNS-1123 labels.
    pub fn validate(&self) -> Result<(), JobError> {
        require("store_id", &self.store_id)?;
        require("host", &self.host)?;
        require("store_url", &self.store_url)?;
        validate_release(&self.name, &self.namespace)
    }
}

/// Check a release name and namespace pair before it reaches the cluster tools
pub fn validate_release(name: &str, namespace: &str) -> Result<(), JobError> {
    validate_label("name", name, MAX_RELEASE_NAME_LEN)?;
    validate_label("namespace", namespace, MAX_NAMESPACE_LEN)
}

impl TryFrom<OrchestrateRequest> for OrchestrationJob {
    type Error = JobError;

    fn try_from(request: OrchestrateRequest) -> Result<Self, Self::Error> {
        let engine = request.engine.parse::<StoreEngine>()?;
        let namespace = request
            .namespace
            .filter(|ns| !ns.trim().is_empty())
            .unwrap_or_else(|| request.name.clone());

        let job = Self {
            store_id: request.store_id,
            name: request.name,
            engine,
            namespace,
            host: request.host,
            base_url: request.base_url,
            store_url: request.store_url,
            creator_id: request.creator_id,
        };
        job.validate()?;
        Ok(job)
    }
}

fn require(field: &'static str, value: &str) -> Result<(), JobError> {
    if value.trim().is_empty() {
        return Err(JobError::MissingField(field));
    }
    Ok(())
}

fn validate_label(field: &'static str, value: &str, max_len: usize) -> Result<(), JobError> {
    require(field, value)?;

    if value.len() > max_len {
        return Err(JobError::InvalidField {
            field,
            reason: format!("must be at most {} characters", max_len),
        });
    }

    let valid_chars = value
        .chars()
        .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-');
    let valid_edges = !value.starts_with('-') && !value.ends_with('-');

    if !valid_chars || !valid_edges {
        return Err(JobError::InvalidField {
            field,
            reason: format!(
                "'{}' must consist of lowercase alphanumerics or '-', starting and ending with an alphanumeric",
                value
            ),
        });
    }

    Ok(())
}
