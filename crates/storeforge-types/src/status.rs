//! Store status reporting and provisioning states

use serde::{Deserialize, Serialize};

/// Store status as understood by the backend
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum StoreStatus {
    /// Backend's own initial default; never sent by the provisioner
    Provisioning,
    Ready,
    Failed,
}

impl StoreStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(self, StoreStatus::Ready | StoreStatus::Failed)
    }
}

impl std::fmt::Display for StoreStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StoreStatus::Provisioning => write!(f, "PROVISIONING"),
            StoreStatus::Ready => write!(f, "READY"),
            StoreStatus::Failed => write!(f, "FAILED"),
        }
    }
}

/// Status report posted to the backend. Absent fields are omitted on the wire.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusPayload {
    pub status: StoreStatus,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,

    /// Plaintext admin credential, only on READY
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
}

impl StatusPayload {
    /// Store is live at `url`
    pub fn ready(url: impl Into<String>, password: Option<String>) -> Self {
        Self {
            status: StoreStatus::Ready,
            url: Some(url.into()),
            error: None,
            password,
        }
    }

    /// Provisioning failed with a human-readable diagnostic
    pub fn failed(error: impl Into<String>) -> Self {
        Self {
            status: StoreStatus::Failed,
            url: None,
            error: Some(error.into()),
            password: None,
        }
    }

    pub fn is_terminal(&self) -> bool {
        self.status.is_terminal()
    }
}

impl std::fmt::Debug for StatusPayload {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StatusPayload")
            .field("status", &self.status)
            .field("url", &self.url)
            .field("error", &self.error)
            .field("password", &self.password.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

/// Position of a job in the provisioning state machine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ProvisioningState {
    Accepted,
    Deploying,
    Polling,
    Configuring,
    Ready,
    Failed,
}

impl ProvisioningState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, ProvisioningState::Ready | ProvisioningState::Failed)
    }
}

impl std::fmt::Display for ProvisioningState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ProvisioningState::Accepted => write!(f, "accepted"),
            ProvisioningState::Deploying => write!(f, "deploying"),
            ProvisioningState::Polling => write!(f, "polling"),
            ProvisioningState::Configuring => write!(f, "configuring"),
            ProvisioningState::Ready => write!(f, "ready"),
            ProvisioningState::Failed => write!(f, "failed"),
        }
    }
}
