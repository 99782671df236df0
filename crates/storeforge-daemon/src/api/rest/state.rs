//! Application state shared across handlers

use std::sync::Arc;
use storeforge_provisioner::ProvisioningDriver;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    /// Runs accepted jobs
    pub driver: Arc<ProvisioningDriver>,

    /// Shared secret expected on intake and teardown
    pub intake_token: Arc<str>,

    /// Daemon version
    pub version: String,

    /// Daemon start time
    pub started_at: chrono::DateTime<chrono::Utc>,
}

impl AppState {
    pub fn new(driver: Arc<ProvisioningDriver>, intake_token: impl Into<Arc<str>>) -> Self {
        Self {
            driver,
            intake_token: intake_token.into(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            started_at: chrono::Utc::now(),
        }
    }

    /// Get uptime as a human-readable string
    pub fn uptime(&self) -> String {
        let secs = (chrono::Utc::now() - self.started_at).num_seconds();

        if secs < 60 {
            format!("{}s", secs)
        } else if secs < 3600 {
            format!("{}m {}s", secs / 60, secs % 60)
        } else if secs < 86400 {
            format!("{}h {}m", secs / 3600, (secs % 3600) / 60)
        } else {
            format!("{}d {}h", secs / 86400, (secs % 86400) / 3600)
        }
    }
}
