//! Store engines
//!
//! The set of e-commerce platforms Storeforge knows about is closed: each
//! engine maps to exactly one platform adapter.

use crate::error::JobError;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// E-commerce platform a store runs on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreEngine {
    /// WordPress with the WooCommerce plugin
    WooCommerce,

    /// Medusa headless commerce
    Medusa,
}

impl StoreEngine {
    /// Every engine, in a stable order
    pub const ALL: [StoreEngine; 2] = [StoreEngine::WooCommerce, StoreEngine::Medusa];

    /// Wire identifier for this engine
    pub fn as_str(&self) -> &'static str {
        match self {
            StoreEngine::WooCommerce => "woocommerce",
            StoreEngine::Medusa => "medusa",
        }
    }
}

impl std::fmt::Display for StoreEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for StoreEngine {
    type Err = JobError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "woocommerce" => Ok(StoreEngine::WooCommerce),
            "medusa" => Ok(StoreEngine::Medusa),
            other => Err(JobError::UnknownEngine(other.to_string())),
        }
    }
}
