//! Medusa adapter
//!
//! Medusa is a recognized engine but its deployment is not built yet. The
//! adapter stays registered so jobs for it fail with a clear message instead
//! of an unknown-engine error.

use super::{AdapterError, ChartDependency, ConfigureOutcome, PlatformAdapter};
use async_trait::async_trait;
use storeforge_types::StoreEngine;

/// Placeholder adapter for Medusa stores
#[derive(Debug, Clone, Copy, Default)]
pub struct MedusaAdapter;

impl MedusaAdapter {
    fn not_implemented(capability: &'static str) -> AdapterError {
        AdapterError::NotImplemented {
            engine: StoreEngine::Medusa,
            capability,
        }
    }
}

#[async_trait]
impl PlatformAdapter for MedusaAdapter {
    fn engine(&self) -> StoreEngine {
        StoreEngine::Medusa
    }

    fn is_implemented(&self) -> bool {
        false
    }

    fn chart_dependency(&self) -> Option<ChartDependency> {
        None
    }

    fn default_values(
        &self,
        _store_name: &str,
        _host: &str,
    ) -> Result<serde_json::Value, AdapterError> {
        Err(Self::not_implemented("default values"))
    }

    async fn configure(&self, _namespace: &str, _release: &str) -> ConfigureOutcome {
        ConfigureOutcome::Failed(Self::not_implemented("configure").to_string())
    }

    async fn admin_password(&self, _namespace: &str, _release: &str) -> Option<String> {
        None
    }

    fn pod_selector(&self, _release: &str) -> Result<String, AdapterError> {
        Err(Self::not_implemented("pod selector"))
    }

    fn store_url_path(&self) -> &'static str {
        "/"
    }

    async fn is_platform_ready(&self, _namespace: &str, _release: &str) -> bool {
        false
    }
}
