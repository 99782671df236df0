//! Platform adapters
//!
//! Each [`StoreEngine`] is served by exactly one [`PlatformAdapter`], which
//! knows how to describe the engine's deployment, configure it once pods are
//! up, and pull its admin credential back out of the cluster.
//!
//! The [`AdapterRegistry`] is the fixed engine-to-adapter table used by the
//! provisioning driver.

mod medusa;
mod woocommerce;

pub use medusa::MedusaAdapter;
pub use woocommerce::WooCommerceAdapter;

use crate::command::CommandRunner;
use crate::error::ProvisionError;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;
use storeforge_types::StoreEngine;
use thiserror::Error;

/// Adapter capability errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AdapterError {
    #[error("{engine} adapter not yet implemented: {capability}")]
    NotImplemented {
        engine: StoreEngine,
        capability: &'static str,
    },
}

/// Classified result of post-deploy configuration.
///
/// `NotReady` means the application itself is still initializing and the
/// attempt should be retried within the poll budget; `Failed` is final.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigureOutcome {
    Configured,
    NotReady(String),
    Failed(String),
}

/// Helm chart dependency an engine's release pulls in
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChartDependency {
    pub name: String,
    pub version: String,
    pub repository: String,
    pub condition: String,
}

/// Per-engine provisioning behavior
#[async_trait]
pub trait PlatformAdapter: Send + Sync {
    /// Engine served by this adapter
    fn engine(&self) -> StoreEngine;

    /// Whether the adapter is more than a placeholder
    fn is_implemented(&self) -> bool {
        true
    }

    fn chart_dependency(&self) -> Option<ChartDependency>;

    /// Deployment values for a new store, as a nested key/value tree
    fn default_values(&self, store_name: &str, host: &str)
        -> Result<serde_json::Value, AdapterError>;

    /// Configure the running platform. Must be safe to call repeatedly.
    async fn configure(&self, namespace: &str, release: &str) -> ConfigureOutcome;

    /// Admin credential, if one can be retrieved. Never fails.
    async fn admin_password(&self, namespace: &str, release: &str) -> Option<String>;

    /// Label selector matching the platform's main pod
    fn pod_selector(&self, release: &str) -> Result<String, AdapterError>;

    /// Path appended to the host to form the store URL
    fn store_url_path(&self) -> &'static str;

    /// Application-level readiness, beyond pod status
    async fn is_platform_ready(&self, namespace: &str, release: &str) -> bool;
}

/// Engine to adapter table
#[derive(Default, Clone)]
pub struct AdapterRegistry {
    adapters: BTreeMap<StoreEngine, Arc<dyn PlatformAdapter>>,
}

impl AdapterRegistry {
    /// Empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry holding every built-in adapter
    pub fn builtin(runner: Arc<dyn CommandRunner>, kubectl_bin: &str) -> Self {
        let mut registry = Self::new();
        registry.register(Arc::new(
            WooCommerceAdapter::new(runner).with_kubectl_bin(kubectl_bin),
        ));
        registry.register(Arc::new(MedusaAdapter));
        registry
    }

    /// Register an adapter under its engine, replacing any previous one
    pub fn register(&mut self, adapter: Arc<dyn PlatformAdapter>) {
        self.adapters.insert(adapter.engine(), adapter);
    }

    pub fn resolve(&self, engine: StoreEngine) -> Result<Arc<dyn PlatformAdapter>, ProvisionError> {
        self.adapters
            .get(&engine)
            .cloned()
            .ok_or(ProvisionError::UnknownEngine(engine))
    }

    /// Registered adapters in engine order
    pub fn adapters(&self) -> impl Iterator<Item = &Arc<dyn PlatformAdapter>> {
        self.adapters.values()
    }
}
