//! Namespace readiness probing
//!
//! A namespace is ready when every pod it holds is `Running` with all of its
//! containers ready. Pods whose name contains the sentinel substring are
//! ignored; they carry their own readiness marker and must not gate polling.

use crate::command::{args, CommandError, CommandRunner};
use async_trait::async_trait;
use std::sync::Arc;
use tracing::{debug, instrument};

/// Default sentinel substring for the WooCommerce readiness job pod
pub const DEFAULT_READINESS_SENTINEL: &str = "woo-ready";

/// Reports whether a namespace's pods are up
#[async_trait]
pub trait ReadinessProber: Send + Sync {
    async fn namespace_ready(&self, namespace: &str) -> Result<bool, CommandError>;
}

/// One row of `kubectl get pods --no-headers`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PodLine<'a> {
    pub name: &'a str,
    pub ready_containers: u32,
    pub total_containers: u32,
    pub status: &'a str,
}

impl<'a> PodLine<'a> {
    /// Parse a `NAME READY STATUS RESTARTS AGE` row. Returns `None` for rows
    /// that do not have that shape.
    pub fn parse(line: &'a str) -> Option<Self> {
        let mut columns = line.split_whitespace();
        let name = columns.next()?;
        let (ready, total) = columns.next()?.split_once('/')?;
        let status = columns.next()?;

        Some(Self {
            name,
            ready_containers: ready.parse().ok()?,
            total_containers: total.parse().ok()?,
            status,
        })
    }

    pub fn is_ready(&self) -> bool {
        self.status == "Running"
            && self.total_containers > 0
            && self.ready_containers == self.total_containers
    }
}

/// Evaluate a pod listing. An empty listing is not ready: right after install
/// the pods may not have been created yet.
pub fn pods_ready(listing: &str, sentinel: &str) -> bool {
    let mut seen = 0usize;

    for line in listing.lines().filter(|l| !l.trim().is_empty()) {
        if !sentinel.is_empty() && line.contains(sentinel) {
            continue;
        }
        seen += 1;

        match PodLine::parse(line) {
            Some(pod) if pod.is_ready() => {}
            Some(pod) => {
                debug!(pod = pod.name, status = pod.status, "Pod not ready");
                return false;
            }
            None => {
                debug!(line, "Unrecognized pod line");
                return false;
            }
        }
    }

    seen > 0
}

/// [`ReadinessProber`] backed by `kubectl get pods`
pub struct KubectlReadinessProber {
    runner: Arc<dyn CommandRunner>,
    kubectl_bin: String,
    sentinel: String,
}

impl KubectlReadinessProber {
    pub fn new(runner: Arc<dyn CommandRunner>) -> Self {
        Self {
            runner,
            kubectl_bin: "kubectl".to_string(),
            sentinel: DEFAULT_READINESS_SENTINEL.to_string(),
        }
    }

    pub fn with_kubectl_bin(mut self, kubectl_bin: impl Into<String>) -> Self {
        self.kubectl_bin = kubectl_bin.into();
        self
    }

    pub fn with_sentinel(mut self, sentinel: impl Into<String>) -> Self {
        self.sentinel = sentinel.into();
        self
    }
}

#[async_trait]
impl ReadinessProber for KubectlReadinessProber {
    #[instrument(skip(self))]
    async fn namespace_ready(&self, namespace: &str) -> Result<bool, CommandError> {
        let cmd = args(["get", "pods", "-n", namespace, "--no-headers"]);
        let listing = self.runner.run(&self.kubectl_bin, &cmd).await?;
        Ok(pods_ready(&listing, &self.sentinel))
    }
}
