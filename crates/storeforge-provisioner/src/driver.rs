//! Provisioning driver
//!
//! Runs one job through `ACCEPTED -> DEPLOYING -> POLLING -> CONFIGURING`
//! and ends in `READY` or `FAILED`. Whatever happens, exactly one terminal
//! status is reported for the job.

use crate::adapters::{AdapterRegistry, ConfigureOutcome, PlatformAdapter};
use crate::callback::{StatusNotifier, TerminalReporter};
use crate::error::{ProvisionError, Result};
use crate::helm::DeploymentTool;
use crate::readiness::ReadinessProber;
use std::io::Write;
use std::sync::Arc;
use std::time::Duration;
use storeforge_types::{OrchestrationJob, ProvisioningState, StatusPayload};
use tempfile::NamedTempFile;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, info_span, warn, Instrument};
use uuid::Uuid;

/// Placeholder credential reported in mock mode
pub const MOCK_PASSWORD: &str = "mock-password";

const PANIC_DIAGNOSTIC: &str = "provisioning task panicked";

/// Driver tuning
#[derive(Debug, Clone)]
pub struct DriverSettings {
    /// Readiness attempts before giving up
    pub poll_attempts: u32,

    /// Delay after every unsuccessful attempt
    pub poll_interval: Duration,

    /// Report READY immediately without touching the cluster
    pub mock: bool,
}

impl Default for DriverSettings {
    fn default() -> Self {
        Self {
            poll_attempts: 30,
            poll_interval: Duration::from_secs(10),
            mock: false,
        }
    }
}

/// Final result of a job
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JobOutcome {
    Ready { url: String, password: Option<String> },
    Failed { error: String },
}

impl JobOutcome {
    pub fn state(&self) -> ProvisioningState {
        match self {
            JobOutcome::Ready { .. } => ProvisioningState::Ready,
            JobOutcome::Failed { .. } => ProvisioningState::Failed,
        }
    }

    pub fn to_payload(&self) -> StatusPayload {
        match self {
            JobOutcome::Ready { url, password } => StatusPayload::ready(url.clone(), password.clone()),
            JobOutcome::Failed { error } => StatusPayload::failed(error.clone()),
        }
    }
}

/// Drives accepted jobs to a terminal state
pub struct ProvisioningDriver {
    adapters: Arc<AdapterRegistry>,
    deployer: Arc<dyn DeploymentTool>,
    prober: Arc<dyn ReadinessProber>,
    notifier: Arc<dyn StatusNotifier>,
    settings: DriverSettings,
}

impl ProvisioningDriver {
    pub fn new(
        adapters: Arc<AdapterRegistry>,
        deployer: Arc<dyn DeploymentTool>,
        prober: Arc<dyn ReadinessProber>,
        notifier: Arc<dyn StatusNotifier>,
        settings: DriverSettings,
    ) -> Self {
        Self {
            adapters,
            deployer,
            prober,
            notifier,
            settings,
        }
    }

    pub fn settings(&self) -> &DriverSettings {
        &self.settings
    }

    pub fn adapters(&self) -> &AdapterRegistry {
        &self.adapters
    }

    pub fn deployer(&self) -> &Arc<dyn DeploymentTool> {
        &self.deployer
    }

    /// Run `job` in the background.
    ///
    /// The job executes in an inner task supervised by the returned one. If
    /// the inner task panics before a terminal status went out, the
    /// supervisor reports FAILED in its place.
    pub fn spawn(self: &Arc<Self>, job: OrchestrationJob) -> JoinHandle<()> {
        let driver = Arc::clone(self);

        tokio::spawn(async move {
            let span = info_span!(
                "provision",
                store_id = %job.store_id,
                release = %job.name,
                namespace = %job.namespace,
                run_id = %Uuid::new_v4(),
            );
            let reporter = Arc::new(TerminalReporter::new(
                job.store_id.clone(),
                Arc::clone(&driver.notifier),
            ));

            let inner = {
                let driver = Arc::clone(&driver);
                let reporter = Arc::clone(&reporter);
                tokio::spawn(
                    async move {
                        driver.run(&job, &reporter).await;
                    }
                    .instrument(span.clone()),
                )
            };

            if let Err(e) = inner.await {
                async {
                    error!(error = %e, "Provisioning task aborted");
                    if !reporter.has_reported() {
                        let _ = reporter.report(StatusPayload::failed(PANIC_DIAGNOSTIC)).await;
                    }
                }
                .instrument(span)
                .await;
            }
        })
    }

    /// Execute `job` and report its terminal status through `reporter`
    pub async fn run(&self, job: &OrchestrationJob, reporter: &TerminalReporter) -> JobOutcome {
        transition(ProvisioningState::Accepted);
        let outcome = self.execute(job).await;

        match &outcome {
            JobOutcome::Ready { url, .. } => info!(url = %url, "Store ready"),
            JobOutcome::Failed { error } => error!(error = %error, "Provisioning failed"),
        }
        transition(outcome.state());

        // Delivery errors are logged by the reporter and never change the outcome
        let _ = reporter.report(outcome.to_payload()).await;
        outcome
    }

    /// Compute the outcome of `job` without reporting it
    pub async fn execute(&self, job: &OrchestrationJob) -> JobOutcome {
        if self.settings.mock {
            info!("Mock mode, skipping deployment");
            return JobOutcome::Ready {
                url: job.store_url.clone(),
                password: Some(MOCK_PASSWORD.to_string()),
            };
        }

        match self.provision(job).await {
            Ok(outcome) => outcome,
            Err(e) => JobOutcome::Failed {
                error: e.to_string(),
            },
        }
    }

    async fn provision(&self, job: &OrchestrationJob) -> Result<JobOutcome> {
        transition(ProvisioningState::Deploying);
        let adapter = self.adapters.resolve(job.engine)?;
        self.deploy(job, adapter.as_ref()).await?;

        transition(ProvisioningState::Polling);
        self.await_configured(job, adapter.as_ref()).await?;

        let password = adapter.admin_password(&job.namespace, &job.name).await;
        if password.is_none() {
            debug!("No admin credential available");
        }

        Ok(JobOutcome::Ready {
            url: job.store_url.clone(),
            password,
        })
    }

    async fn deploy(&self, job: &OrchestrationJob, adapter: &dyn PlatformAdapter) -> Result<()> {
        let values = adapter.default_values(&job.name, &job.host)?;
        let values_file = write_values_file(&values)?;

        let output = self
            .deployer
            .install(&job.name, &job.namespace, values_file.path())
            .await
            .map_err(ProvisionError::Deploy)?;
        debug!(output = %output.trim(), "Install finished");

        Ok(())
    }

    /// Poll readiness and configure the platform, within the attempt budget
    async fn await_configured(
        &self,
        job: &OrchestrationJob,
        adapter: &dyn PlatformAdapter,
    ) -> Result<()> {
        let attempts = self.settings.poll_attempts;

        for attempt in 1..=attempts {
            match self.prober.namespace_ready(&job.namespace).await {
                Ok(true) => {
                    transition(ProvisioningState::Configuring);
                    match adapter.configure(&job.namespace, &job.name).await {
                        ConfigureOutcome::Configured => return Ok(()),
                        ConfigureOutcome::NotReady(reason) => {
                            debug!(attempt, attempts, reason = %reason, "Platform not ready");
                        }
                        ConfigureOutcome::Failed(reason) => {
                            return Err(ProvisionError::Configure(reason));
                        }
                    }
                }
                Ok(false) => debug!(attempt, attempts, "Pods not ready"),
                Err(e) => warn!(attempt, attempts, error = %e, "Readiness probe failed"),
            }

            tokio::time::sleep(self.settings.poll_interval).await;
        }

        Err(ProvisionError::Timeout { attempts })
    }
}

fn transition(state: ProvisioningState) {
    info!(state = %state, terminal = state.is_terminal(), "Provisioning state changed");
}

/// Render deployment values to a temporary YAML file, removed on drop
fn write_values_file(values: &serde_json::Value) -> Result<NamedTempFile> {
    let mut file = tempfile::Builder::new()
        .prefix("storeforge-values-")
        .suffix(".yaml")
        .tempfile()?;
    serde_yaml::to_writer(&mut file, values)?;
    file.flush()?;
    Ok(file)
}
