//! Server setup and lifecycle management

use crate::api::{create_router, AppState};
use crate::config::OrchestratorConfig;
use crate::error::{DaemonError, DaemonResult};
use std::sync::Arc;
use std::time::Duration;
use storeforge_provisioner::{
    AdapterRegistry, CommandRunner, HelmDeploymentTool, HttpCallbackNotifier,
    KubectlReadinessProber, ProcessCommandRunner, ProvisioningDriver,
};
use tokio::net::TcpListener;

/// Storeforge orchestrator server
pub struct Server {
    config: OrchestratorConfig,
    driver: Arc<ProvisioningDriver>,
}

impl Server {
    /// Wire the provisioning collaborators from a validated configuration
    pub fn new(config: OrchestratorConfig) -> DaemonResult<Self> {
        config.validate()?;

        let provisioning = &config.provisioning;
        let runner: Arc<dyn CommandRunner> = Arc::new(ProcessCommandRunner::new(
            Duration::from_secs(provisioning.command_timeout_secs),
        ));

        let adapters = AdapterRegistry::builtin(Arc::clone(&runner), &provisioning.kubectl_bin);

        let base_values = config.base_values_file();
        if let Some(values) = &base_values {
            tracing::info!(values = %values.display(), "Using base values file");
        }
        let deployer = HelmDeploymentTool::new(Arc::clone(&runner), &provisioning.chart_path)
            .with_helm_bin(&provisioning.helm_bin)
            .with_base_values(base_values);

        let prober = KubectlReadinessProber::new(runner)
            .with_kubectl_bin(&provisioning.kubectl_bin)
            .with_sentinel(&provisioning.readiness_sentinel);

        let notifier = HttpCallbackNotifier::new(
            &config.backend.api_base,
            config.callback_token(),
            Duration::from_secs(config.backend.timeout_secs),
        )?;

        let driver = Arc::new(ProvisioningDriver::new(
            Arc::new(adapters),
            Arc::new(deployer),
            Arc::new(prober),
            Arc::new(notifier),
            config.driver_settings(),
        ));

        Ok(Self { config, driver })
    }

    pub fn state(&self) -> AppState {
        AppState::new(
            Arc::clone(&self.driver),
            self.config.auth.intake_token.as_str(),
        )
    }

    /// Run the server until Ctrl+C or SIGTERM. In-flight jobs are abandoned.
    pub async fn run(self) -> DaemonResult<()> {
        let addr = self.config.server.listen_addr;
        let app = create_router(self.state());

        let listener = TcpListener::bind(addr).await?;

        tracing::info!(
            addr = %addr,
            backend = %self.config.backend.api_base,
            mock = self.config.provisioning.mock,
            "Storeforge orchestrator listening"
        );

        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown_signal())
            .await
            .map_err(|e| DaemonError::Server(e.to_string()))?;

        tracing::info!("Storeforge orchestrator shutting down");
        Ok(())
    }
}

/// Graceful shutdown signal handler
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C, initiating graceful shutdown");
        }
        _ = terminate => {
            tracing::info!("Received terminate signal, initiating graceful shutdown");
        }
    }
}
