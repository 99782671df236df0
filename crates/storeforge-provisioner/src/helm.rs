//! Helm-backed deployment tool

use crate::command::{args, CommandError, CommandRunner};
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{info, instrument};

/// Installs and removes store releases on the cluster
#[async_trait]
pub trait DeploymentTool: Send + Sync {
    /// Install `release` into `namespace`, upgrading it in place if it
    /// already exists. The namespace is created when absent.
    async fn install(
        &self,
        release: &str,
        namespace: &str,
        values_file: &Path,
    ) -> Result<String, CommandError>;

    /// Remove `release` and all of its resources from `namespace`
    async fn uninstall(&self, release: &str, namespace: &str) -> Result<String, CommandError>;
}

/// [`DeploymentTool`] driving the `helm` CLI against the store chart
pub struct HelmDeploymentTool {
    runner: Arc<dyn CommandRunner>,
    helm_bin: String,
    chart_path: PathBuf,
    base_values: Option<PathBuf>,
}

impl HelmDeploymentTool {
    pub fn new(runner: Arc<dyn CommandRunner>, chart_path: impl Into<PathBuf>) -> Self {
        Self {
            runner,
            helm_bin: "helm".to_string(),
            chart_path: chart_path.into(),
            base_values: None,
        }
    }

    pub fn with_helm_bin(mut self, helm_bin: impl Into<String>) -> Self {
        self.helm_bin = helm_bin.into();
        self
    }

    /// Values file applied before the generated one, so generated values win
    pub fn with_base_values(mut self, base_values: Option<PathBuf>) -> Self {
        self.base_values = base_values;
        self
    }

    pub fn install_args(&self, release: &str, namespace: &str, values_file: &Path) -> Vec<String> {
        let chart = self.chart_path.to_string_lossy();
        let mut cmd = args([
            "upgrade",
            "--install",
            release,
            chart.as_ref(),
            "--namespace",
            namespace,
            "--create-namespace",
        ]);

        if let Some(base) = &self.base_values {
            cmd.push("-f".to_string());
            cmd.push(base.to_string_lossy().into_owned());
        }

        cmd.push("-f".to_string());
        cmd.push(values_file.to_string_lossy().into_owned());
        cmd
    }

    pub fn uninstall_args(&self, release: &str, namespace: &str) -> Vec<String> {
        args(["uninstall", release, "-n", namespace])
    }
}

#[async_trait]
impl DeploymentTool for HelmDeploymentTool {
    #[instrument(skip(self, values_file))]
    async fn install(
        &self,
        release: &str,
        namespace: &str,
        values_file: &Path,
    ) -> Result<String, CommandError> {
        let cmd = self.install_args(release, namespace, values_file);
        let output = self.runner.run(&self.helm_bin, &cmd).await?;
        info!("Helm release installed");
        Ok(output)
    }

    #[instrument(skip(self))]
    async fn uninstall(&self, release: &str, namespace: &str) -> Result<String, CommandError> {
        let cmd = self.uninstall_args(release, namespace);
        let output = self.runner.run(&self.helm_bin, &cmd).await?;
        info!("Helm release uninstalled");
        Ok(output)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::ScriptedRunner;

    fn tool(runner: Arc<ScriptedRunner>) -> HelmDeploymentTool {
        HelmDeploymentTool::new(runner, "/charts/store")
    }

    #[tokio::test]
    async fn test_install_uses_upgrade_install() {
        let runner = Arc::new(ScriptedRunner::new());
        let helm = tool(runner.clone());

        helm.install("acme", "acme", Path::new("/tmp/values.yaml"))
            .await
            .unwrap();

        let calls = runner.calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].0, "helm");
        assert_eq!(
            calls[0].1,
            args([
                "upgrade",
                "--install",
                "acme",
                "/charts/store",
                "--namespace",
                "acme",
                "--create-namespace",
                "-f",
                "/tmp/values.yaml",
            ])
        );
    }

    #[tokio::test]
    async fn test_repeated_install_is_an_upsert() {
        let runner = Arc::new(ScriptedRunner::new());
        let helm = tool(runner.clone());
        let values = Path::new("/tmp/values.yaml");

        helm.install("acme", "acme", values).await.unwrap();
        helm.install("acme", "acme", values).await.unwrap();

        let calls = runner.calls();
        assert_eq!(calls.len(), 2);
        assert_eq!(calls[0], calls[1]);
    }

    #[test]
    fn test_base_values_precede_generated_values() {
        let helm = tool(Arc::new(ScriptedRunner::new()))
            .with_base_values(Some(PathBuf::from("/charts/store/values-prod.yaml")));

        let cmd = helm.install_args("acme", "shop", Path::new("/tmp/gen.yaml"));
        let files: Vec<_> = cmd
            .windows(2)
            .filter(|w| w[0] == "-f")
            .map(|w| w[1].as_str())
            .collect();
        assert_eq!(files, vec!["/charts/store/values-prod.yaml", "/tmp/gen.yaml"]);
    }

    #[tokio::test]
    async fn test_install_failure_carries_stderr() {
        let runner = Arc::new(
            ScriptedRunner::new().fail_on("upgrade", "Error: chart not found"),
        );
        let helm = tool(runner).with_helm_bin("/usr/local/bin/helm");

        let err = helm
            .install("acme", "acme", Path::new("/tmp/v.yaml"))
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "Error: chart not found");
    }

    #[tokio::test]
    async fn test_uninstall_args() {
        let runner = Arc::new(ScriptedRunner::new());
        let helm = tool(runner.clone());

        helm.uninstall("acme", "shop").await.unwrap();
        assert_eq!(runner.calls()[0].1, args(["uninstall", "acme", "-n", "shop"]));
    }
}
