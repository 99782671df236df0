//! Configuration for storeforge-daemon
//!
//! Sources, lowest priority first: built-in defaults, an optional config
//! file, `STOREFORGE__<SECTION>__<KEY>` environment variables, then
//! [`ConfigOverrides`] collected from CLI flags and the legacy environment
//! names.

use crate::error::{DaemonError, DaemonResult};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;
use storeforge_provisioner::{DriverSettings, DEFAULT_READINESS_SENTINEL};

/// Main orchestrator configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OrchestratorConfig {
    #[serde(default)]
    pub server: ServerConfig,

    /// Owning backend (status callbacks)
    #[serde(default)]
    pub backend: BackendConfig,

    #[serde(default)]
    pub auth: AuthConfig,

    #[serde(default)]
    pub provisioning: ProvisioningConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Listen address
    pub listen_addr: SocketAddr,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen_addr: SocketAddr::from(([0, 0, 0, 0], 9000)),
        }
    }
}

/// Backend callback configuration
#[derive(Clone, Serialize, Deserialize)]
pub struct BackendConfig {
    /// Base URL of the backend API. Required.
    #[serde(default)]
    pub api_base: String,

    /// Token sent on callbacks. Falls back to the intake token.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub callback_token: Option<String>,

    /// Callback HTTP timeout in seconds
    #[serde(default = "default_backend_timeout")]
    pub timeout_secs: u64,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            api_base: String::new(),
            callback_token: None,
            timeout_secs: default_backend_timeout(),
        }
    }
}

impl std::fmt::Debug for BackendConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BackendConfig")
            .field("api_base", &self.api_base)
            .field(
                "callback_token",
                &self.callback_token.as_ref().map(|_| "<redacted>"),
            )
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

/// Intake authentication
#[derive(Clone, Default, Serialize, Deserialize)]
pub struct AuthConfig {
    /// Shared secret expected on job submissions. Required.
    #[serde(default)]
    pub intake_token: String,
}

impl std::fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthConfig")
            .field("intake_token", &"<redacted>")
            .finish()
    }
}

/// Provisioning behavior and cluster tooling
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProvisioningConfig {
    #[serde(default = "default_poll_attempts")]
    pub poll_attempts: u32,

    #[serde(default = "default_poll_interval")]
    pub poll_interval_secs: u64,

    /// Report READY without deploying anything
    #[serde(default)]
    pub mock: bool,

    /// `production` selects the chart's production values
    #[serde(default = "default_app_env")]
    pub app_env: String,

    /// Base values file overriding the chart defaults
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub store_values_file: Option<PathBuf>,

    #[serde(default = "default_chart_path")]
    pub chart_path: PathBuf,

    #[serde(default = "default_helm_bin")]
    pub helm_bin: String,

    #[serde(default = "default_kubectl_bin")]
    pub kubectl_bin: String,

    /// Upper bound for a single helm or kubectl invocation
    #[serde(default = "default_command_timeout")]
    pub command_timeout_secs: u64,

    /// Pods whose name contains this substring do not gate readiness
    #[serde(default = "default_readiness_sentinel")]
    pub readiness_sentinel: String,
}

impl Default for ProvisioningConfig {
    fn default() -> Self {
        Self {
            poll_attempts: default_poll_attempts(),
            poll_interval_secs: default_poll_interval(),
            mock: false,
            app_env: default_app_env(),
            store_values_file: None,
            chart_path: default_chart_path(),
            helm_bin: default_helm_bin(),
            kubectl_bin: default_kubectl_bin(),
            command_timeout_secs: default_command_timeout(),
            readiness_sentinel: default_readiness_sentinel(),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,

    /// JSON format
    #[serde(default)]
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: false,
        }
    }
}

// Default value helpers
fn default_backend_timeout() -> u64 {
    30
}

fn default_poll_attempts() -> u32 {
    30
}

fn default_poll_interval() -> u64 {
    10
}

fn default_app_env() -> String {
    "development".to_string()
}

fn default_chart_path() -> PathBuf {
    PathBuf::from("charts/store")
}

fn default_helm_bin() -> String {
    "helm".to_string()
}

fn default_kubectl_bin() -> String {
    "kubectl".to_string()
}

fn default_command_timeout() -> u64 {
    120
}

fn default_readiness_sentinel() -> String {
    DEFAULT_READINESS_SENTINEL.to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Highest-priority settings, from CLI flags or legacy environment names
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub listen_addr: Option<String>,
    pub api_base: Option<String>,
    pub intake_token: Option<String>,
    pub callback_token: Option<String>,
    pub poll_attempts: Option<u32>,
    pub poll_interval_secs: Option<u64>,
    pub mock: Option<bool>,
    pub app_env: Option<String>,
    pub store_values_file: Option<PathBuf>,
    pub chart_path: Option<PathBuf>,
    pub log_level: Option<String>,
    pub log_json: Option<bool>,
}

impl OrchestratorConfig {
    /// Load configuration from defaults, an optional file and the environment
    pub fn load(path: Option<&str>) -> Result<Self, config::ConfigError> {
        Self::load_with_env(path, None)
    }

    /// Same as [`load`](Self::load), reading `STOREFORGE__*` variables from
    /// `env` instead of the process environment when it is given.
    ///
    /// Values stay strings until deserialization so tokens such as `0012345`
    /// are not rewritten as numbers.
    fn load_with_env(
        path: Option<&str>,
        env: Option<config::Map<String, String>>,
    ) -> Result<Self, config::ConfigError> {
        let mut builder = config::Config::builder();

        builder = builder.add_source(config::Config::try_from(&OrchestratorConfig::default())?);

        if let Some(path) = path {
            builder = builder.add_source(config::File::with_name(path).required(true));
        }

        builder = builder.add_source(
            config::Environment::with_prefix("STOREFORGE")
                .prefix_separator("__")
                .separator("__")
                .source(env),
        );

        builder.build()?.try_deserialize()
    }

    /// Apply CLI / legacy environment overrides
    pub fn apply_overrides(&mut self, overrides: ConfigOverrides) -> DaemonResult<()> {
        if let Some(addr) = overrides.listen_addr {
            self.server.listen_addr = addr
                .parse()
                .map_err(|e| DaemonError::Config(format!("Invalid listen address {}: {}", addr, e)))?;
        }
        if let Some(api_base) = overrides.api_base {
            self.backend.api_base = api_base;
        }
        if let Some(token) = overrides.intake_token {
            self.auth.intake_token = token;
        }
        if let Some(token) = overrides.callback_token {
            self.backend.callback_token = Some(token);
        }
        if let Some(attempts) = overrides.poll_attempts {
            self.provisioning.poll_attempts = attempts;
        }
        if let Some(interval) = overrides.poll_interval_secs {
            self.provisioning.poll_interval_secs = interval;
        }
        if let Some(mock) = overrides.mock {
            self.provisioning.mock = mock;
        }
        if let Some(app_env) = overrides.app_env {
            self.provisioning.app_env = app_env;
        }
        if let Some(values) = overrides.store_values_file {
            self.provisioning.store_values_file = Some(values);
        }
        if let Some(chart) = overrides.chart_path {
            self.provisioning.chart_path = chart;
        }
        if let Some(level) = overrides.log_level {
            self.logging.level = level;
        }
        if let Some(json) = overrides.log_json {
            self.logging.json = json;
        }

        self.backend.api_base = self.backend.api_base.trim_end_matches('/').to_string();
        Ok(())
    }

    /// Reject configurations the daemon cannot start with
    pub fn validate(&self) -> DaemonResult<()> {
        let api_base = self.backend.api_base.trim();
        if api_base.is_empty() {
            return Err(DaemonError::Config(
                "backend.api_base (BACKEND_API_BASE) is required".to_string(),
            ));
        }
        if !(api_base.starts_with("http://") || api_base.starts_with("https://")) {
            return Err(DaemonError::Config(format!(
                "backend.api_base must be an http(s) URL, got {}",
                api_base
            )));
        }
        if self.auth.intake_token.is_empty() {
            return Err(DaemonError::Config(
                "auth.intake_token (ORCHESTRATOR_TOKEN) is required".to_string(),
            ));
        }
        if self.provisioning.poll_attempts == 0 {
            return Err(DaemonError::Config(
                "provisioning.poll_attempts must be at least 1".to_string(),
            ));
        }
        if let Some(values) = &self.provisioning.store_values_file {
            if !values.is_file() {
                return Err(DaemonError::Config(format!(
                    "store values file not found: {}",
                    values.display()
                )));
            }
        }
        Ok(())
    }

    /// Token sent on status callbacks
    pub fn callback_token(&self) -> &str {
        self.backend
            .callback_token
            .as_deref()
            .filter(|t| !t.is_empty())
            .unwrap_or(&self.auth.intake_token)
    }

    /// Values file layered under the generated per-store values.
    ///
    /// An explicit `store_values_file` always wins. Otherwise the chart's own
    /// environment file is used if it exists.
    pub fn base_values_file(&self) -> Option<PathBuf> {
        if let Some(values) = &self.provisioning.store_values_file {
            return Some(values.clone());
        }

        let file = if self.provisioning.app_env.eq_ignore_ascii_case("production") {
            "values-prod.yaml"
        } else {
            "values.yaml"
        };
        let candidate = self.provisioning.chart_path.join(file);
        candidate.is_file().then_some(candidate)
    }

    pub fn driver_settings(&self) -> DriverSettings {
        DriverSettings {
            poll_attempts: self.provisioning.poll_attempts,
            poll_interval: Duration::from_secs(self.provisioning.poll_interval_secs),
            mock: self.provisioning.mock,
        }
    }
}

/// Parse an on/off switch as accepted by `ORCH_MOCK`
pub fn parse_switch(value: &str) -> Result<bool, String> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "" | "0" | "false" | "no" | "off" => Ok(false),
        other => Err(format!("expected one of 1/true/yes/on or 0/false/no/off, got {}", other)),
    }
}
