//! Storeforge orchestrator daemon
//!
//! Accepts store provisioning jobs over HTTP, deploys each store with Helm,
//! waits for it to come up, configures it and reports the outcome back to the
//! backend.

use anyhow::Context;
use clap::Parser;
use std::path::PathBuf;
use storeforge_daemon::config::parse_switch;
use storeforge_daemon::{ConfigOverrides, OrchestratorConfig, Server};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Storeforge orchestrator CLI
#[derive(Parser)]
#[command(name = "storeforged")]
#[command(about = "Storeforge - e-commerce store provisioning orchestrator", long_about = None)]
#[command(version)]
struct Cli {
    /// Configuration file path
    #[arg(short, long, env = "STOREFORGE_CONFIG")]
    config: Option<String>,

    /// Listen address
    #[arg(short, long, env = "ORCH_LISTEN_ADDR")]
    listen: Option<String>,

    /// Backend API base URL for status callbacks
    #[arg(long, env = "BACKEND_API_BASE")]
    backend_api_base: Option<String>,

    /// Shared secret expected on job submissions
    #[arg(long, env = "ORCHESTRATOR_TOKEN", hide_env_values = true)]
    token: Option<String>,

    /// Token sent on status callbacks (defaults to the intake token)
    #[arg(long, env = "ORCHESTRATOR_CALLBACK_TOKEN", hide_env_values = true)]
    callback_token: Option<String>,

    /// Readiness attempts before a job times out
    #[arg(long, env = "ORCH_POLL_ATTEMPTS")]
    poll_attempts: Option<u32>,

    /// Seconds between readiness attempts
    #[arg(long, env = "ORCH_POLL_INTERVAL")]
    poll_interval: Option<u64>,

    /// Report READY without deploying anything
    #[arg(
        long,
        env = "ORCH_MOCK",
        value_parser = parse_switch,
        num_args = 0..=1,
        default_missing_value = "true"
    )]
    mock: Option<bool>,

    /// Application environment (`production` selects production chart values)
    #[arg(long, env = "APP_ENV")]
    app_env: Option<String>,

    /// Base values file layered under the generated store values
    #[arg(long, env = "STORE_VALUES_FILE")]
    values_file: Option<PathBuf>,

    /// Store chart location
    #[arg(long, env = "STORE_CHART_PATH")]
    chart_path: Option<PathBuf>,

    /// Log level
    #[arg(long, env = "STOREFORGE_LOG_LEVEL")]
    log_level: Option<String>,

    /// Enable JSON logging
    #[arg(
        long = "log-json",
        env = "STOREFORGE_LOG_JSON",
        value_parser = parse_switch,
        num_args = 0..=1,
        default_missing_value = "true"
    )]
    json: Option<bool>,
}

impl Cli {
    fn overrides(&self) -> ConfigOverrides {
        ConfigOverrides {
            listen_addr: self.listen.clone(),
            api_base: self.backend_api_base.clone(),
            intake_token: self.token.clone(),
            callback_token: self.callback_token.clone(),
            poll_attempts: self.poll_attempts,
            poll_interval_secs: self.poll_interval,
            mock: self.mock,
            app_env: self.app_env.clone(),
            store_values_file: self.values_file.clone(),
            chart_path: self.chart_path.clone(),
            log_level: self.log_level.clone(),
            log_json: self.json,
        }
    }
}

fn init_tracing(level: &str, json: bool) {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| level.into());

    if json {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_subscriber::fmt::layer())
            .init();
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut config =
        OrchestratorConfig::load(cli.config.as_deref()).context("failed to load configuration")?;
    config.apply_overrides(cli.overrides())?;

    init_tracing(&config.logging.level, config.logging.json);

    println!(
        r#"
  Storeforge - store provisioning orchestrator
  Version: {}
  Listening: {}
  Backend: {}
  Mock: {}
"#,
        env!("CARGO_PKG_VERSION"),
        config.server.listen_addr,
        config.backend.api_base,
        config.provisioning.mock
    );

    let server = Server::new(config)?;
    server.run().await?;
    Ok(())
}
