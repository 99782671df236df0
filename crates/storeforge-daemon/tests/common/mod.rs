//! Shared fixtures for daemon API tests

#![allow(dead_code)]

use async_trait::async_trait;
use axum::Router;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use storeforge_daemon::{create_router, AppState};
use storeforge_provisioner::{
    AdapterRegistry, CallbackError, CommandError, CommandRunner, DeploymentTool, DriverSettings,
    ProvisioningDriver, ReadinessProber, StatusNotifier,
};
use storeforge_types::StatusPayload;

pub const TOKEN: &str = "intake-secret";

/// Runner that records invocations and returns empty output
#[derive(Default)]
pub struct CountingRunner {
    calls: AtomicUsize,
}

impl CountingRunner {
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl CommandRunner for CountingRunner {
    async fn run(&self, _program: &str, _args: &[String]) -> Result<String, CommandError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(String::new())
    }
}

/// Deployment tool recording installs and uninstalls
#[derive(Default)]
pub struct RecordingDeployer {
    pub uninstall_error: Option<String>,
    installs: AtomicUsize,
    uninstalls: Mutex<Vec<(String, String)>>,
}

impl RecordingDeployer {
    pub fn failing_uninstall(stderr: &str) -> Self {
        Self {
            uninstall_error: Some(stderr.to_string()),
            ..Self::default()
        }
    }

    pub fn installs(&self) -> usize {
        self.installs.load(Ordering::SeqCst)
    }

    pub fn uninstalls(&self) -> Vec<(String, String)> {
        self.uninstalls.lock().unwrap().clone()
    }
}

#[async_trait]
impl DeploymentTool for RecordingDeployer {
    async fn install(
        &self,
        _release: &str,
        _namespace: &str,
        _values_file: &Path,
    ) -> Result<String, CommandError> {
        self.installs.fetch_add(1, Ordering::SeqCst);
        Ok(String::new())
    }

    async fn uninstall(&self, release: &str, namespace: &str) -> Result<String, CommandError> {
        self.uninstalls
            .lock()
            .unwrap()
            .push((release.to_string(), namespace.to_string()));

        match &self.uninstall_error {
            Some(stderr) => Err(CommandError::Failed {
                program: "helm".to_string(),
                code: Some(1),
                stderr: stderr.clone(),
            }),
            None => Ok(format!("release \"{}\" uninstalled", release)),
        }
    }
}

/// Prober that never reports ready
#[derive(Default)]
pub struct NeverReady {
    calls: AtomicUsize,
}

impl NeverReady {
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ReadinessProber for NeverReady {
    async fn namespace_ready(&self, _namespace: &str) -> Result<bool, CommandError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(false)
    }
}

/// Notifier keeping every payload
#[derive(Default)]
pub struct RecordingNotifier {
    delivered: Mutex<Vec<(String, StatusPayload)>>,
}

impl RecordingNotifier {
    pub fn delivered(&self) -> Vec<(String, StatusPayload)> {
        self.delivered.lock().unwrap().clone()
    }
}

#[async_trait]
impl StatusNotifier for RecordingNotifier {
    async fn notify(&self, store_id: &str, payload: &StatusPayload) -> Result<(), CallbackError> {
        self.delivered
            .lock()
            .unwrap()
            .push((store_id.to_string(), payload.clone()));
        Ok(())
    }
}

pub struct TestApp {
    pub router: Router,
    pub runner: Arc<CountingRunner>,
    pub deployer: Arc<RecordingDeployer>,
    pub prober: Arc<NeverReady>,
    pub notifier: Arc<RecordingNotifier>,
}

pub fn settings(mock: bool) -> DriverSettings {
    DriverSettings {
        poll_attempts: 2,
        poll_interval: Duration::from_millis(10),
        mock,
    }
}

pub fn app_with(deployer: RecordingDeployer, notifier: Arc<dyn StatusNotifier>, mock: bool) -> (Router, Arc<RecordingDeployer>, Arc<NeverReady>, Arc<CountingRunner>) {
    let runner = Arc::new(CountingRunner::default());
    let deployer = Arc::new(deployer);
    let prober = Arc::new(NeverReady::default());

    let driver = Arc::new(ProvisioningDriver::new(
        Arc::new(AdapterRegistry::builtin(runner.clone(), "kubectl")),
        deployer.clone(),
        prober.clone(),
        notifier,
        settings(mock),
    ));

    let router = create_router(AppState::new(driver, TOKEN));
    (router, deployer, prober, runner)
}

pub fn app(mock: bool) -> TestApp {
    app_for(RecordingDeployer::default(), mock)
}

pub fn app_for(deployer: RecordingDeployer, mock: bool) -> TestApp {
    let notifier = Arc::new(RecordingNotifier::default());
    let (router, deployer, prober, runner) = app_with(deployer, notifier.clone(), mock);
    TestApp {
        router,
        runner,
        deployer,
        prober,
        notifier,
    }
}

pub fn job_body(name: &str, engine: &str) -> serde_json::Value {
    serde_json::json!({
        "store_id": format!("store-{}", name),
        "name": name,
        "engine": engine,
        "host": format!("{}.stores.local", name),
        "base_url": format!("http://{}.stores.local", name),
        "store_url": format!("http://{}.stores.local/shop/", name),
        "creator_id": "user-1",
    })
}

/// Wait until `check` holds, yielding to background jobs in between
pub async fn eventually<F: Fn() -> bool>(check: F) -> bool {
    for _ in 0..200 {
        if check() {
            return true;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    check()
}
