//! In-crate fakes for the collaborator traits

use crate::adapters::{AdapterError, ChartDependency, ConfigureOutcome, PlatformAdapter};
use crate::callback::{CallbackError, StatusNotifier};
use crate::command::{CommandError, CommandRunner};
use crate::helm::DeploymentTool;
use crate::readiness::ReadinessProber;
use async_trait::async_trait;
use std::collections::VecDeque;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use storeforge_types::{StatusPayload, StoreEngine};

/// Command runner answering from substring rules on the joined argument list
#[derive(Default)]
pub struct ScriptedRunner {
    rules: Vec<(String, Result<String, String>)>,
    calls: Mutex<Vec<(String, Vec<String>)>>,
}

impl ScriptedRunner {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn respond_on(mut self, pattern: &str, stdout: &str) -> Self {
        self.rules.push((pattern.to_string(), Ok(stdout.to_string())));
        self
    }

    pub fn fail_on(mut self, pattern: &str, stderr: &str) -> Self {
        self.rules.push((pattern.to_string(), Err(stderr.to_string())));
        self
    }

    pub fn calls(&self) -> Vec<(String, Vec<String>)> {
        self.calls.lock().unwrap().clone()
    }

    pub fn joined_calls(&self) -> Vec<String> {
        self.calls().into_iter().map(|(_, a)| a.join(" ")).collect()
    }
}

#[async_trait]
impl CommandRunner for ScriptedRunner {
    async fn run(&self, program: &str, args: &[String]) -> Result<String, CommandError> {
        self.calls
            .lock()
            .unwrap()
            .push((program.to_string(), args.to_vec()));

        let joined = args.join(" ");
        for (pattern, response) in &self.rules {
            if joined.contains(pattern.as_str()) {
                return response.clone().map_err(|stderr| CommandError::Failed {
                    program: program.to_string(),
                    code: Some(1),
                    stderr,
                });
            }
        }
        Ok(String::new())
    }
}

/// Deployment tool recording installs and the rendered values
#[derive(Default)]
pub struct FakeDeployer {
    pub fail_with: Option<String>,
    installs: Mutex<Vec<(String, String, String)>>,
}

impl FakeDeployer {
    pub fn failing(stderr: &str) -> Self {
        Self {
            fail_with: Some(stderr.to_string()),
            ..Self::default()
        }
    }

    /// (release, namespace, values yaml) per install call
    pub fn installs(&self) -> Vec<(String, String, String)> {
        self.installs.lock().unwrap().clone()
    }
}

#[async_trait]
impl DeploymentTool for FakeDeployer {
    async fn install(
        &self,
        release: &str,
        namespace: &str,
        values_file: &Path,
    ) -> Result<String, CommandError> {
        let values = std::fs::read_to_string(values_file).unwrap_or_default();
        self.installs
            .lock()
            .unwrap()
            .push((release.to_string(), namespace.to_string(), values));

        match &self.fail_with {
            Some(stderr) => Err(CommandError::Failed {
                program: "helm".to_string(),
                code: Some(1),
                stderr: stderr.clone(),
            }),
            None => Ok("Release has been upgraded. Happy Helming!".to_string()),
        }
    }

    async fn uninstall(&self, _release: &str, _namespace: &str) -> Result<String, CommandError> {
        Ok(String::new())
    }
}

/// Prober replaying a scripted sequence, then repeating `fallback`
pub struct FakeProber {
    script: Mutex<VecDeque<Result<bool, String>>>,
    fallback: bool,
    calls: AtomicUsize,
}

impl FakeProber {
    pub fn always(ready: bool) -> Self {
        Self::scripted(Vec::new(), ready)
    }

    pub fn scripted(script: Vec<Result<bool, String>>, fallback: bool) -> Self {
        Self {
            script: Mutex::new(script.into()),
            fallback,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ReadinessProber for FakeProber {
    async fn namespace_ready(&self, _namespace: &str) -> Result<bool, CommandError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match self.script.lock().unwrap().pop_front() {
            Some(Ok(ready)) => Ok(ready),
            Some(Err(stderr)) => Err(CommandError::Failed {
                program: "kubectl".to_string(),
                code: Some(1),
                stderr,
            }),
            None => Ok(self.fallback),
        }
    }
}

/// Notifier keeping every delivered payload
#[derive(Default)]
pub struct RecordingNotifier {
    pub reject_with: Option<u16>,
    delivered: Mutex<Vec<(String, StatusPayload)>>,
}

impl RecordingNotifier {
    pub fn rejecting(status: u16) -> Self {
        Self {
            reject_with: Some(status),
            ..Self::default()
        }
    }

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

        match self.reject_with {
            Some(status) => Err(CallbackError::Rejected {
                status,
                body: "backend unavailable".to_string(),
            }),
            None => Ok(()),
        }
    }
}

/// Adapter replaying scripted configure outcomes
pub struct FakeAdapter {
    pub engine: StoreEngine,
    pub password: Option<String>,
    pub panic_on_configure: bool,
    outcomes: Mutex<VecDeque<ConfigureOutcome>>,
    configure_calls: AtomicUsize,
}

impl FakeAdapter {
    pub fn new(engine: StoreEngine, outcomes: Vec<ConfigureOutcome>) -> Self {
        Self {
            engine,
            password: Some("wp-admin-pass".to_string()),
            panic_on_configure: false,
            outcomes: Mutex::new(outcomes.into()),
            configure_calls: AtomicUsize::new(0),
        }
    }

    pub fn configure_calls(&self) -> usize {
        self.configure_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl PlatformAdapter for FakeAdapter {
    fn engine(&self) -> StoreEngine {
        self.engine
    }

    fn chart_dependency(&self) -> Option<ChartDependency> {
        None
    }

    fn default_values(&self, store_name: &str, host: &str) -> Result<serde_json::Value, AdapterError> {
        Ok(serde_json::json!({ "store": { "name": store_name, "host": host } }))
    }

    async fn configure(&self, _namespace: &str, _release: &str) -> ConfigureOutcome {
        self.configure_calls.fetch_add(1, Ordering::SeqCst);
        if self.panic_on_configure {
            panic!("adapter blew up");
        }
        self.outcomes
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or(ConfigureOutcome::Configured)
    }

    async fn admin_password(&self, _namespace: &str, _release: &str) -> Option<String> {
        self.password.clone()
    }

    fn pod_selector(&self, release: &str) -> Result<String, AdapterError> {
        Ok(format!("app.kubernetes.io/instance={}", release))
    }

    fn store_url_path(&self) -> &'static str {
        "/shop/"
    }

    async fn is_platform_ready(&self, _namespace: &str, _release: &str) -> bool {
        true
    }
}
