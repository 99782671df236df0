//! Backend status callbacks
//!
//! The orchestrator reports the outcome of every job to the backend that
//! submitted it. Delivery is attempted once; a failed delivery is logged and
//! never changes the job outcome.

use async_trait::async_trait;
use reqwest::{Client, Url};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use storeforge_types::StatusPayload;
use thiserror::Error;
use tracing::{debug, error, instrument, warn};

/// Shared-secret header used on intake and on callbacks
pub const TOKEN_HEADER: &str = "X-Orchestrator-Token";

/// Callback delivery errors
#[derive(Debug, Error)]
pub enum CallbackError {
    #[error("Callback transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Backend rejected status update with {status}: {body}")]
    Rejected { status: u16, body: String },

    #[error("Invalid backend base URL: {0}")]
    InvalidBaseUrl(String),
}

/// Delivers status payloads to the backend
#[async_trait]
pub trait StatusNotifier: Send + Sync {
    async fn notify(&self, store_id: &str, payload: &StatusPayload) -> Result<(), CallbackError>;
}

/// [`StatusNotifier`] posting to `{api_base}/stores/{store_id}/status`
pub struct HttpCallbackNotifier {
    client: Client,
    api_base: Url,
    token: String,
}

impl HttpCallbackNotifier {
    pub fn new(api_base: &str, token: impl Into<String>, timeout: Duration) -> Result<Self, CallbackError> {
        let api_base = Url::parse(api_base.trim_end_matches('/'))
            .map_err(|e| CallbackError::InvalidBaseUrl(format!("{}: {}", api_base, e)))?;

        if api_base.cannot_be_a_base() {
            return Err(CallbackError::InvalidBaseUrl(api_base.to_string()));
        }

        let client = Client::builder().timeout(timeout).build()?;

        Ok(Self {
            client,
            api_base,
            token: token.into(),
        })
    }

    /// Status endpoint for `store_id`. The id is pushed as a single path
    /// segment so it is percent-encoded rather than interpreted.
    pub fn status_url(&self, store_id: &str) -> Result<Url, CallbackError> {
        let mut url = self.api_base.clone();
        url.path_segments_mut()
            .map_err(|_| CallbackError::InvalidBaseUrl(self.api_base.to_string()))?
            .pop_if_empty()
            .extend(["stores", store_id, "status"]);
        Ok(url)
    }
}

#[async_trait]
impl StatusNotifier for HttpCallbackNotifier {
    #[instrument(skip(self, payload), fields(status = %payload.status))]
    async fn notify(&self, store_id: &str, payload: &StatusPayload) -> Result<(), CallbackError> {
        let url = self.status_url(store_id)?;

        let response = self
            .client
            .post(url)
            .header(TOKEN_HEADER, &self.token)
            .json(payload)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(CallbackError::Rejected {
                status: status.as_u16(),
                body,
            });
        }

        debug!("Status callback delivered");
        Ok(())
    }
}

/// Per-job guard ensuring at most one terminal status is dispatched
pub struct TerminalReporter {
    store_id: String,
    notifier: Arc<dyn StatusNotifier>,
    sent: AtomicBool,
}

impl TerminalReporter {
    pub fn new(store_id: impl Into<String>, notifier: Arc<dyn StatusNotifier>) -> Self {
        Self {
            store_id: store_id.into(),
            notifier,
            sent: AtomicBool::new(false),
        }
    }

    /// Dispatch `payload` if no terminal status went out yet.
    ///
    /// Returns `Ok(false)` when the report was dropped as a duplicate. A
    /// delivery failure still counts as dispatched.
    pub async fn report(&self, payload: StatusPayload) -> Result<bool, CallbackError> {
        if payload.is_terminal() && self.sent.swap(true, Ordering::SeqCst) {
            warn!(
                store_id = %self.store_id,
                status = %payload.status,
                "Dropping duplicate terminal status"
            );
            return Ok(false);
        }

        match self.notifier.notify(&self.store_id, &payload).await {
            Ok(()) => Ok(true),
            Err(e) => {
                error!(store_id = %self.store_id, error = %e, "Status callback failed");
                Err(e)
            }
        }
    }

    pub fn has_reported(&self) -> bool {
        self.sent.load(Ordering::SeqCst)
    }
}
