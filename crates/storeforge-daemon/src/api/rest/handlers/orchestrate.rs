//! Job intake

use crate::api::rest::state::AppState;
use crate::auth::authorize;
use crate::error::{ApiError, ApiResult};
use axum::{
    extract::{rejection::JsonRejection, State},
    http::{HeaderMap, StatusCode},
    Json,
};
use serde::Serialize;
use storeforge_types::{OrchestrateRequest, OrchestrationJob};

/// Intake acknowledgement
#[derive(Debug, Serialize)]
pub struct AcceptedResponse {
    pub ok: bool,
    pub accepted: bool,
    pub store_id: String,
}

/// Accept a provisioning job and run it in the background.
///
/// The token is checked before the body is looked at, so an unauthenticated
/// caller learns nothing about validation.
pub async fn orchestrate(
    State(state): State<AppState>,
    headers: HeaderMap,
    payload: Result<Json<OrchestrateRequest>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<AcceptedResponse>)> {
    authorize(&headers, &state.intake_token)?;

    let Json(request) = payload.map_err(|e| ApiError::Validation(e.body_text()))?;
    let job = OrchestrationJob::try_from(request)?;

    tracing::info!(
        store_id = %job.store_id,
        release = %job.name,
        namespace = %job.namespace,
        engine = %job.engine,
        "Accepted provisioning job"
    );

    let store_id = job.store_id.clone();
    state.driver.spawn(job);

    Ok((
        StatusCode::ACCEPTED,
        Json(AcceptedResponse {
            ok: true,
            accepted: true,
            store_id,
        }),
    ))
}
