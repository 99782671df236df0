//! Release teardown

use crate::api::rest::state::AppState;
use crate::auth::authorize;
use crate::error::{ApiError, ApiResult};
use axum::{
    extract::{Path, Query, State},
    http::HeaderMap,
    Json,
};
use serde::{Deserialize, Serialize};
use storeforge_types::validate_release;

/// Teardown query parameters
#[derive(Debug, Default, Deserialize)]
pub struct TeardownQuery {
    /// Defaults to the release name
    #[serde(default)]
    pub namespace: Option<String>,
}

/// Teardown result
#[derive(Debug, Serialize)]
pub struct TeardownResponse {
    pub ok: bool,
    pub release: String,
    pub namespace: String,
}

/// Uninstall a store release. Runs synchronously.
pub async fn teardown(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(name): Path<String>,
    Query(query): Query<TeardownQuery>,
) -> ApiResult<Json<TeardownResponse>> {
    authorize(&headers, &state.intake_token)?;

    let namespace = query
        .namespace
        .filter(|ns| !ns.trim().is_empty())
        .unwrap_or_else(|| name.clone());
    validate_release(&name, &namespace)?;

    if state.driver.settings().mock {
        tracing::info!(release = %name, namespace = %namespace, "Mock mode, skipping uninstall");
    } else {
        state
            .driver
            .deployer()
            .uninstall(&name, &namespace)
            .await
            .map_err(|e| {
                tracing::error!(release = %name, namespace = %namespace, error = %e, "Uninstall failed");
                ApiError::Deployment(e.to_string())
            })?;
        tracing::info!(release = %name, namespace = %namespace, "Store release removed");
    }

    Ok(Json(TeardownResponse {
        ok: true,
        release: name,
        namespace,
    }))
}
