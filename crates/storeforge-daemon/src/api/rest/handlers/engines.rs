//! Engine listing

use crate::api::rest::state::AppState;
use axum::{extract::State, Json};
use serde::Serialize;
use storeforge_provisioner::ChartDependency;
use storeforge_types::StoreEngine;

/// One registered platform adapter
#[derive(Debug, Serialize)]
pub struct EngineInfo {
    pub engine: StoreEngine,
    pub implemented: bool,
    pub url_path: String,
    pub chart_dependency: Option<ChartDependency>,
}

/// List the engines this orchestrator can provision
pub async fn list_engines(State(state): State<AppState>) -> Json<Vec<EngineInfo>> {
    let engines = state
        .driver
        .adapters()
        .adapters()
        .map(|adapter| EngineInfo {
            engine: adapter.engine(),
            implemented: adapter.is_implemented(),
            url_path: adapter.store_url_path().to_string(),
            chart_dependency: adapter.chart_dependency(),
        })
        .collect();

    Json(engines)
}
