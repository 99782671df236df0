//! API Router configuration

use super::handlers;
use super::state::AppState;
use axum::{
    routing::{delete, get, post},
    Router,
};
use tower_http::trace::TraceLayer;

/// Create the main API router
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(handlers::health_check))
        .route("/engines", get(handlers::list_engines))
        .route("/orchestrate", post(handlers::orchestrate))
        .route("/orchestrate/:name", delete(handlers::teardown))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
