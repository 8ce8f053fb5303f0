pub mod health;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};

use crate::export::handlers as export;
use crate::ingest::handlers as ingest;
use crate::planning::handlers as planning;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    let upload_limit = state.config.max_upload_bytes;

    Router::new()
        .route("/health", get(health::health_handler))
        // Ingest API
        .route("/api/v1/templates", post(ingest::handle_ingest_template))
        .route("/api/v1/templates/:id", get(ingest::handle_get_template))
        .route("/api/v1/sources", post(ingest::handle_ingest_source))
        .route("/api/v1/sources/:id", get(ingest::handle_get_source))
        // Planning API
        .route("/api/v1/plans", post(planning::handle_build_plan))
        .route("/api/v1/plans/:id", get(planning::handle_get_plan))
        .route("/api/v1/plans/:id/swap", post(planning::handle_swap_layout))
        // Export API
        .route("/api/v1/plans/:id/export", post(export::handle_create_export))
        .route("/api/v1/jobs/:id", get(export::handle_job_status))
        .route(
            "/api/v1/jobs/:id/artifact",
            get(export::handle_artifact_reference),
        )
        .route("/api/v1/jobs/:id/download", get(export::handle_download))
        .layer(DefaultBodyLimit::max(upload_limit))
        .with_state(state)
}
