//! Axum route handlers for the Planning API.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::Plan;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct BuildPlanRequest {
    pub template_id: Uuid,
    pub source_id: Uuid,
}

#[derive(Debug, Deserialize)]
pub struct SwapLayoutRequest {
    pub slide_index: usize,
    pub layout_id: String,
}

/// POST /api/v1/plans
///
/// Scores every source page against the template catalog and stores the plan.
pub async fn handle_build_plan(
    State(state): State<AppState>,
    Json(request): Json<BuildPlanRequest>,
) -> Result<(StatusCode, Json<Plan>), AppError> {
    let planning = state.planning.clone();
    // CPU-bound: pages × layouts scoring
    let plan = tokio::task::spawn_blocking(move || {
        planning.build(request.template_id, request.source_id)
    })
    .await
    .map_err(|e| AppError::Internal(e.into()))??;
    Ok((StatusCode::CREATED, Json(plan)))
}

/// GET /api/v1/plans/:id
pub async fn handle_get_plan(
    State(state): State<AppState>,
    Path(plan_id): Path<Uuid>,
) -> Result<Json<Plan>, AppError> {
    Ok(Json(state.planning.get(plan_id)?))
}

/// POST /api/v1/plans/:id/swap
///
/// Manually re-assigns one slide; every other slide keeps its mapping.
pub async fn handle_swap_layout(
    State(state): State<AppState>,
    Path(plan_id): Path<Uuid>,
    Json(request): Json<SwapLayoutRequest>,
) -> Result<Json<Plan>, AppError> {
    if request.layout_id.trim().is_empty() {
        return Err(AppError::Validation("layout_id cannot be empty".to_string()));
    }
    let plan = state
        .planning
        .swap(plan_id, request.slide_index, &request.layout_id)?;
    Ok(Json(plan))
}
