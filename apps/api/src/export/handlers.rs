//! Axum route handlers for the Export API.

use axum::{
    extract::{Path, State},
    http::{header, StatusCode},
    response::IntoResponse,
    Json,
};
use serde::Serialize;
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::Job;
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct CreateJobResponse {
    pub job_id: Uuid,
}

#[derive(Debug, Serialize)]
pub struct ArtifactResponse {
    pub job_id: Uuid,
    pub artifact_reference: String,
}

/// POST /api/v1/plans/:id/export
///
/// Queues an export of the plan as it stands right now. Returns without waiting.
pub async fn handle_create_export(
    State(state): State<AppState>,
    Path(plan_id): Path<Uuid>,
) -> Result<(StatusCode, Json<CreateJobResponse>), AppError> {
    let job_id = state.exports.create_job(plan_id)?;
    Ok((StatusCode::ACCEPTED, Json(CreateJobResponse { job_id })))
}

/// GET /api/v1/jobs/:id
pub async fn handle_job_status(
    State(state): State<AppState>,
    Path(job_id): Path<Uuid>,
) -> Result<Json<Job>, AppError> {
    Ok(Json(state.exports.status(job_id)?))
}

/// GET /api/v1/jobs/:id/artifact
///
/// 409 while the job is queued or running.
pub async fn handle_artifact_reference(
    State(state): State<AppState>,
    Path(job_id): Path<Uuid>,
) -> Result<Json<ArtifactResponse>, AppError> {
    let artifact_reference = state.exports.artifact_reference(job_id)?;
    Ok(Json(ArtifactResponse {
        job_id,
        artifact_reference,
    }))
}

/// GET /api/v1/jobs/:id/download
pub async fn handle_download(
    State(state): State<AppState>,
    Path(job_id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let reference = state.exports.artifact_reference(job_id)?;
    let body = state.artifacts.get(&reference).await?;
    Ok((
        [
            (header::CONTENT_TYPE, "application/json"),
            (
                header::CONTENT_DISPOSITION,
                "attachment; filename=\"manifest.json\"",
            ),
        ],
        body,
    ))
}
