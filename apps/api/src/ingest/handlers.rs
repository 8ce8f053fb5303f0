//! Axum route handlers for template and source ingest.

use axum::{
    body::Bytes,
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use uuid::Uuid;

use crate::errors::AppError;
use crate::ingest::{ingest_source, ingest_template};
use crate::models::{Source, Template};
use crate::state::AppState;

/// POST /api/v1/templates
///
/// Runs the layout catalog builder over the raw template bytes.
pub async fn handle_ingest_template(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<(StatusCode, Json<Template>), AppError> {
    if body.is_empty() {
        return Err(AppError::Validation("template body cannot be empty".to_string()));
    }
    let template = ingest_template(state.catalog_builder.as_ref(), &body).await?;
    state.templates.put(template.template_id, template.clone());
    Ok((StatusCode::CREATED, Json(template)))
}

/// GET /api/v1/templates/:id
pub async fn handle_get_template(
    State(state): State<AppState>,
    Path(template_id): Path<Uuid>,
) -> Result<Json<Template>, AppError> {
    Ok(Json(state.planning.template(template_id)?))
}

/// POST /api/v1/sources
///
/// Runs the signature extractor over the raw document bytes.
pub async fn handle_ingest_source(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<(StatusCode, Json<Source>), AppError> {
    if body.is_empty() {
        return Err(AppError::Validation("source body cannot be empty".to_string()));
    }
    let source = ingest_source(state.signature_extractor.as_ref(), &body).await?;
    state.sources.put(source.source_id, source.clone());
    Ok((StatusCode::CREATED, Json(source)))
}

/// GET /api/v1/sources/:id
pub async fn handle_get_source(
    State(state): State<AppState>,
    Path(source_id): Path<Uuid>,
) -> Result<Json<Source>, AppError> {
    Ok(Json(state.planning.source(source_id)?))
}
