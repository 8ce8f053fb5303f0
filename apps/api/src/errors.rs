use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::export::ArtifactError;
use crate::ingest::IngestError;
use crate::planning::PlanError;

/// Application-level error type.
/// Implements `IntoResponse` so Axum handlers can return `Result<T, AppError>`.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Unprocessable entity: {0}")]
    UnprocessableEntity(String),

    #[error("Not ready: {0}")]
    NotReady(String),

    #[error("Planning error: {0}")]
    Plan(#[from] PlanError),

    #[error("Ingest error: {0}")]
    Ingest(#[from] IngestError),

    #[error("Artifact error: {0}")]
    Artifact(#[from] ArtifactError),

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, "NOT_FOUND", msg.clone()),
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone()),
            AppError::UnprocessableEntity(msg) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                "UNPROCESSABLE_ENTITY",
                msg.clone(),
            ),
            AppError::NotReady(msg) => (StatusCode::CONFLICT, "NOT_READY", msg.clone()),
            AppError::Plan(e) => {
                let code = match e {
                    PlanError::EmptyCatalog => "EMPTY_CATALOG",
                    PlanError::EmptySource => "EMPTY_SOURCE",
                    PlanError::UnknownLayout(_) => "UNKNOWN_LAYOUT",
                    PlanError::IndexOutOfRange { .. } => "INDEX_OUT_OF_RANGE",
                };
                tracing::warn!("Rejected planning request: {e}");
                (StatusCode::BAD_REQUEST, code, e.to_string())
            }
            AppError::Ingest(e) => {
                tracing::warn!("Rejected ingest: {e}");
                (StatusCode::BAD_REQUEST, "INGEST_ERROR", e.to_string())
            }
            AppError::Artifact(ArtifactError::NotFound(reference)) => (
                StatusCode::NOT_FOUND,
                "ARTIFACT_NOT_FOUND",
                format!("Artifact {reference} not found"),
            ),
            AppError::Artifact(e) => {
                tracing::error!("Artifact error: {e}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "STORAGE_ERROR",
                    "A storage error occurred".to_string(),
                )
            }
            AppError::Internal(e) => {
                tracing::error!("Internal error: {e:?}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    "An internal server error occurred".to_string(),
                )
            }
        };

        let body = Json(json!({
            "error": {
                "code": code,
                "message": message
            }
        }));

        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        let cases = [
            (AppError::NotFound("x".into()), StatusCode::NOT_FOUND),
            (AppError::NotReady("x".into()), StatusCode::CONFLICT),
            (AppError::Plan(PlanError::EmptyCatalog), StatusCode::BAD_REQUEST),
            (
                AppError::Plan(PlanError::IndexOutOfRange { index: 4, len: 2 }),
                StatusCode::BAD_REQUEST,
            ),
            (
                AppError::Artifact(ArtifactError::NotFound("k".into())),
                StatusCode::NOT_FOUND,
            ),
            (
                AppError::Internal(anyhow::anyhow!("boom")),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];
        for (error, expected) in cases {
            assert_eq!(error.into_response().status(), expected);
        }
    }
}
