use axum::{
    extract::{multipart::MultipartRejection, rejection::JsonRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::analysis::models::ScoreOutOfRange;
use crate::llm_client::LlmError;
use crate::upload::UploadError;
use crate::workflow::state::WorkflowError;

pub const ANALYSIS_FAILED_MESSAGE: &str = "Analysis failed. Please try again.";
pub const REBUILD_FAILED_MESSAGE: &str = "Rebuild failed. Please try again.";

/// Why a remote model call failed. Provider-agnostic: requesters convert their
/// client errors into this before the workflow sees them.
#[derive(Debug, Clone, Error)]
pub enum RequestError {
    #[error("model credential is not configured")]
    MissingCredential,

    #[error("remote call failed: {0}")]
    Remote(String),

    #[error("model returned an empty response")]
    EmptyResponse,

    #[error("response did not match the expected schema: {0}")]
    Schema(String),
}

impl RequestError {
    /// Stable code attached to user-visible notices.
    pub fn reason(&self) -> &'static str {
        match self {
            RequestError::MissingCredential => "configuration",
            RequestError::Remote(_) => "network",
            RequestError::EmptyResponse => "empty_response",
            RequestError::Schema(_) => "schema",
        }
    }
}

impl From<LlmError> for RequestError {
    fn from(e: LlmError) -> Self {
        match e {
            LlmError::MissingCredential => RequestError::MissingCredential,
            LlmError::EmptyContent => RequestError::EmptyResponse,
            LlmError::Parse(e) => RequestError::Schema(e.to_string()),
            e @ (LlmError::Http(_) | LlmError::Api { .. }) => RequestError::Remote(e.to_string()),
        }
    }
}

impl From<ScoreOutOfRange> for RequestError {
    fn from(e: ScoreOutOfRange) -> Self {
        RequestError::Schema(e.to_string())
    }
}

/// Application-level error type.
/// Implements `IntoResponse` so Axum handlers can return `Result<T, AppError>`.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Analysis failed: {0}")]
    AnalysisFailed(#[source] RequestError),

    #[error("Rebuild failed: {0}")]
    RebuildFailed(#[source] RequestError),
}

impl From<UploadError> for AppError {
    fn from(e: UploadError) -> Self {
        AppError::Validation(e.to_string())
    }
}

impl From<JsonRejection> for AppError {
    fn from(e: JsonRejection) -> Self {
        AppError::Validation(format!("Invalid request body: {}", e.body_text()))
    }
}

impl From<MultipartRejection> for AppError {
    fn from(e: MultipartRejection) -> Self {
        AppError::Validation(format!("Invalid multipart body: {}", e.body_text()))
    }
}

impl From<WorkflowError> for AppError {
    fn from(e: WorkflowError) -> Self {
        if e.is_validation() {
            AppError::Validation(e.to_string())
        } else {
            AppError::Conflict(e.to_string())
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, "NOT_FOUND", msg.clone()),
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone()),
            AppError::Conflict(msg) => (StatusCode::CONFLICT, "CONFLICT", msg.clone()),
            AppError::AnalysisFailed(e) => {
                tracing::error!("Analysis failed ({}): {e}", e.reason());
                (
                    StatusCode::BAD_GATEWAY,
                    "ANALYSIS_FAILED",
                    ANALYSIS_FAILED_MESSAGE.to_string(),
                )
            }
            AppError::RebuildFailed(e) => {
                tracing::error!("Rebuild failed ({}): {e}", e.reason());
                (
                    StatusCode::BAD_GATEWAY,
                    "REBUILD_FAILED",
                    REBUILD_FAILED_MESSAGE.to_string(),
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
