//! Axum route handlers for the session workflow.
//!
//! Every handler follows the same shape: take what it needs from the workflow
//! under the store lock, await the slow part (upload read, model call) with the
//! lock released, then re-enter the store to apply the completion by ticket.
//!
//! A ticket must always be completed, even when the client disconnects and its
//! request future is dropped. Model calls therefore run in a spawned task that
//! applies its own completion. Upload reads are tied to the request body, so they
//! hold a `PendingRead` guard that abandons the read on drop.

use axum::{
    extract::{
        multipart::{Field, MultipartRejection},
        rejection::JsonRejection,
        Multipart, Path, State,
    },
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use tracing::{info, warn};
use uuid::Uuid;

use crate::errors::{AppError, RequestError};
use crate::rebuild::document::MarkdownDownload;
use crate::state::AppState;
use crate::upload::{FilePayload, PayloadBuilder};
use crate::views::{self, SessionView};
use crate::workflow::state::{Completion, Ticket};
use crate::workflow::store::SessionStore;

/// Multipart field carrying the resume.
const FILE_FIELD: &str = "file";

#[derive(Debug, Deserialize)]
pub struct AnalyzeRequest {
    pub job_description: String,
}

async fn current_view(state: &AppState, id: Uuid) -> Result<SessionView, AppError> {
    let theme = state.config.theme;
    state
        .sessions
        .read(id, |wf| views::render(id, wf, theme))
        .await
}

/// POST /api/v1/sessions
pub async fn handle_create_session(
    State(state): State<AppState>,
) -> Result<(StatusCode, Json<SessionView>), AppError> {
    let id = state.sessions.create().await;
    let active = state.sessions.len().await;
    info!(session = %id, active, "Session created");
    Ok((StatusCode::CREATED, Json(current_view(&state, id).await?)))
}

/// GET /api/v1/sessions/:id
pub async fn handle_get_session(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<SessionView>, AppError> {
    Ok(Json(current_view(&state, id).await?))
}

/// DELETE /api/v1/sessions/:id
pub async fn handle_delete_session(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    state.sessions.remove(id).await?;
    info!(session = %id, "Session abandoned");
    Ok(StatusCode::NO_CONTENT)
}

/// PUT /api/v1/sessions/:id/file
///
/// Reads the `file` field of a multipart body through the File Encoder and makes
/// it the session's selection. Rejected files leave the previous selection as is.
/// The screen is checked before the file itself, so a wrong screen is always a 409.
pub async fn handle_select_file(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<SessionView>, AppError> {
    let mut multipart = multipart?;
    while let Some(mut field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::Validation(format!("Invalid multipart body: {e}")))?
    {
        if field.name() != Some(FILE_FIELD) {
            continue;
        }

        let display_name = field.file_name().unwrap_or("resume").to_string();
        let declared = field.content_type().unwrap_or_default().to_string();

        let ticket = state
            .sessions
            .update(id, |wf| wf.begin_file_read())
            .await??;
        let guard = PendingRead::new(state.sessions.clone(), id, ticket);

        let read = match PayloadBuilder::new(display_name, &declared) {
            Ok(builder) => read_field(&mut field, builder).await,
            Err(e) => Err(e.into()),
        };
        let payload = match read {
            Ok(payload) => payload,
            Err(e) => {
                state
                    .sessions
                    .update(id, |wf| wf.abandon_file_read(ticket))
                    .await?;
                guard.disarm();
                return Err(e);
            }
        };

        let name = payload.display_name.clone();
        let size = payload.size_bytes;
        let theme = state.config.theme;
        let (completion, view) = state
            .sessions
            .update(id, |wf| {
                let completion = wf.complete_file_read(ticket, payload);
                (completion, views::render(id, wf, theme))
            })
            .await?;
        guard.disarm();

        if completion == Completion::Stale {
            warn!(session = %id, "Discarding superseded file read for '{name}'");
            return Err(AppError::Conflict(
                "The file selection changed before this upload finished".to_string(),
            ));
        }

        info!(session = %id, "Selected '{name}' ({size} bytes)");
        return Ok(Json(view));
    }

    Err(AppError::Validation(format!(
        "Multipart body must include a `{FILE_FIELD}` field"
    )))
}

/// Abandons an upload read on drop unless disarmed, so a client that disconnects
/// mid-upload does not leave the session stuck in `reading`.
struct PendingRead {
    sessions: SessionStore,
    id: Uuid,
    ticket: Ticket,
    armed: bool,
}

impl PendingRead {
    fn new(sessions: SessionStore, id: Uuid, ticket: Ticket) -> Self {
        Self {
            sessions,
            id,
            ticket,
            armed: true,
        }
    }

    fn disarm(mut self) {
        self.armed = false;
    }
}

impl Drop for PendingRead {
    fn drop(&mut self) {
        if !self.armed {
            return;
        }
        let (sessions, id, ticket) = (self.sessions.clone(), self.id, self.ticket);
        warn!(session = %id, "Upload interrupted; abandoning file read");
        if let Ok(runtime) = tokio::runtime::Handle::try_current() {
            runtime.spawn(async move {
                let _ = sessions.update(id, |wf| wf.abandon_file_read(ticket)).await;
            });
        }
    }
}

async fn read_field(
    field: &mut Field<'_>,
    mut builder: PayloadBuilder,
) -> Result<FilePayload, AppError> {
    while let Some(chunk) = field
        .chunk()
        .await
        .map_err(|e| AppError::Validation(format!("Failed to read upload: {e}")))?
    {
        builder.push(&chunk)?;
    }
    Ok(builder.finish()?)
}

/// DELETE /api/v1/sessions/:id/file
pub async fn handle_clear_file(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<SessionView>, AppError> {
    let cleared = state
        .sessions
        .update(id, |wf| {
            let name = wf.file().map(|f| f.display_name.clone());
            wf.clear_file().map(|_| name)
        })
        .await??;
    if let Some(name) = cleared {
        info!(session = %id, "Cleared '{name}'");
    }
    Ok(Json(current_view(&state, id).await?))
}

/// POST /api/v1/sessions/:id/analyze
///
/// upload → analyzing → results (or back to upload on failure).
pub async fn handle_analyze(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    request: Result<Json<AnalyzeRequest>, JsonRejection>,
) -> Result<Json<SessionView>, AppError> {
    let Json(request) = request?;
    let job = state
        .sessions
        .update(id, |wf| wf.submit(&request.job_description))
        .await??;

    info!(session = %id, "Analyzing '{}'", job.file.display_name);
    let theme = state.config.theme;
    let worker = state.clone();
    let task = tokio::spawn(async move {
        let outcome = worker
            .analyzer
            .analyze(&job.file, &job.job_description)
            .await;
        let failure = outcome.as_ref().err().cloned();
        let (completion, score, view) = worker
            .sessions
            .update(id, |wf| {
                let completion = wf.complete_analysis(job.ticket, outcome);
                let score = wf.analysis().map(|a| a.overall_score);
                (completion, score, views::render(id, wf, theme))
            })
            .await?;
        Ok::<_, AppError>((completion, score, view, failure))
    });
    let (completion, score, view, failure) = task.await.map_err(|e| {
        AppError::AnalysisFailed(RequestError::Remote(format!("analysis task failed: {e}")))
    })??;

    if completion == Completion::Stale {
        warn!(session = %id, "Dropping analysis result for a session that moved on");
        return Err(AppError::Conflict(
            "The session was reset while the analysis was running".to_string(),
        ));
    }
    if let Some(e) = failure {
        return Err(AppError::AnalysisFailed(e));
    }
    if let Some(score) = score {
        info!(session = %id, "Analysis complete: {score}% match");
    }
    Ok(Json(view))
}

/// POST /api/v1/sessions/:id/rebuild
///
/// results → rebuilding → rebuilt (or back to results on failure).
pub async fn handle_rebuild(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<SessionView>, AppError> {
    let job = state.sessions.update(id, |wf| wf.begin_rebuild()).await??;

    info!(session = %id, "Rebuilding '{}'", job.file.display_name);
    let theme = state.config.theme;
    let worker = state.clone();
    let task = tokio::spawn(async move {
        let outcome = worker
            .rewriter
            .rewrite(&job.file, &job.job_description, &job.analysis)
            .await;
        let failure = outcome.as_ref().err().cloned();
        let (completion, view) = worker
            .sessions
            .update(id, |wf| {
                let completion = wf.complete_rebuild(job.ticket, outcome);
                (completion, views::render(id, wf, theme))
            })
            .await?;
        Ok::<_, AppError>((completion, view, failure))
    });
    let (completion, view, failure) = task.await.map_err(|e| {
        AppError::RebuildFailed(RequestError::Remote(format!("rebuild task failed: {e}")))
    })??;

    if completion == Completion::Stale {
        warn!(session = %id, "Dropping rebuilt resume for a session that moved on");
        return Err(AppError::Conflict(
            "The session was reset while the rebuild was running".to_string(),
        ));
    }
    if let Some(e) = failure {
        return Err(AppError::RebuildFailed(e));
    }
    Ok(Json(view))
}

/// POST /api/v1/sessions/:id/back
pub async fn handle_back(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<SessionView>, AppError> {
    state.sessions.update(id, |wf| wf.back_to_results()).await??;
    Ok(Json(current_view(&state, id).await?))
}

/// POST /api/v1/sessions/:id/reset
pub async fn handle_reset(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<SessionView>, AppError> {
    state.sessions.update(id, |wf| wf.reset()).await?;
    info!(session = %id, "Session reset");
    Ok(Json(current_view(&state, id).await?))
}

/// GET /api/v1/sessions/:id/document
///
/// Downloads the rewritten resume as `optimized-resume.md`.
pub async fn handle_download_document(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<MarkdownDownload, AppError> {
    let document = state
        .sessions
        .read(id, |wf| wf.document().cloned())
        .await?
        .ok_or_else(|| AppError::Conflict("No rebuilt resume is available yet".to_string()))?;
    Ok(MarkdownDownload(document))
}
