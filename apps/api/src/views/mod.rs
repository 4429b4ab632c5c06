// Presentation layer: one JSON view model per screen, built from a session's workflow.
// Views are read-only projections; every mutation goes through `workflow::state`.

pub mod ats_report;
pub mod dashboard;
pub mod preview;
pub mod upload;

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::config::Theme;
use crate::workflow::state::{ApplicationState, Notice, Workflow};

use self::dashboard::DashboardView;
use self::preview::PreviewView;
use self::upload::{LoadingView, UploadView};

#[derive(Debug, Clone, Serialize)]
pub struct SessionView {
    pub session_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub theme: Theme,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notice: Option<Notice>,
    /// Echo of the submitted job description once analysis has started.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub job_description: Option<String>,
    pub view: ScreenView,
}

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "screen", content = "data", rename_all = "lowercase")]
pub enum ScreenView {
    Upload(UploadView),
    Analyzing(LoadingView),
    Results(DashboardView),
    Rebuilding(DashboardView),
    Rebuilt(PreviewView),
}

/// Band used to colour scores: ≥80 strong, ≥60 moderate, otherwise weak.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ScoreBand {
    Strong,
    Moderate,
    Weak,
}

impl ScoreBand {
    pub fn of(score: u32) -> Self {
        if score >= 80 {
            ScoreBand::Strong
        } else if score >= 60 {
            ScoreBand::Moderate
        } else {
            ScoreBand::Weak
        }
    }
}

pub fn render(session_id: Uuid, workflow: &Workflow, theme: Theme) -> SessionView {
    let view = match workflow.state() {
        ApplicationState::Upload {
            selection,
            pending_read,
        } => ScreenView::Upload(UploadView::new(selection.as_deref(), pending_read.is_some())),
        ApplicationState::Analyzing { file, .. } => ScreenView::Analyzing(LoadingView::new(file)),
        ApplicationState::Results { analyzed } | ApplicationState::Rebuilding { analyzed, .. } => {
            let dashboard = DashboardView::new(&analyzed.analysis, workflow.is_rebuilding());
            if workflow.is_rebuilding() {
                ScreenView::Rebuilding(dashboard)
            } else {
                ScreenView::Results(dashboard)
            }
        }
        ApplicationState::Rebuilt { document, .. } => ScreenView::Rebuilt(PreviewView::new(document)),
    };

    SessionView {
        session_id,
        created_at: workflow.created_at(),
        theme,
        notice: workflow.notice().cloned(),
        job_description: workflow.job_description().map(str::to_string),
        view,
    }
}
