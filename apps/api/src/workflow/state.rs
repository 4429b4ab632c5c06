//! Application State Machine: one `Workflow` per client session.
//!
//! ```text
//! upload --submit--> analyzing --ok--> results --rebuild--> rebuilding --ok--> rebuilt
//!                        |                ^                      |               |
//!                        +--err--> upload +------- err ----------+               |
//!                                         +---------------- back ----------------+
//! any --reset--> upload
//! ```
//!
//! Every in-flight operation (file read, analysis, rewrite) holds a `Ticket`. A
//! completion is applied only while the state is still the variant that issued that
//! ticket, so responses arriving after a reset or a newer selection are dropped.

use std::sync::Arc;
use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};
use serde::Serialize;
use thiserror::Error;

use crate::analysis::models::AnalysisResult;
use crate::errors::{RequestError, ANALYSIS_FAILED_MESSAGE, REBUILD_FAILED_MESSAGE};
use crate::rebuild::document::RebuiltDocument;
use crate::upload::FilePayload;

/// Identifies one in-flight operation within a workflow.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ticket(u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Screen {
    Upload,
    Analyzing,
    Results,
    Rebuilding,
    Rebuilt,
}

impl std::fmt::Display for Screen {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Screen::Upload => "upload",
            Screen::Analyzing => "analyzing",
            Screen::Results => "results",
            Screen::Rebuilding => "rebuilding",
            Screen::Rebuilt => "rebuilt",
        };
        f.write_str(name)
    }
}

/// Everything known once an analysis has succeeded.
#[derive(Debug, Clone)]
pub struct Analyzed {
    pub file: Arc<FilePayload>,
    pub job_description: String,
    pub analysis: Arc<AnalysisResult>,
}

#[derive(Debug, Clone)]
pub enum ApplicationState {
    Upload {
        selection: Option<Arc<FilePayload>>,
        pending_read: Option<Ticket>,
    },
    Analyzing {
        ticket: Ticket,
        file: Arc<FilePayload>,
        job_description: String,
    },
    Results {
        analyzed: Analyzed,
    },
    Rebuilding {
        ticket: Ticket,
        analyzed: Analyzed,
    },
    Rebuilt {
        analyzed: Analyzed,
        document: RebuiltDocument,
    },
}

impl Default for ApplicationState {
    fn default() -> Self {
        ApplicationState::Upload {
            selection: None,
            pending_read: None,
        }
    }
}

/// User-visible failure message. `reason` distinguishes the cause without
/// changing the coarse wording.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notice {
    pub message: String,
    pub reason: &'static str,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum WorkflowError {
    #[error("Please provide both a resume and a job description.")]
    NoFileSelected,

    #[error("Please provide both a resume and a job description.")]
    EmptyJobDescription,

    #[error("The selected file is still being read.")]
    FileReadInProgress,

    #[error("A rebuild is already in progress.")]
    RebuildInProgress,

    #[error("Cannot {action} while on the {screen} screen.")]
    InvalidTransition {
        action: &'static str,
        screen: Screen,
    },
}

impl WorkflowError {
    /// Input problems the user fixes by correcting the form, as opposed to
    /// requests that conflict with the current screen.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            WorkflowError::NoFileSelected | WorkflowError::EmptyJobDescription
        )
    }
}

/// Whether a completion changed the workflow.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Completion {
    Applied,
    Stale,
}

/// Inputs for one analysis call, handed out by `submit`.
#[derive(Debug, Clone)]
pub struct AnalysisJob {
    pub ticket: Ticket,
    pub file: Arc<FilePayload>,
    pub job_description: String,
}

/// Inputs for one rewrite call, handed out by `begin_rebuild`.
#[derive(Debug, Clone)]
pub struct RebuildJob {
    pub ticket: Ticket,
    pub file: Arc<FilePayload>,
    pub job_description: String,
    pub analysis: Arc<AnalysisResult>,
}

#[derive(Debug)]
pub struct Workflow {
    state: ApplicationState,
    issued: u64,
    notice: Option<Notice>,
    created_at: DateTime<Utc>,
    last_active: Instant,
}

impl Default for Workflow {
    fn default() -> Self {
        Self::new()
    }
}

impl Workflow {
    pub fn new() -> Self {
        Self {
            state: ApplicationState::default(),
            issued: 0,
            notice: None,
            created_at: Utc::now(),
            last_active: Instant::now(),
        }
    }

    pub fn state(&self) -> &ApplicationState {
        &self.state
    }

    pub fn notice(&self) -> Option<&Notice> {
        self.notice.as_ref()
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Marks the session as used now. Idle eviction counts from here.
    pub fn touch(&mut self) {
        self.last_active = Instant::now();
    }

    pub fn idle_for(&self) -> Duration {
        self.last_active.elapsed()
    }

    pub fn screen(&self) -> Screen {
        match self.state {
            ApplicationState::Upload { .. } => Screen::Upload,
            ApplicationState::Analyzing { .. } => Screen::Analyzing,
            ApplicationState::Results { .. } => Screen::Results,
            ApplicationState::Rebuilding { .. } => Screen::Rebuilding,
            ApplicationState::Rebuilt { .. } => Screen::Rebuilt,
        }
    }

    /// Busy flag consumed by the dashboard's rebuild action.
    pub fn is_rebuilding(&self) -> bool {
        matches!(self.state, ApplicationState::Rebuilding { .. })
    }

    pub fn file(&self) -> Option<&FilePayload> {
        match &self.state {
            ApplicationState::Upload { selection, .. } => selection.as_deref(),
            ApplicationState::Analyzing { file, .. } => Some(&**file),
            ApplicationState::Results { analyzed }
            | ApplicationState::Rebuilding { analyzed, .. }
            | ApplicationState::Rebuilt { analyzed, .. } => Some(&*analyzed.file),
        }
    }

    pub fn job_description(&self) -> Option<&str> {
        match &self.state {
            ApplicationState::Upload { .. } => None,
            ApplicationState::Analyzing {
                job_description, ..
            } => Some(job_description.as_str()),
            ApplicationState::Results { analyzed }
            | ApplicationState::Rebuilding { analyzed, .. }
            | ApplicationState::Rebuilt { analyzed, .. } => Some(analyzed.job_description.as_str()),
        }
    }

    pub fn analysis(&self) -> Option<&AnalysisResult> {
        match &self.state {
            ApplicationState::Results { analyzed }
            | ApplicationState::Rebuilding { analyzed, .. }
            | ApplicationState::Rebuilt { analyzed, .. } => Some(&*analyzed.analysis),
            _ => None,
        }
    }

    pub fn document(&self) -> Option<&RebuiltDocument> {
        match &self.state {
            ApplicationState::Rebuilt { document, .. } => Some(document),
            _ => None,
        }
    }

    fn issue_ticket(&mut self) -> Ticket {
        self.issued += 1;
        Ticket(self.issued)
    }

    fn invalid(&self, action: &'static str) -> WorkflowError {
        WorkflowError::InvalidTransition {
            action,
            screen: self.screen(),
        }
    }

    /// Starts reading a newly selected file. Any earlier unfinished read is superseded.
    pub fn begin_file_read(&mut self) -> Result<Ticket, WorkflowError> {
        if !matches!(self.state, ApplicationState::Upload { .. }) {
            return Err(self.invalid("select a file"));
        }
        let ticket = self.issue_ticket();
        if let ApplicationState::Upload { pending_read, .. } = &mut self.state {
            *pending_read = Some(ticket);
        }
        Ok(ticket)
    }

    /// Drops a read that failed validation; the previous selection is untouched.
    pub fn abandon_file_read(&mut self, ticket: Ticket) {
        if let ApplicationState::Upload { pending_read, .. } = &mut self.state {
            if *pending_read == Some(ticket) {
                *pending_read = None;
            }
        }
    }

    pub fn complete_file_read(&mut self, ticket: Ticket, payload: FilePayload) -> Completion {
        match &mut self.state {
            ApplicationState::Upload {
                selection,
                pending_read,
            } if *pending_read == Some(ticket) => {
                *selection = Some(Arc::new(payload));
                *pending_read = None;
                self.notice = None;
                Completion::Applied
            }
            _ => Completion::Stale,
        }
    }

    /// Removes the selected file and cancels any unfinished read.
    pub fn clear_file(&mut self) -> Result<(), WorkflowError> {
        if let ApplicationState::Upload {
            selection,
            pending_read,
        } = &mut self.state
        {
            *selection = None;
            *pending_read = None;
            return Ok(());
        }
        Err(self.invalid("clear the file"))
    }

    /// upload → analyzing. Validation failures leave the state untouched.
    pub fn submit(&mut self, job_description: &str) -> Result<AnalysisJob, WorkflowError> {
        let file = match &self.state {
            ApplicationState::Upload {
                pending_read: Some(_),
                ..
            } => return Err(WorkflowError::FileReadInProgress),
            ApplicationState::Upload { selection, .. } => {
                selection.clone().ok_or(WorkflowError::NoFileSelected)?
            }
            _ => return Err(self.invalid("submit for analysis")),
        };
        if job_description.trim().is_empty() {
            return Err(WorkflowError::EmptyJobDescription);
        }

        let ticket = self.issue_ticket();
        let job_description = job_description.to_string();
        self.state = ApplicationState::Analyzing {
            ticket,
            file: Arc::clone(&file),
            job_description: job_description.clone(),
        };
        self.notice = None;

        Ok(AnalysisJob {
            ticket,
            file,
            job_description,
        })
    }

    /// analyzing → results on success; analyzing → upload (all data dropped) on failure.
    pub fn complete_analysis(
        &mut self,
        ticket: Ticket,
        outcome: Result<AnalysisResult, RequestError>,
    ) -> Completion {
        let (file, job_description) = match &self.state {
            ApplicationState::Analyzing {
                ticket: current,
                file,
                job_description,
            } if *current == ticket => (Arc::clone(file), job_description.clone()),
            _ => return Completion::Stale,
        };

        match outcome {
            Ok(analysis) => {
                self.state = ApplicationState::Results {
                    analyzed: Analyzed {
                        file,
                        job_description,
                        analysis: Arc::new(analysis),
                    },
                };
            }
            Err(e) => {
                self.state = ApplicationState::default();
                self.notice = Some(Notice {
                    message: ANALYSIS_FAILED_MESSAGE.to_string(),
                    reason: e.reason(),
                });
            }
        }
        Completion::Applied
    }

    /// results → rebuilding. Refused while a rebuild is already running.
    pub fn begin_rebuild(&mut self) -> Result<RebuildJob, WorkflowError> {
        let analyzed = match &self.state {
            ApplicationState::Results { analyzed } => analyzed.clone(),
            ApplicationState::Rebuilding { .. } => return Err(WorkflowError::RebuildInProgress),
            _ => return Err(self.invalid("rebuild")),
        };

        let ticket = self.issue_ticket();
        let job = RebuildJob {
            ticket,
            file: Arc::clone(&analyzed.file),
            job_description: analyzed.job_description.clone(),
            analysis: Arc::clone(&analyzed.analysis),
        };
        self.state = ApplicationState::Rebuilding { ticket, analyzed };
        self.notice = None;
        Ok(job)
    }

    /// rebuilding → rebuilt on success; rebuilding → results (analysis kept) on failure.
    pub fn complete_rebuild(
        &mut self,
        ticket: Ticket,
        outcome: Result<RebuiltDocument, RequestError>,
    ) -> Completion {
        let analyzed = match &self.state {
            ApplicationState::Rebuilding {
                ticket: current,
                analyzed,
            } if *current == ticket => analyzed.clone(),
            _ => return Completion::Stale,
        };

        match outcome {
            Ok(document) => {
                self.state = ApplicationState::Rebuilt { analyzed, document };
            }
            Err(e) => {
                self.state = ApplicationState::Results { analyzed };
                self.notice = Some(Notice {
                    message: REBUILD_FAILED_MESSAGE.to_string(),
                    reason: e.reason(),
                });
            }
        }
        Completion::Applied
    }

    /// rebuilt → results. The rewritten document is discarded.
    pub fn back_to_results(&mut self) -> Result<(), WorkflowError> {
        match std::mem::take(&mut self.state) {
            ApplicationState::Rebuilt { analyzed, .. } => {
                self.state = ApplicationState::Results { analyzed };
                Ok(())
            }
            other => {
                self.state = other;
                Err(self.invalid("go back to results"))
            }
        }
    }

    /// Unconditional return to an empty upload screen. Outstanding tickets go stale.
    pub fn reset(&mut self) {
        self.state = ApplicationState::default();
        self.notice = None;
    }
}
