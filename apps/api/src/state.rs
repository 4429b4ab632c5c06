use std::sync::Arc;

use crate::analysis::requester::ResumeAnalyzer;
use crate::config::Config;
use crate::rebuild::requester::ResumeRewriter;
use crate::workflow::store::SessionStore;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub sessions: SessionStore,
    /// Pluggable analysis backend. Default: GeminiAnalyzer.
    pub analyzer: Arc<dyn ResumeAnalyzer>,
    /// Pluggable rewrite backend. Default: GeminiRewriter.
    pub rewriter: Arc<dyn ResumeRewriter>,
}
