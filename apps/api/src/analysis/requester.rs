//! Analysis Requester: pluggable, trait-based.
//!
//! Default: `GeminiAnalyzer`, which sends the document and job description to the
//! model under the `AnalysisResult` response schema.
//!
//! `AppState` holds an `Arc<dyn ResumeAnalyzer>`, so another provider can be swapped
//! in without touching the workflow or views.

use async_trait::async_trait;
use tracing::info;

use crate::analysis::models::AnalysisResult;
use crate::analysis::prompts::build_analysis_prompt;
use crate::analysis::schema::analysis_response_schema;
use crate::errors::RequestError;
use crate::llm_client::LlmClient;
use crate::upload::FilePayload;

#[async_trait]
pub trait ResumeAnalyzer: Send + Sync {
    async fn analyze(
        &self,
        document: &FilePayload,
        job_description: &str,
    ) -> Result<AnalysisResult, RequestError>;
}

/// Structured analysis via Gemini. No retry: a failure is reported once.
pub struct GeminiAnalyzer(pub LlmClient);

#[async_trait]
impl ResumeAnalyzer for GeminiAnalyzer {
    async fn analyze(
        &self,
        document: &FilePayload,
        job_description: &str,
    ) -> Result<AnalysisResult, RequestError> {
        let prompt = build_analysis_prompt(job_description);
        let result: AnalysisResult = self
            .0
            .call_json(document, &prompt, &analysis_response_schema())
            .await?;
        result.validate()?;

        info!(
            "Analysis of '{}' complete: overall={}, ats={}, keywords={}",
            document.display_name,
            result.overall_score,
            result.ats_simulation.score,
            result.ats_simulation.keyword_match.len()
        );
        Ok(result)
    }
}
