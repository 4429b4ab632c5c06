//! Rewrite Requester: free-form markdown rewrite, no response schema.
//!
//! `AppState` holds an `Arc<dyn ResumeRewriter>`; `GeminiRewriter` is the default.

use async_trait::async_trait;
use tracing::info;

use crate::analysis::models::AnalysisResult;
use crate::errors::RequestError;
use crate::llm_client::LlmClient;
use crate::rebuild::document::RebuiltDocument;
use crate::rebuild::prompts::build_rebuild_prompt;
use crate::upload::FilePayload;

#[async_trait]
pub trait ResumeRewriter: Send + Sync {
    async fn rewrite(
        &self,
        document: &FilePayload,
        job_description: &str,
        analysis: &AnalysisResult,
    ) -> Result<RebuiltDocument, RequestError>;
}

/// Open-ended rewrite via Gemini. No retry: a failure is reported once.
pub struct GeminiRewriter(pub LlmClient);

#[async_trait]
impl ResumeRewriter for GeminiRewriter {
    async fn rewrite(
        &self,
        document: &FilePayload,
        job_description: &str,
        analysis: &AnalysisResult,
    ) -> Result<RebuiltDocument, RequestError> {
        let prompt = build_rebuild_prompt(job_description, analysis);
        let markdown = self.0.call_text(document, &prompt).await?;

        info!(
            "Rebuild of '{}' complete: {} chars of markdown",
            document.display_name,
            markdown.len()
        );
        Ok(RebuiltDocument::new(markdown))
    }
}
