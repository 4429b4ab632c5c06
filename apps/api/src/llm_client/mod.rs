//! LLM Client: the single point of entry for all Gemini API calls.
//!
//! No other module may call the model endpoint directly. Requesters build their
//! prompt and (optionally) a response schema, and hand both to this client together
//! with the inline document.
use reqwest::Client;
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;
use tracing::debug;

use crate::upload::FilePayload;

pub mod prompts;

pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";
pub const DEFAULT_MODEL: &str = "gemini-2.5-flash";

#[derive(Debug, Error)]
pub enum LlmError {
    #[error("model credential is not configured")]
    MissingCredential,

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("LLM returned empty content")]
    EmptyContent,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest<'a> {
    contents: Vec<Content<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    generation_config: Option<GenerationConfig<'a>>,
}

#[derive(Debug, Serialize)]
struct Content<'a> {
    role: &'a str,
    parts: Vec<Part<'a>>,
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
enum Part<'a> {
    Inline {
        #[serde(rename = "inlineData")]
        inline_data: InlineData<'a>,
    },
    Text {
        text: &'a str,
    },
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct InlineData<'a> {
    mime_type: &'a str,
    data: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig<'a> {
    response_mime_type: &'a str,
    response_schema: &'a Value,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LlmResponse {
    #[serde(default)]
    pub candidates: Vec<Candidate>,
    pub usage_metadata: Option<UsageMetadata>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Candidate {
    pub content: Option<CandidateContent>,
    pub finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct CandidateContent {
    #[serde(default)]
    pub parts: Vec<ResponsePart>,
}

#[derive(Debug, Deserialize)]
pub struct ResponsePart {
    pub text: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UsageMetadata {
    pub prompt_token_count: Option<u32>,
    pub candidates_token_count: Option<u32>,
}

impl LlmResponse {
    /// Concatenates the text parts of the first candidate.
    /// Returns `None` when there is no candidate or the text is blank.
    pub fn text(&self) -> Option<String> {
        let parts = &self.candidates.first()?.content.as_ref()?.parts;
        let text: String = parts.iter().filter_map(|p| p.text.as_deref()).collect();
        if text.trim().is_empty() {
            None
        } else {
            Some(text)
        }
    }
}

#[derive(Debug, Deserialize)]
struct GeminiError {
    error: GeminiErrorBody,
}

#[derive(Debug, Deserialize)]
struct GeminiErrorBody {
    message: String,
}

/// Wraps the Gemini `generateContent` endpoint with structured output helpers.
///
/// No local timeout is configured; the provider's own limits bound the wait.
#[derive(Clone)]
pub struct LlmClient {
    client: Client,
    api_key: String,
    base_url: String,
    model: String,
}

impl LlmClient {
    pub fn new(api_key: String, base_url: String, model: String) -> Self {
        Self {
            client: Client::new(),
            api_key,
            base_url,
            model,
        }
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/models/{}:generateContent",
            self.base_url.trim_end_matches('/'),
            self.model
        )
    }

    /// Makes a single call with the document inlined ahead of the instruction.
    /// With `schema` set, the model is constrained to JSON matching it.
    pub async fn call(
        &self,
        document: &FilePayload,
        prompt: &str,
        schema: Option<&Value>,
    ) -> Result<LlmResponse, LlmError> {
        if self.api_key.trim().is_empty() {
            return Err(LlmError::MissingCredential);
        }

        let request_body = build_request(document, prompt, schema);

        let response = self
            .client
            .post(self.endpoint())
            .header("x-goog-api-key", &self.api_key)
            .json(&request_body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<GeminiError>(&body)
                .map(|e| e.error.message)
                .unwrap_or(body);
            return Err(LlmError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let llm_response: LlmResponse = response.json().await?;

        if let Some(usage) = &llm_response.usage_metadata {
            debug!(
                "LLM call succeeded: prompt_tokens={:?}, output_tokens={:?}, finish_reason={:?}",
                usage.prompt_token_count,
                usage.candidates_token_count,
                llm_response
                    .candidates
                    .first()
                    .and_then(|c| c.finish_reason.as_deref())
            );
        }

        Ok(llm_response)
    }

    /// Calls the model under a response schema and deserializes the text as JSON.
    pub async fn call_json<T: DeserializeOwned>(
        &self,
        document: &FilePayload,
        prompt: &str,
        schema: &Value,
    ) -> Result<T, LlmError> {
        let response = self.call(document, prompt, Some(schema)).await?;
        parse_json_text(response.text().as_deref())
    }

    /// Calls the model without a schema and returns the free-form text.
    pub async fn call_text(&self, document: &FilePayload, prompt: &str) -> Result<String, LlmError> {
        let response = self.call(document, prompt, None).await?;
        response.text().ok_or(LlmError::EmptyContent)
    }
}

fn build_request<'a>(
    document: &'a FilePayload,
    prompt: &'a str,
    schema: Option<&'a Value>,
) -> GenerateContentRequest<'a> {
    GenerateContentRequest {
        contents: vec![Content {
            role: "user",
            parts: vec![
                Part::Inline {
                    inline_data: InlineData {
                        mime_type: &document.media_type,
                        data: &document.content,
                    },
                },
                Part::Text { text: prompt },
            ],
        }],
        generation_config: schema.map(|response_schema| GenerationConfig {
            response_mime_type: "application/json",
            response_schema,
        }),
    }
}

fn parse_json_text<T: DeserializeOwned>(text: Option<&str>) -> Result<T, LlmError> {
    let text = text.ok_or(LlmError::EmptyContent)?;
    // Schema-constrained output should be bare JSON, but fences still slip through
    serde_json::from_str(strip_json_fences(text)).map_err(LlmError::Parse)
}

/// Strips ```json ... ``` or ``` ... ``` code fences from LLM output.
fn strip_json_fences(text: &str) -> &str {
    let text = text.trim();
    if let Some(stripped) = text.strip_prefix("```json") {
        stripped
            .trim_start()
            .strip_suffix("```")
            .map(|s| s.trim())
            .unwrap_or(stripped.trim_start())
    } else if let Some(stripped) = text.strip_prefix("```") {
        stripped
            .trim_start()
            .strip_suffix("```")
            .map(|s| s.trim())
            .unwrap_or(stripped.trim_start())
    } else {
        text
    }
}
