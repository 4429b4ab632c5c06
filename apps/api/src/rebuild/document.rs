use axum::{
    http::header,
    response::{IntoResponse, Response},
};
use serde::Serialize;

/// File name offered for the markdown download.
pub const DOWNLOAD_FILE_NAME: &str = "optimized-resume.md";
pub const MARKDOWN_CONTENT_TYPE: &str = "text/markdown; charset=utf-8";

/// The rewritten resume, exactly as the model returned it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct RebuiltDocument(String);

impl RebuiltDocument {
    pub fn new(markdown: impl Into<String>) -> Self {
        Self(markdown.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Markdown download with an attachment disposition; the body is not altered.
pub struct MarkdownDownload(pub RebuiltDocument);

impl IntoResponse for MarkdownDownload {
    fn into_response(self) -> Response {
        (
            [
                (header::CONTENT_TYPE, MARKDOWN_CONTENT_TYPE.to_string()),
                (
                    header::CONTENT_DISPOSITION,
                    format!("attachment; filename=\"{DOWNLOAD_FILE_NAME}\""),
                ),
            ],
            self.0 .0,
        )
            .into_response()
    }
}
