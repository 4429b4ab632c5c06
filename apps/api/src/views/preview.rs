use serde::Serialize;

use crate::rebuild::document::{RebuiltDocument, DOWNLOAD_FILE_NAME};

/// Rewritten resume preview. `markdown` is also what "copy" puts on the clipboard.
#[derive(Debug, Clone, Serialize)]
pub struct PreviewView {
    pub markdown: String,
    pub download_name: &'static str,
}

impl PreviewView {
    pub fn new(document: &RebuiltDocument) -> Self {
        Self {
            markdown: document.as_str().to_string(),
            download_name: DOWNLOAD_FILE_NAME,
        }
    }
}
