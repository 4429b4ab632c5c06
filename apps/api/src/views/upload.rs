use serde::Serialize;

use crate::upload::encoder::{ACCEPTED_MEDIA_TYPES, MAX_FILE_BYTES};
use crate::upload::FilePayload;

#[derive(Debug, Clone, Serialize)]
pub struct SelectedFileView {
    pub name: String,
    pub media_type: String,
    pub size_label: String,
}

impl From<&FilePayload> for SelectedFileView {
    fn from(file: &FilePayload) -> Self {
        Self {
            name: file.display_name.clone(),
            media_type: file.media_type.clone(),
            size_label: file.size_label(),
        }
    }
}

/// Upload form: current selection plus the limits the form advertises.
#[derive(Debug, Clone, Serialize)]
pub struct UploadView {
    pub selected_file: Option<SelectedFileView>,
    /// A file is still being read; submission waits for it.
    pub reading: bool,
    pub accepted_media_types: Vec<&'static str>,
    pub max_file_size_label: String,
}

impl UploadView {
    pub fn new(selection: Option<&FilePayload>, reading: bool) -> Self {
        Self {
            selected_file: selection.map(SelectedFileView::from),
            reading,
            accepted_media_types: ACCEPTED_MEDIA_TYPES.to_vec(),
            max_file_size_label: format!("{}MB", MAX_FILE_BYTES / 1024 / 1024),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct LoadingView {
    pub file: SelectedFileView,
    pub message: &'static str,
}

impl LoadingView {
    pub fn new(file: &FilePayload) -> Self {
        Self {
            file: file.into(),
            message: "Analyzing your resume against the job description...",
        }
    }
}
