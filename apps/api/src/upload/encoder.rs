//! File Encoder: validates media type and size, then base64-encodes the document.
//!
//! Bytes arrive in chunks (multipart stream), so the size cap is enforced while
//! reading: nothing past the limit is buffered.

use base64::{engine::general_purpose::STANDARD, Engine};
use serde::Serialize;
use thiserror::Error;

/// Largest accepted document, inclusive.
pub const MAX_FILE_BYTES: usize = 5 * 1024 * 1024;

/// Media types the model accepts as inline resume data.
pub const ACCEPTED_MEDIA_TYPES: [&str; 3] = ["application/pdf", "image/jpeg", "image/png"];

#[derive(Debug, Error, PartialEq, Eq)]
pub enum UploadError {
    #[error("Please upload a PDF, JPG, or PNG file.")]
    UnsupportedMediaType(String),

    #[error("File size must be less than 5MB.")]
    TooLarge { limit: usize },

    #[error("The uploaded file is empty.")]
    Empty,
}

/// The encoded, transportable form of an uploaded document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FilePayload {
    /// Standard, padded base64 of the raw bytes.
    pub content: String,
    pub media_type: String,
    pub display_name: String,
    pub size_bytes: usize,
}

impl FilePayload {
    /// Size formatted the way the upload form shows it, e.g. "2.00 MB".
    pub fn size_label(&self) -> String {
        format_megabytes(self.size_bytes)
    }
}

pub fn format_megabytes(bytes: usize) -> String {
    format!("{:.2} MB", bytes as f64 / 1024.0 / 1024.0)
}

/// Normalizes a declared content type and checks it against the allow-list.
/// `image/jpg` is a common mislabel for JPEG and is folded into `image/jpeg`.
pub fn normalize_media_type(declared: &str) -> Result<&'static str, UploadError> {
    let essence = declared
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase();
    let essence = if essence == "image/jpg" {
        "image/jpeg".to_string()
    } else {
        essence
    };

    ACCEPTED_MEDIA_TYPES
        .iter()
        .copied()
        .find(|accepted| *accepted == essence)
        .ok_or_else(|| UploadError::UnsupportedMediaType(declared.to_string()))
}

/// Accumulates a streamed upload, enforcing the size cap per chunk.
#[derive(Debug)]
pub struct PayloadBuilder {
    display_name: String,
    media_type: &'static str,
    buf: Vec<u8>,
}

impl PayloadBuilder {
    /// Fails before any bytes are read if the media type is not accepted.
    pub fn new(display_name: impl Into<String>, declared_media_type: &str) -> Result<Self, UploadError> {
        Ok(Self {
            display_name: display_name.into(),
            media_type: normalize_media_type(declared_media_type)?,
            buf: Vec::new(),
        })
    }

    pub fn push(&mut self, chunk: &[u8]) -> Result<(), UploadError> {
        if self.buf.len() + chunk.len() > MAX_FILE_BYTES {
            return Err(UploadError::TooLarge {
                limit: MAX_FILE_BYTES,
            });
        }
        self.buf.extend_from_slice(chunk);
        Ok(())
    }

    pub fn finish(self) -> Result<FilePayload, UploadError> {
        if self.buf.is_empty() {
            return Err(UploadError::Empty);
        }
        Ok(FilePayload {
            content: STANDARD.encode(&self.buf),
            media_type: self.media_type.to_string(),
            display_name: self.display_name,
            size_bytes: self.buf.len(),
        })
    }
}

/// Encodes an in-memory document in one step.
#[cfg(test)]
pub fn encode(
    display_name: &str,
    declared_media_type: &str,
    bytes: &[u8],
) -> Result<FilePayload, UploadError> {
    let mut builder = PayloadBuilder::new(display_name, declared_media_type)?;
    builder.push(bytes)?;
    builder.finish()
}
