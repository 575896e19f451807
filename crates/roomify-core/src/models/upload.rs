use bytes::Bytes;
use serde::Serialize;

use crate::constants::{PROGRESS_MAX, STATUS_ANALYZING, STATUS_REDIRECTING};

/// A file handed to the upload widget by the user.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SelectedFile {
    pub name: String,
    /// Declared MIME type, as reported by the file picker or drop event.
    pub content_type: String,
    pub data: Bytes,
}

impl SelectedFile {
    pub fn new(
        name: impl Into<String>,
        content_type: impl Into<String>,
        data: impl Into<Bytes>,
    ) -> Self {
        Self {
            name: name.into(),
            content_type: content_type.into(),
            data: data.into(),
        }
    }

    pub fn size(&self) -> usize {
        self.data.len()
    }
}

/// Lifecycle of one accepted file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum UploadPhase {
    /// Waiting for a file, or done with the previous one.
    Idle,
    /// Encoding the file to a data URL.
    Reading,
    /// Simulated progress ticking towards 100.
    Progressing,
    /// Progress reached 100, completion callback pending.
    Completing,
}

/// Observable state of the upload widget.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UploadSnapshot {
    pub phase: UploadPhase,
    pub file_name: Option<String>,
    pub progress: u8,
    pub is_dragging: bool,
    pub is_signed_in: bool,
}

impl UploadSnapshot {
    pub fn initial(is_signed_in: bool) -> Self {
        Self {
            phase: UploadPhase::Idle,
            file_name: None,
            progress: 0,
            is_dragging: false,
            is_signed_in,
        }
    }

    pub fn has_file(&self) -> bool {
        self.file_name.is_some()
    }

    pub fn is_complete(&self) -> bool {
        self.progress >= PROGRESS_MAX
    }

    pub fn status_text(&self) -> &'static str {
        if self.is_complete() {
            STATUS_REDIRECTING
        } else {
            STATUS_ANALYZING
        }
    }
}
