use roomify_core::constants::{PROMPT_SIGNED_IN, PROMPT_SIGNED_OUT};
use roomify_core::{UploadConfig, UploadSnapshot};
use serde::Serialize;

/// What the host should display for the current widget state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum UploadView {
    /// No file yet: a clickable, droppable region.
    Dropzone {
        is_dragging: bool,
        input_disabled: bool,
        /// Value for the file input `accept` attribute
        accept: String,
        prompt: &'static str,
        help: String,
    },
    /// A file was accepted: name, progress bar and status line.
    Status {
        file_name: String,
        progress: u8,
        status_text: &'static str,
        is_complete: bool,
    },
}

impl UploadView {
    pub fn from_snapshot(snapshot: &UploadSnapshot, config: &UploadConfig) -> Self {
        match &snapshot.file_name {
            Some(file_name) => UploadView::Status {
                file_name: file_name.clone(),
                progress: snapshot.progress,
                status_text: snapshot.status_text(),
                is_complete: snapshot.is_complete(),
            },
            None => UploadView::Dropzone {
                is_dragging: snapshot.is_dragging,
                input_disabled: !snapshot.is_signed_in,
                accept: config.accepted_extensions.clone(),
                prompt: if snapshot.is_signed_in {
                    PROMPT_SIGNED_IN
                } else {
                    PROMPT_SIGNED_OUT
                },
                help: config.size_hint(),
            },
        }
    }

    /// CSS-style class of the drop zone, `dropzone is-dragging` while dragging.
    pub fn class_name(&self) -> &'static str {
        match self {
            UploadView::Dropzone {
                is_dragging: true, ..
            } => "dropzone is-dragging",
            UploadView::Dropzone { .. } => "dropzone",
            UploadView::Status { .. } => "upload-status",
        }
    }
}
