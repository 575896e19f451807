//! Error types module
//!
//! Upload errors are returned by the widget handlers so callers can react to them.
//! The widget also logs each one at the level reported by [`UploadError::log_level`];
//! returning an error never changes the completion guarantees.

/// Log level for error reporting
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    /// Debug level - for expected, silently ignored input
    Debug,
    /// Warning level - for rejected input
    Warn,
    /// Error level - for unexpected failures
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum UploadError {
    #[error("Not signed in")]
    Unauthenticated,

    #[error("No file selected")]
    NoFile,

    #[error("Unsupported content type: {content_type} (allowed: {allowed:?})")]
    UnsupportedContentType {
        content_type: String,
        allowed: Vec<String>,
    },

    #[error("Failed to read file: {0}")]
    Encode(String),

    #[error("Upload widget has been torn down")]
    TornDown,

    #[error("Invalid upload configuration: {0}")]
    InvalidConfig(String),
}

impl UploadError {
    pub fn log_level(&self) -> LogLevel {
        match self {
            UploadError::Unauthenticated | UploadError::NoFile | UploadError::TornDown => {
                LogLevel::Debug
            }
            UploadError::UnsupportedContentType { .. } => LogLevel::Warn,
            UploadError::Encode(_) | UploadError::InvalidConfig(_) => LogLevel::Error,
        }
    }

    /// Machine-readable error code
    pub fn error_code(&self) -> &'static str {
        match self {
            UploadError::Unauthenticated => "UNAUTHENTICATED",
            UploadError::NoFile => "NO_FILE",
            UploadError::UnsupportedContentType { .. } => "UNSUPPORTED_CONTENT_TYPE",
            UploadError::Encode(_) => "ENCODE_FAILED",
            UploadError::TornDown => "TORN_DOWN",
            UploadError::InvalidConfig(_) => "INVALID_CONFIG",
        }
    }
}
