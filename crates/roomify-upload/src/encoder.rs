//! Data URL encoding of selected files.

use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use roomify_core::SelectedFile;

use crate::validator::media_type;

const DEFAULT_CONTENT_TYPE: &str = "application/octet-stream";

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EncodeError {
    #[error("File is empty")]
    Empty,

    #[error("Failed to read file: {0}")]
    Read(String),

    #[error("Malformed data URL: {0}")]
    Malformed(String),
}

/// Encode raw bytes as `data:<media type>;base64,<payload>`.
pub fn encode_data_url(content_type: &str, data: &[u8]) -> String {
    let mime = media_type(content_type);
    let mime = if mime.is_empty() {
        DEFAULT_CONTENT_TYPE
    } else {
        mime.as_str()
    };
    format!("data:{};base64,{}", mime, STANDARD.encode(data))
}

/// Split a base64 data URL back into its content type and bytes.
pub fn parse_data_url(data_url: &str) -> Result<(String, Vec<u8>), EncodeError> {
    let rest = data_url
        .strip_prefix("data:")
        .ok_or_else(|| EncodeError::Malformed("missing data: prefix".to_string()))?;

    let (header, payload) = rest
        .split_once(',')
        .ok_or_else(|| EncodeError::Malformed("missing payload separator".to_string()))?;

    let content_type = header
        .strip_suffix(";base64")
        .ok_or_else(|| EncodeError::Malformed("payload is not base64".to_string()))?;

    let data = STANDARD
        .decode(payload)
        .map_err(|e| EncodeError::Malformed(e.to_string()))?;

    Ok((content_type.to_string(), data))
}

/// Asynchronous file reader producing a data URL
#[async_trait]
pub trait FileEncoder: Send + Sync {
    async fn read_as_data_url(&self, file: &SelectedFile) -> Result<String, EncodeError>;
}

/// Base64 encoder running on the blocking pool.
#[derive(Clone, Copy, Debug, Default)]
pub struct Base64Encoder;

#[async_trait]
impl FileEncoder for Base64Encoder {
    async fn read_as_data_url(&self, file: &SelectedFile) -> Result<String, EncodeError> {
        if file.data.is_empty() {
            return Err(EncodeError::Empty);
        }

        let data = file.data.clone();
        let content_type = file.content_type.clone();
        // Encoding is CPU-bound for large images
        tokio::task::spawn_blocking(move || encode_data_url(&content_type, &data))
            .await
            .map_err(|e| EncodeError::Read(e.to_string()))
    }
}
