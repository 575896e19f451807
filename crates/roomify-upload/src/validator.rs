use roomify_core::UploadError;
use std::path::Path;

/// Content-type gate for the upload widget
///
/// Only the declared MIME type is checked. The file size hint is never enforced.
#[derive(Clone, Debug)]
pub struct ContentTypeValidator {
    allowed_content_types: Vec<String>,
}

impl ContentTypeValidator {
    pub fn new(allowed_content_types: Vec<String>) -> Self {
        Self {
            allowed_content_types: allowed_content_types
                .into_iter()
                .map(|ct| ct.trim().to_lowercase())
                .collect(),
        }
    }

    pub fn allowed_content_types(&self) -> &[String] {
        &self.allowed_content_types
    }

    /// Validate content type
    pub fn validate_content_type(&self, content_type: &str) -> Result<(), UploadError> {
        let normalized = media_type(content_type);

        if !self
            .allowed_content_types
            .iter()
            .any(|ct| ct == &normalized)
        {
            return Err(UploadError::UnsupportedContentType {
                content_type: content_type.to_string(),
                allowed: self.allowed_content_types.clone(),
            });
        }

        Ok(())
    }
}

/// Bare, lowercased media type: parameters such as `; charset=` are dropped.
pub fn media_type(content_type: &str) -> String {
    content_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_lowercase()
}

/// Guess the declared content type of a file from its extension, the way a
/// browser file picker reports it.
pub fn content_type_for_filename(filename: &str) -> Option<&'static str> {
    let extension = Path::new(filename)
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_lowercase())?;

    let content_type = match extension.as_str() {
        "jpg" | "jpeg" => "image/jpeg",
        "png" => "image/png",
        "gif" => "image/gif",
        "webp" => "image/webp",
        "avif" => "image/avif",
        "svg" => "image/svg+xml",
        "bmp" => "image/bmp",
        "pdf" => "application/pdf",
        "txt" => "text/plain",
        _ => {
            tracing::debug!(extension = %extension, "Unknown extension, no content type");
            return None;
        }
    };

    Some(content_type)
}
