//! Configuration module
//!
//! Settings for the upload widget timings, the accepted content types and the
//! key-value store backing the hosting configuration. Values come from the
//! environment (a `.env` file is honoured) and fall back to the constants in
//! [`crate::constants`].

use std::env;
use std::path::PathBuf;
use std::time::Duration;

use crate::constants::{
    ACCEPTED_EXTENSIONS, ALLOWED_CONTENT_TYPES, MAX_FILE_SIZE_HINT_MB, PROGRESS_INTERVAL_MS,
    PROGRESS_MAX, PROGRESS_STEP, REDIRECT_DELAY_MS,
};
use crate::kv_types::KvBackend;

const DEFAULT_KV_PATH: &str = ".roomify/kv";

/// Settings consumed by the upload widget.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UploadConfig {
    pub progress_step: u8,
    pub progress_interval: Duration,
    pub redirect_delay: Duration,
    /// Shown to the user, never enforced.
    pub max_file_size_hint_mb: u64,
    pub allowed_content_types: Vec<String>,
    pub accepted_extensions: String,
}

impl Default for UploadConfig {
    fn default() -> Self {
        Self {
            progress_step: PROGRESS_STEP,
            progress_interval: Duration::from_millis(PROGRESS_INTERVAL_MS),
            redirect_delay: Duration::from_millis(REDIRECT_DELAY_MS),
            max_file_size_hint_mb: MAX_FILE_SIZE_HINT_MB,
            allowed_content_types: ALLOWED_CONTENT_TYPES
                .iter()
                .map(|s| s.to_string())
                .collect(),
            accepted_extensions: ACCEPTED_EXTENSIONS.to_string(),
        }
    }
}

impl UploadConfig {
    pub fn validate(&self) -> Result<(), anyhow::Error> {
        if self.progress_step == 0 || self.progress_step > PROGRESS_MAX {
            return Err(anyhow::anyhow!(
                "ROOMIFY_PROGRESS_STEP must be between 1 and {}",
                PROGRESS_MAX
            ));
        }

        if self.progress_interval.is_zero() {
            return Err(anyhow::anyhow!(
                "ROOMIFY_PROGRESS_INTERVAL_MS must be greater than 0"
            ));
        }

        if self.allowed_content_types.is_empty() {
            return Err(anyhow::anyhow!(
                "ROOMIFY_ALLOWED_CONTENT_TYPES must list at least one content type"
            ));
        }

        Ok(())
    }

    /// Help line displayed under the drop zone.
    pub fn size_hint(&self) -> String {
        format!("Maximum file size {} MB.", self.max_file_size_hint_mb)
    }
}

/// Application configuration.
#[derive(Clone, Debug)]
pub struct RoomifyConfig {
    pub upload: UploadConfig,
    pub kv_backend: KvBackend,
    pub kv_path: PathBuf,
}

impl Default for RoomifyConfig {
    fn default() -> Self {
        Self {
            upload: UploadConfig::default(),
            kv_backend: KvBackend::Local,
            kv_path: PathBuf::from(DEFAULT_KV_PATH),
        }
    }
}

impl RoomifyConfig {
    pub fn from_env() -> Result<Self, anyhow::Error> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build the configuration from an arbitrary variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, anyhow::Error>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).filter(|s| !s.trim().is_empty());

        let progress_step = match var("ROOMIFY_PROGRESS_STEP") {
            Some(s) => s
                .trim()
                .parse::<u8>()
                .map_err(|_| anyhow::anyhow!("ROOMIFY_PROGRESS_STEP must be a valid number"))?,
            None => PROGRESS_STEP,
        };

        let progress_interval_ms = match var("ROOMIFY_PROGRESS_INTERVAL_MS") {
            Some(s) => s.trim().parse::<u64>().map_err(|_| {
                anyhow::anyhow!("ROOMIFY_PROGRESS_INTERVAL_MS must be a valid number")
            })?,
            None => PROGRESS_INTERVAL_MS,
        };

        let redirect_delay_ms = match var("ROOMIFY_REDIRECT_DELAY_MS") {
            Some(s) => s.trim().parse::<u64>().map_err(|_| {
                anyhow::anyhow!("ROOMIFY_REDIRECT_DELAY_MS must be a valid number")
            })?,
            None => REDIRECT_DELAY_MS,
        };

        let max_file_size_hint_mb = var("ROOMIFY_MAX_FILE_SIZE_MB")
            .and_then(|s| s.trim().parse::<u64>().ok())
            .unwrap_or(MAX_FILE_SIZE_HINT_MB);

        let allowed_content_types = var("ROOMIFY_ALLOWED_CONTENT_TYPES")
            .map(|s| {
                s.split(',')
                    .map(|ct| ct.trim().to_lowercase())
                    .filter(|ct| !ct.is_empty())
                    .collect()
            })
            .unwrap_or_else(|| UploadConfig::default().allowed_content_types);

        let kv_backend = match var("ROOMIFY_KV_BACKEND") {
            Some(s) => s.parse::<KvBackend>()?,
            None => KvBackend::Local,
        };

        let kv_path = var("ROOMIFY_KV_PATH")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_KV_PATH));

        let config = RoomifyConfig {
            upload: UploadConfig {
                progress_step,
                progress_interval: Duration::from_millis(progress_interval_ms),
                redirect_delay: Duration::from_millis(redirect_delay_ms),
                max_file_size_hint_mb,
                allowed_content_types,
                accepted_extensions: ACCEPTED_EXTENSIONS.to_string(),
            },
            kv_backend,
            kv_path,
        };

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), anyhow::Error> {
        self.upload.validate()?;

        if self.kv_backend == KvBackend::Local && self.kv_path.as_os_str().is_empty() {
            return Err(anyhow::anyhow!(
                "ROOMIFY_KV_PATH must be set when using the local key-value backend"
            ));
        }

        Ok(())
    }

    pub fn upload(&self) -> &UploadConfig {
        &self.upload
    }

    pub fn kv_backend(&self) -> KvBackend {
        self.kv_backend
    }

    pub fn kv_path(&self) -> &std::path::Path {
        &self.kv_path
    }
}
