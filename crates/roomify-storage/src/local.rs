use crate::keys::validate_key;
use crate::traits::{KeyValueStore, KvError, KvResult};
use crate::KvBackend;
use async_trait::async_trait;
use std::io::ErrorKind;
use std::path::PathBuf;
use tokio::fs;
use tokio::io::AsyncWriteExt;

/// Local filesystem key-value store
///
/// Every key is a JSON file `{base_path}/{key}.json`.
#[derive(Clone)]
pub struct LocalKvStore {
    base_path: PathBuf,
}

impl LocalKvStore {
    /// Create a new LocalKvStore instance
    ///
    /// # Arguments
    /// * `base_path` - Root directory for the value files (e.g., ".roomify/kv")
    pub async fn new(base_path: impl Into<PathBuf>) -> KvResult<Self> {
        let base_path = base_path.into();

        fs::create_dir_all(&base_path).await.map_err(|e| {
            KvError::ConfigError(format!(
                "Failed to create key-value directory {}: {}",
                base_path.display(),
                e
            ))
        })?;

        Ok(LocalKvStore { base_path })
    }

    fn key_to_path(&self, key: &str) -> KvResult<PathBuf> {
        validate_key(key)?;
        Ok(self.base_path.join(format!("{}.json", key)))
    }
}

#[async_trait]
impl KeyValueStore for LocalKvStore {
    async fn get(&self, key: &str) -> KvResult<Option<serde_json::Value>> {
        let path = self.key_to_path(key)?;

        let raw = match fs::read(&path).await {
            Ok(raw) => raw,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };

        let value = serde_json::from_slice(&raw)?;
        Ok(Some(value))
    }

    async fn set(&self, key: &str, value: serde_json::Value) -> KvResult<()> {
        let path = self.key_to_path(key)?;
        let tmp_path = path.with_extension("json.tmp");

        let body = serde_json::to_vec_pretty(&value)?;

        // Write then rename so readers never observe a partial document
        let mut file = fs::File::create(&tmp_path).await?;
        file.write_all(&body).await?;
        file.sync_all().await?;
        drop(file);
        fs::rename(&tmp_path, &path).await?;

        tracing::debug!(
            key = %key,
            path = %path.display(),
            bytes = body.len(),
            "Stored value on local filesystem"
        );

        Ok(())
    }

    async fn delete(&self, key: &str) -> KvResult<bool> {
        let path = self.key_to_path(key)?;

        match fs::remove_file(&path).await {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e.into()),
        }
    }

    fn backend_type(&self) -> KvBackend {
        KvBackend::Local
    }
}
