#[cfg(feature = "kv-local")]
use crate::LocalKvStore;
#[cfg(feature = "kv-memory")]
use crate::MemoryKvStore;
use crate::{KeyValueStore, KvBackend, KvResult};
#[cfg(any(not(feature = "kv-local"), not(feature = "kv-memory")))]
use crate::KvError;
use roomify_core::RoomifyConfig;
use std::sync::Arc;

/// Create a key-value store based on configuration
pub async fn create_kv_store(config: &RoomifyConfig) -> KvResult<Arc<dyn KeyValueStore>> {
    match config.kv_backend() {
        #[cfg(feature = "kv-memory")]
        KvBackend::Memory => {
            tracing::info!("Using in-memory key-value store");
            Ok(Arc::new(MemoryKvStore::new()))
        }

        #[cfg(not(feature = "kv-memory"))]
        KvBackend::Memory => Err(KvError::ConfigError(
            "Memory key-value backend not available (kv-memory feature not enabled)".to_string(),
        )),

        #[cfg(feature = "kv-local")]
        KvBackend::Local => {
            tracing::info!(
                path = %config.kv_path().display(),
                "Using local filesystem key-value store"
            );
            let store = LocalKvStore::new(config.kv_path()).await?;
            Ok(Arc::new(store))
        }

        #[cfg(not(feature = "kv-local"))]
        KvBackend::Local => Err(KvError::ConfigError(
            "Local key-value backend not available (kv-local feature not enabled)".to_string(),
        )),
    }
}
