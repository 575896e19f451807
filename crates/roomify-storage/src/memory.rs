use crate::keys::validate_key;
use crate::traits::{KeyValueStore, KvResult};
use crate::KvBackend;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

/// In-memory key-value store
///
/// Clones share the same map.
#[derive(Clone, Default)]
pub struct MemoryKvStore {
    entries: Arc<Mutex<HashMap<String, serde_json::Value>>>,
}

impl MemoryKvStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<String, serde_json::Value>> {
        // A poisoned map is still consistent: every write is a single insert/remove.
        self.entries
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[async_trait]
impl KeyValueStore for MemoryKvStore {
    async fn get(&self, key: &str) -> KvResult<Option<serde_json::Value>> {
        validate_key(key)?;
        Ok(self.lock().get(key).cloned())
    }

    async fn set(&self, key: &str, value: serde_json::Value) -> KvResult<()> {
        validate_key(key)?;
        self.lock().insert(key.to_string(), value);
        tracing::debug!(key = %key, "Stored value in memory");
        Ok(())
    }

    async fn delete(&self, key: &str) -> KvResult<bool> {
        validate_key(key)?;
        Ok(self.lock().remove(key).is_some())
    }

    fn backend_type(&self) -> KvBackend {
        KvBackend::Memory
    }
}
