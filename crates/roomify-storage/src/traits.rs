//! Key-value store abstraction trait
//!
//! This module defines the KeyValueStore trait that all backends must implement.

use crate::KvBackend;
use async_trait::async_trait;
use thiserror::Error;

/// Key-value operation errors
#[derive(Debug, Error)]
pub enum KvError {
    #[error("Invalid key: {0}")]
    InvalidKey(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    ConfigError(String),
}

/// Result type for key-value operations
pub type KvResult<T> = Result<T, KvError>;

/// Key-value store abstraction
///
/// Values are JSON documents. The hosting helpers only depend on this trait,
/// so any backend (or a test double) can stand in for the platform store.
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    /// Fetch the value stored under `key`, `None` when absent
    async fn get(&self, key: &str) -> KvResult<Option<serde_json::Value>>;

    /// Store `value` under `key`, replacing any previous value
    async fn set(&self, key: &str, value: serde_json::Value) -> KvResult<()>;

    /// Remove `key`, returning whether it was present
    async fn delete(&self, key: &str) -> KvResult<bool>;

    /// Get the backend type
    fn backend_type(&self) -> KvBackend;
}
