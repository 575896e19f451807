//! Shared key validation for key-value backends.

use crate::traits::{KvError, KvResult};

const MAX_KEY_LEN: usize = 256;

/// Validate a key before it reaches a backend.
///
/// Keys become file names in the local backend, so anything that could escape
/// the base directory is rejected.
pub fn validate_key(key: &str) -> KvResult<()> {
    if key.trim().is_empty() {
        return Err(KvError::InvalidKey("Key must not be empty".to_string()));
    }

    if key.len() > MAX_KEY_LEN {
        return Err(KvError::InvalidKey(format!(
            "Key exceeds {} characters",
            MAX_KEY_LEN
        )));
    }

    if key.contains("..") || key.contains('/') || key.contains('\\') {
        return Err(KvError::InvalidKey(
            "Key contains invalid characters".to_string(),
        ));
    }

    Ok(())
}
