//! Roomify Storage Library
//!
//! This crate provides the key-value store abstraction used for the hosting
//! configuration, with in-memory and local filesystem implementations, plus the
//! hosting helpers built on top of it.
//!
//! # Key format
//!
//! Keys are flat identifiers such as `roomify_hosting_config`. They must not be
//! empty and must not contain `..`, `/` or `\`. Validation is centralized in the
//! `keys` module so all backends stay consistent.

pub mod factory;
pub mod hosting;
pub(crate) mod keys;
#[cfg(feature = "kv-local")]
pub mod local;
#[cfg(feature = "kv-memory")]
pub mod memory;
pub mod traits;

// Re-export commonly used types
pub use factory::create_kv_store;
pub use hosting::{
    create_hosting_slug, get_hosting_config, get_or_create_hosting_config, hosted_asset,
};
#[cfg(feature = "kv-local")]
pub use local::LocalKvStore;
#[cfg(feature = "kv-memory")]
pub use memory::MemoryKvStore;
pub use roomify_core::KvBackend;
pub use traits::{KeyValueStore, KvError, KvResult};
