//! Roomify Core Library
//!
//! This crate provides the constants, configuration, error types and domain models
//! shared by the upload widget, the key-value storage layer and the CLI.

pub mod config;
pub mod constants;
pub mod error;
pub mod kv_types;
pub mod models;

// Re-export commonly used types
pub use config::{RoomifyConfig, UploadConfig};
pub use error::{LogLevel, UploadError};
pub use kv_types::KvBackend;
pub use models::{HostedAsset, HostingConfig, SelectedFile, UploadPhase, UploadSnapshot};
