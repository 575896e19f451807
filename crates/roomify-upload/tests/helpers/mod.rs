//! Test helpers: mount a widget with a recording completion callback.
//!
//! Run with: `cargo test -p roomify-upload --test widget_test`

pub mod fixtures;

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use roomify_core::{SelectedFile, UploadConfig};
use roomify_upload::{AuthContext, Base64Encoder, EncodeError, FileEncoder, UploadWidget};
use tokio::sync::mpsc;
use tokio::time::{timeout, Instant};

pub use fixtures::{jpeg_file, png_file};

/// Completion payloads with the instant the callback ran.
pub type Completions = mpsc::UnboundedReceiver<(String, Instant)>;

pub fn mount(auth: &Arc<AuthContext>, config: UploadConfig) -> (UploadWidget, Completions) {
    mount_with_encoder(auth, config, Arc::new(Base64Encoder))
}

pub fn mount_with_encoder(
    auth: &Arc<AuthContext>,
    config: UploadConfig,
    encoder: Arc<dyn FileEncoder>,
) -> (UploadWidget, Completions) {
    let (tx, rx) = mpsc::unbounded_channel();
    let widget = UploadWidget::mount(config, auth.clone(), encoder, move |data_url| {
        let _ = tx.send((data_url, Instant::now()));
    })
    .expect("valid upload config");
    (widget, rx)
}

/// Wait until the widget reports at least `progress`.
pub async fn wait_for_progress(widget: &UploadWidget, progress: u8) {
    let mut rx = widget.subscribe();
    timeout(
        Duration::from_secs(10),
        rx.wait_for(|s| s.progress >= progress),
    )
    .await
    .expect("progress not reached")
    .expect("widget dropped");
}

/// Timer deadlines are rounded to the millisecond.
pub fn assert_elapsed(actual: Duration, expected: Duration) {
    assert!(
        actual >= expected && actual <= expected + Duration::from_millis(2),
        "expected ~{expected:?}, got {actual:?}"
    );
}

/// Encoder that always fails, as for an unreadable file.
pub struct FailingEncoder;

#[async_trait]
impl FileEncoder for FailingEncoder {
    async fn read_as_data_url(&self, _file: &SelectedFile) -> Result<String, EncodeError> {
        Err(EncodeError::Read("unreadable".to_string()))
    }
}

/// Encoder that takes `delay` before producing the data URL.
pub struct SlowEncoder {
    delay: Duration,
}

impl SlowEncoder {
    pub fn new(delay: Duration) -> Self {
        Self { delay }
    }
}

#[async_trait]
impl FileEncoder for SlowEncoder {
    async fn read_as_data_url(&self, file: &SelectedFile) -> Result<String, EncodeError> {
        tokio::time::sleep(self.delay).await;
        Base64Encoder.read_as_data_url(file).await
    }
}
