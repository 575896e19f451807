use std::sync::Arc;

use anyhow::Context;
use roomify_core::{SelectedFile, UploadConfig, UploadSnapshot};
use roomify_upload::{AuthContext, FileEncoder, UploadWidget};
use serde::Serialize;
use tokio::sync::mpsc;

/// Truncate a string to max_len characters, appending "..." if truncated.
pub fn truncate_string(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}

/// Summary printed once an upload completes.
#[derive(Debug, Serialize)]
pub struct UploadSummary {
    pub file_name: String,
    pub content_type: String,
    pub size_bytes: usize,
    pub data_url_len: usize,
    /// Start of the data URL, or the whole URL with `--full`
    pub data_url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub written_to: Option<String>,
}

/// Hosting details printed by the `hosting` command.
#[derive(Debug, Serialize)]
pub struct HostingSummary {
    pub subdomain: String,
    pub host: String,
    pub url: String,
    pub created: bool,
}

/// Progress line for stderr, e.g. ` 40% Analyzing Floor Plan...`.
pub fn progress_line(progress: u8, status_text: &str) -> String {
    format!("{:>3}% {}", progress, status_text)
}

/// Mount a widget, feed it `file` and wait for the completion callback.
///
/// `on_progress` sees every snapshot whose progress differs from the last one
/// reported. Fails when the widget rejects the file or cannot encode it.
pub async fn run_upload<P>(
    config: UploadConfig,
    file: SelectedFile,
    signed_in: bool,
    encoder: Arc<dyn FileEncoder>,
    mut on_progress: P,
) -> anyhow::Result<String>
where
    P: FnMut(&UploadSnapshot),
{
    let file_name = file.name.clone();
    let auth = Arc::new(AuthContext::new(signed_in));
    let (done_tx, mut done_rx) = mpsc::unbounded_channel();
    let widget = UploadWidget::mount(config, auth, encoder, move |data_url| {
        let _ = done_tx.send(data_url);
    })
    .context("Failed to mount upload widget")?;

    let mut updates = widget.subscribe();
    widget
        .handle_file_change(vec![file])
        .with_context(|| format!("Upload of {} rejected", file_name))?;

    let mut last_progress = None;
    let data_url = loop {
        tokio::select! {
            Some(data_url) = done_rx.recv() => break data_url,
            changed = updates.changed() => {
                changed.context("Upload widget stopped")?;
                let snapshot = updates.borrow_and_update().clone();
                if !snapshot.has_file() {
                    anyhow::bail!("Failed to encode {}", file_name);
                }
                if last_progress != Some(snapshot.progress) {
                    on_progress(&snapshot);
                    last_progress = Some(snapshot.progress);
                }
            }
        }
    };
    widget.teardown();

    Ok(data_url)
}


/// Initialize tracing for CLI binaries.
pub fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();
}
