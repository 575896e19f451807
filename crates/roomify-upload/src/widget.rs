//! Upload widget: event handlers, progress cycle and teardown.
//!
//! Lifecycle of an accepted file:
//!
//! ```text
//! Idle -> Reading -> Progressing(0..100) -> Completing -> (callback) Idle
//! ```
//!
//! A decode failure in `Reading` returns to `Idle` without a file. Selecting a
//! new file at any point cancels the running cycle before starting a fresh one.
//!
//! Each cycle carries a generation number. Every state change made by a cycle
//! task is applied only while its generation is still current, so a superseded
//! or torn-down cycle can neither move the progress bar nor fire the callback.
//! The callback itself runs under a gate that `teardown` waits on, so no
//! callback is in flight once `teardown` returns.

use std::sync::{Arc, Mutex, MutexGuard};
use std::thread::{self, ThreadId};

use roomify_core::constants::PROGRESS_MAX;
use roomify_core::{
    LogLevel, SelectedFile, UploadConfig, UploadError, UploadPhase, UploadSnapshot,
};
use tokio::runtime::Handle;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, sleep, Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;

use crate::encoder::FileEncoder;
use crate::session::SessionProvider;
use crate::validator::ContentTypeValidator;
use crate::view::UploadView;

/// Invoked with the data URL once per completed file.
pub type CompletionCallback = Arc<dyn Fn(String) + Send + Sync>;

/// A spawned task together with its cancellation token.
struct TaskHandle {
    cancel: CancellationToken,
    task: JoinHandle<()>,
}

impl TaskHandle {
    fn cancel(self) {
        self.cancel.cancel();
        self.task.abort();
    }
}

struct WidgetState {
    snapshot: UploadSnapshot,
    generation: u64,
    cycle: Option<TaskHandle>,
    torn_down: bool,
    /// Thread currently running the completion callback
    firing_on: Option<ThreadId>,
}

struct Shared {
    config: UploadConfig,
    validator: ContentTypeValidator,
    encoder: Arc<dyn FileEncoder>,
    on_complete: CompletionCallback,
    state: Mutex<WidgetState>,
    /// Held while the completion callback runs
    callback_gate: Mutex<()>,
    snapshot_tx: watch::Sender<UploadSnapshot>,
}

impl Shared {
    fn lock(&self) -> MutexGuard<'_, WidgetState> {
        // Every mutation is applied as a whole under the lock
        self.state
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn lock_callback_gate(&self) -> MutexGuard<'_, ()> {
        self.callback_gate
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn publish(&self, state: &WidgetState) {
        self.snapshot_tx.send_replace(state.snapshot.clone());
    }

    /// Apply `f` unless the widget is torn down.
    fn update<F>(&self, f: F) -> bool
    where
        F: FnOnce(&mut WidgetState),
    {
        let mut state = self.lock();
        if state.torn_down {
            return false;
        }
        f(&mut state);
        self.publish(&state);
        true
    }

    /// Apply `f` only while `generation` is the current cycle.
    fn update_if_current<F>(&self, generation: u64, f: F) -> bool
    where
        F: FnOnce(&mut WidgetState),
    {
        let mut state = self.lock();
        if state.torn_down || state.generation != generation {
            return false;
        }
        f(&mut state);
        self.publish(&state);
        true
    }
}

/// Headless drag-and-drop image upload widget
///
/// Handlers may be called from any thread; timers run on the tokio runtime
/// the widget was mounted on. Dropping the widget tears it down.
pub struct UploadWidget {
    shared: Arc<Shared>,
    session: Arc<dyn SessionProvider>,
    runtime: Handle,
    session_watcher: Mutex<Option<TaskHandle>>,
}

impl UploadWidget {
    /// Mount a widget.
    ///
    /// Must be called from within a tokio runtime. Fails with
    /// [`UploadError::InvalidConfig`] when `config` does not validate.
    pub fn mount<F>(
        config: UploadConfig,
        session: Arc<dyn SessionProvider>,
        encoder: Arc<dyn FileEncoder>,
        on_complete: F,
    ) -> Result<Self, UploadError>
    where
        F: Fn(String) + Send + Sync + 'static,
    {
        config
            .validate()
            .map_err(|e| UploadError::InvalidConfig(e.to_string()))?;

        let runtime = Handle::current();
        let initial = UploadSnapshot::initial(session.is_signed_in());
        let (snapshot_tx, _rx) = watch::channel(initial.clone());

        let shared = Arc::new(Shared {
            validator: ContentTypeValidator::new(config.allowed_content_types.clone()),
            config,
            encoder,
            on_complete: Arc::new(on_complete),
            state: Mutex::new(WidgetState {
                snapshot: initial,
                generation: 0,
                cycle: None,
                torn_down: false,
                firing_on: None,
            }),
            callback_gate: Mutex::new(()),
            snapshot_tx,
        });

        let watcher = Self::spawn_session_watcher(&runtime, shared.clone(), session.subscribe());

        tracing::debug!(
            signed_in = session.is_signed_in(),
            progress_step = shared.config.progress_step,
            progress_interval_ms = shared.config.progress_interval.as_millis() as u64,
            redirect_delay_ms = shared.config.redirect_delay.as_millis() as u64,
            "Upload widget mounted"
        );

        Ok(Self {
            shared,
            session,
            runtime,
            session_watcher: Mutex::new(Some(watcher)),
        })
    }

    /// Keep the snapshot in sync with the session and drop the dragging state
    /// when the user signs out.
    fn spawn_session_watcher(
        runtime: &Handle,
        shared: Arc<Shared>,
        mut session_rx: watch::Receiver<bool>,
    ) -> TaskHandle {
        let cancel = CancellationToken::new();
        let token = cancel.clone();

        let task = runtime.spawn(async move {
            loop {
                tokio::select! {
                    _ = token.cancelled() => break,
                    changed = session_rx.changed() => {
                        if changed.is_err() {
                            tracing::debug!("Session context dropped, stopping watcher");
                            break;
                        }
                        let signed_in = *session_rx.borrow_and_update();
                        shared.update(|state| {
                            state.snapshot.is_signed_in = signed_in;
                            if !signed_in {
                                state.snapshot.is_dragging = false;
                            }
                        });
                    }
                }
            }
        });

        TaskHandle { cancel, task }
    }

    pub fn config(&self) -> &UploadConfig {
        &self.shared.config
    }

    /// Current state
    pub fn snapshot(&self) -> UploadSnapshot {
        self.shared.lock().snapshot.clone()
    }

    /// Receiver notified on every state change
    pub fn subscribe(&self) -> watch::Receiver<UploadSnapshot> {
        self.shared.snapshot_tx.subscribe()
    }

    pub fn render(&self) -> UploadView {
        UploadView::from_snapshot(&self.snapshot(), &self.shared.config)
    }

    pub fn is_torn_down(&self) -> bool {
        self.shared.lock().torn_down
    }

    pub fn handle_drag_enter(&self) -> Result<(), UploadError> {
        self.set_dragging(true)
    }

    pub fn handle_drag_over(&self) -> Result<(), UploadError> {
        self.set_dragging(true)
    }

    pub fn handle_drag_leave(&self) -> Result<(), UploadError> {
        self.set_dragging(false)
    }

    /// Drop of one or more files; only the first one is considered.
    pub fn handle_drop<I>(&self, files: I) -> Result<(), UploadError>
    where
        I: IntoIterator<Item = SelectedFile>,
    {
        self.ensure_interactive()?;
        self.shared.update(|state| state.snapshot.is_dragging = false);

        let file = files.into_iter().next().ok_or(UploadError::NoFile)?;
        self.process_file(file)
    }

    /// Selection through the file input; only the first file is considered.
    pub fn handle_file_change<I>(&self, files: I) -> Result<(), UploadError>
    where
        I: IntoIterator<Item = SelectedFile>,
    {
        self.ensure_interactive()?;

        let file = files.into_iter().next().ok_or(UploadError::NoFile)?;
        self.process_file(file)
    }

    /// Accept `file` and start a new progress cycle, cancelling any running one.
    pub fn process_file(&self, file: SelectedFile) -> Result<(), UploadError> {
        self.ensure_interactive()?;

        if let Err(e) = self.shared.validator.validate_content_type(&file.content_type) {
            log_rejection(&e, &file);
            return Err(e);
        }

        let mut state = self.shared.lock();
        if state.torn_down {
            return Err(UploadError::TornDown);
        }

        if let Some(previous) = state.cycle.take() {
            tracing::debug!(
                generation = state.generation,
                "Cancelling in-flight upload before starting a new one"
            );
            previous.cancel();
        }

        state.generation += 1;
        let generation = state.generation;

        state.snapshot.file_name = Some(file.name.clone());
        state.snapshot.progress = 0;
        state.snapshot.phase = UploadPhase::Reading;

        tracing::info!(
            generation,
            file_name = %file.name,
            content_type = %file.content_type,
            size = file.size(),
            "Upload accepted"
        );

        let cancel = CancellationToken::new();
        let token = cancel.clone();
        let shared = self.shared.clone();
        let task = self.runtime.spawn(async move {
            tokio::select! {
                biased;
                _ = token.cancelled() => {
                    tracing::debug!(generation, "Upload cycle cancelled");
                }
                _ = run_cycle(shared, generation, file) => {}
            }
        });

        state.cycle = Some(TaskHandle { cancel, task });
        self.shared.publish(&state);

        Ok(())
    }

    /// Cancel pending timers and stop reacting to events. Idempotent.
    ///
    /// Blocks until a completion callback running on another thread returns.
    pub fn teardown(&self) {
        let in_callback = {
            let mut state = self.shared.lock();
            if state.torn_down {
                return;
            }
            state.torn_down = true;
            state.generation += 1;
            if let Some(cycle) = state.cycle.take() {
                cycle.cancel();
            }
            state.firing_on == Some(thread::current().id())
        };

        // Called from the callback itself: the gate is ours already
        if !in_callback {
            drop(self.shared.lock_callback_gate());
        }

        let watcher = self
            .session_watcher
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .take();
        if let Some(watcher) = watcher {
            watcher.cancel();
        }

        tracing::debug!("Upload widget torn down");
    }

    fn set_dragging(&self, dragging: bool) -> Result<(), UploadError> {
        self.ensure_interactive()?;
        self.shared.update(|state| state.snapshot.is_dragging = dragging);
        Ok(())
    }

    fn ensure_interactive(&self) -> Result<(), UploadError> {
        if self.is_torn_down() {
            return Err(UploadError::TornDown);
        }
        if !self.session.is_signed_in() {
            tracing::debug!("Ignoring upload interaction while signed out");
            return Err(UploadError::Unauthenticated);
        }
        Ok(())
    }
}

impl Drop for UploadWidget {
    fn drop(&mut self) {
        self.teardown();
    }
}

fn log_rejection(error: &UploadError, file: &SelectedFile) {
    match error.log_level() {
        LogLevel::Debug => tracing::debug!(error = %error, file_name = %file.name, "Upload ignored"),
        LogLevel::Warn => tracing::warn!(
            error = %error,
            file_name = %file.name,
            content_type = %file.content_type,
            "Rejected upload"
        ),
        LogLevel::Error => tracing::error!(error = %error, file_name = %file.name, "Upload failed"),
    }
}

/// Encode the file, tick the progress bar to 100, wait the redirect delay and
/// fire the completion callback.
async fn run_cycle(shared: Arc<Shared>, generation: u64, file: SelectedFile) {
    let data_url = match shared.encoder.read_as_data_url(&file).await {
        Ok(data_url) if !data_url.is_empty() => data_url,
        result => {
            let error = UploadError::Encode(match result {
                Err(e) => e.to_string(),
                Ok(_) => "encoder returned no data".to_string(),
            });
            log_rejection(&error, &file);
            shared.update_if_current(generation, |state| {
                state.snapshot.file_name = None;
                state.snapshot.progress = 0;
                state.snapshot.phase = UploadPhase::Idle;
                state.cycle = None;
            });
            return;
        }
    };

    if !shared.update_if_current(generation, |state| {
        state.snapshot.phase = UploadPhase::Progressing;
    }) {
        return;
    }

    let step = shared.config.progress_step;
    let period = shared.config.progress_interval;
    let mut ticker = interval_at(Instant::now() + period, period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        ticker.tick().await;

        let mut reached = false;
        let current = shared.update_if_current(generation, |state| {
            let next = state
                .snapshot
                .progress
                .saturating_add(step)
                .min(PROGRESS_MAX);
            state.snapshot.progress = next;
            if next == PROGRESS_MAX {
                state.snapshot.phase = UploadPhase::Completing;
                reached = true;
            }
        });

        if !current {
            return;
        }
        if reached {
            break;
        }
    }

    tracing::debug!(generation, file_name = %file.name, "Progress complete, waiting to redirect");
    sleep(shared.config.redirect_delay).await;

    let _gate = shared.lock_callback_gate();
    let fire = shared.update_if_current(generation, |state| {
        state.snapshot.phase = UploadPhase::Idle;
        state.cycle = None;
        state.firing_on = Some(thread::current().id());
    });

    if fire {
        tracing::info!(
            generation,
            file_name = %file.name,
            data_url_len = data_url.len(),
            "Upload complete"
        );
        (shared.on_complete)(data_url);
        shared.lock().firing_on = None;
    }
}
