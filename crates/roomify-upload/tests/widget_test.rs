mod helpers;

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, OnceLock, Weak};
use std::time::Duration;

use helpers::{
    assert_elapsed, jpeg_file, mount, mount_with_encoder, png_file, wait_for_progress,
    FailingEncoder, SlowEncoder,
};
use roomify_core::{SelectedFile, UploadConfig, UploadError, UploadPhase, UploadSnapshot};
use roomify_upload::{
    encode_data_url, parse_data_url, AuthContext, Base64Encoder, UploadView, UploadWidget,
};
use tokio::sync::mpsc;
use tokio::time::{sleep, timeout, Instant};

/// Short timers for tests on a real multi-threaded runtime.
fn fast_config() -> UploadConfig {
    UploadConfig {
        progress_step: 50,
        progress_interval: Duration::from_millis(1),
        redirect_delay: Duration::from_millis(1),
        ..UploadConfig::default()
    }
}

#[tokio::test(start_paused = true)]
async fn test_progress_then_single_completion() {
    let auth = Arc::new(AuthContext::new(true));
    let (widget, mut completions) = mount(&auth, UploadConfig::default());
    let file = png_file("plan.png", 10 * 1024);
    let mut rx = widget.subscribe();

    widget.handle_drop(vec![file.clone()]).unwrap();
    assert_eq!(widget.snapshot().progress, 0);

    let mut steps: Vec<(u8, Instant)> = Vec::new();
    let mut last = 0;
    loop {
        rx.changed().await.unwrap();
        let snapshot = rx.borrow_and_update().clone();
        assert!(snapshot.progress >= last, "progress went backwards");
        if snapshot.progress != last {
            steps.push((snapshot.progress, Instant::now()));
            last = snapshot.progress;
        }
        assert!(
            completions.try_recv().is_err(),
            "callback fired before progress completed"
        );
        if snapshot.progress == 100 {
            assert_eq!(snapshot.phase, UploadPhase::Completing);
            break;
        }
    }

    let values: Vec<u8> = steps.iter().map(|(p, _)| *p).collect();
    assert_eq!(values, vec![10, 20, 30, 40, 50, 60, 70, 80, 90, 100]);
    for pair in steps.windows(2) {
        assert_elapsed(pair[1].1 - pair[0].1, Duration::from_millis(50));
    }

    let (data_url, fired_at) = completions.recv().await.unwrap();
    assert_elapsed(fired_at - steps[9].1, Duration::from_millis(300));
    assert!(data_url.starts_with("data:image/png;base64,"));
    let (content_type, data) = parse_data_url(&data_url).unwrap();
    assert_eq!(content_type, "image/png");
    assert_eq!(data, file.data.to_vec());

    sleep(Duration::from_secs(5)).await;
    assert!(completions.try_recv().is_err(), "callback fired twice");

    let snapshot = widget.snapshot();
    assert_eq!(snapshot.phase, UploadPhase::Idle);
    assert_eq!(snapshot.progress, 100);
    assert_eq!(snapshot.file_name.as_deref(), Some("plan.png"));
}

#[tokio::test(start_paused = true)]
async fn test_unsupported_type_never_completes() {
    let auth = Arc::new(AuthContext::new(true));
    let (widget, mut completions) = mount(&auth, UploadConfig::default());
    let before = widget.snapshot();

    for content_type in ["image/gif", "application/pdf", "text/plain", ""] {
        let file = SelectedFile::new("floor.bin", content_type, vec![1u8; 64]);
        let result = widget.handle_file_change(vec![file]);
        assert!(matches!(
            result,
            Err(UploadError::UnsupportedContentType { .. })
        ));
        assert_eq!(widget.snapshot(), before);
    }

    sleep(Duration::from_secs(2)).await;
    assert!(completions.try_recv().is_err());
    assert_eq!(widget.snapshot(), before);
}

#[tokio::test(start_paused = true)]
async fn test_only_first_dropped_file_is_considered() {
    let auth = Arc::new(AuthContext::new(true));
    let (widget, mut completions) = mount(&auth, UploadConfig::default());

    let gif = SelectedFile::new("anim.gif", "image/gif", vec![7u8; 16]);
    let result = widget.handle_drop(vec![gif.clone(), png_file("plan.png", 32)]);
    assert!(matches!(
        result,
        Err(UploadError::UnsupportedContentType { .. })
    ));
    assert!(!widget.snapshot().has_file());

    assert_eq!(widget.handle_drop(Vec::<SelectedFile>::new()), Err(UploadError::NoFile));

    let first = jpeg_file("first.jpg", 32);
    widget.handle_drop(vec![first.clone(), gif]).unwrap();
    assert_eq!(widget.snapshot().file_name.as_deref(), Some("first.jpg"));

    let (data_url, _) = completions.recv().await.unwrap();
    assert_eq!(data_url, encode_data_url("image/jpeg", &first.data));
}

#[tokio::test(start_paused = true)]
async fn test_second_upload_cancels_first() {
    let auth = Arc::new(AuthContext::new(true));
    let (widget, mut completions) = mount(&auth, UploadConfig::default());
    let first = png_file("first.png", 128);
    let second = jpeg_file("second.jpg", 256);

    widget.handle_drop(vec![first]).unwrap();
    wait_for_progress(&widget, 30).await;

    widget.handle_file_change(vec![second.clone()]).unwrap();
    let snapshot = widget.snapshot();
    assert_eq!(snapshot.progress, 0);
    assert_eq!(snapshot.phase, UploadPhase::Reading);
    assert_eq!(snapshot.file_name.as_deref(), Some("second.jpg"));

    let (data_url, _) = completions.recv().await.unwrap();
    assert_eq!(data_url, encode_data_url("image/jpeg", &second.data));

    sleep(Duration::from_secs(5)).await;
    assert!(completions.try_recv().is_err(), "first file's callback fired");
}

#[tokio::test(start_paused = true)]
async fn test_new_file_during_redirect_delay_cancels_pending_callback() {
    let auth = Arc::new(AuthContext::new(true));
    let (widget, mut completions) = mount(&auth, UploadConfig::default());
    let second = png_file("second.png", 64);

    widget.handle_drop(vec![png_file("first.png", 64)]).unwrap();
    wait_for_progress(&widget, 100).await;
    assert_eq!(widget.snapshot().phase, UploadPhase::Completing);

    sleep(Duration::from_millis(100)).await;
    widget.handle_drop(vec![second.clone()]).unwrap();

    let (data_url, _) = completions.recv().await.unwrap();
    assert_eq!(data_url, encode_data_url("image/png", &second.data));
    sleep(Duration::from_secs(5)).await;
    assert!(completions.try_recv().is_err());
}

#[tokio::test(start_paused = true)]
async fn test_reselect_while_reading_supersedes_first() {
    let auth = Arc::new(AuthContext::new(true));
    let encoder = Arc::new(SlowEncoder::new(Duration::from_millis(200)));
    let (widget, mut completions) = mount_with_encoder(&auth, UploadConfig::default(), encoder);

    widget.handle_drop(vec![png_file("first.png", 16)]).unwrap();
    sleep(Duration::from_millis(50)).await;
    assert_eq!(widget.snapshot().phase, UploadPhase::Reading);

    let second = png_file("second.png", 24);
    widget.handle_drop(vec![second.clone()]).unwrap();

    let (data_url, _) = completions.recv().await.unwrap();
    assert_eq!(data_url, encode_data_url("image/png", &second.data));
    sleep(Duration::from_secs(5)).await;
    assert!(completions.try_recv().is_err());
}

#[tokio::test(start_paused = true)]
async fn test_teardown_while_progressing_suppresses_callback() {
    let auth = Arc::new(AuthContext::new(true));
    let (widget, mut completions) = mount(&auth, UploadConfig::default());

    widget.handle_drop(vec![png_file("plan.png", 512)]).unwrap();
    wait_for_progress(&widget, 40).await;

    widget.teardown();
    let frozen = widget.snapshot();
    assert!(widget.is_torn_down());

    sleep(Duration::from_secs(5)).await;
    assert!(completions.try_recv().is_err());
    assert_eq!(widget.snapshot(), frozen);

    assert_eq!(
        widget.handle_drop(vec![png_file("again.png", 8)]),
        Err(UploadError::TornDown)
    );
    assert_eq!(widget.handle_drag_enter(), Err(UploadError::TornDown));

    // Idempotent
    widget.teardown();
}

#[tokio::test(start_paused = true)]
async fn test_teardown_during_redirect_delay_suppresses_callback() {
    let auth = Arc::new(AuthContext::new(true));
    let (widget, mut completions) = mount(&auth, UploadConfig::default());

    widget.handle_drop(vec![png_file("plan.png", 512)]).unwrap();
    wait_for_progress(&widget, 100).await;
    sleep(Duration::from_millis(150)).await;

    widget.teardown();
    sleep(Duration::from_secs(5)).await;
    assert!(completions.try_recv().is_err());
}

#[tokio::test(start_paused = true)]
async fn test_dropping_widget_cancels_timers() {
    let auth = Arc::new(AuthContext::new(true));
    let (widget, mut completions) = mount(&auth, UploadConfig::default());

    widget.handle_drop(vec![png_file("plan.png", 512)]).unwrap();
    wait_for_progress(&widget, 20).await;
    drop(widget);

    sleep(Duration::from_secs(5)).await;
    assert!(completions.try_recv().is_err());
}

#[tokio::test(start_paused = true)]
async fn test_decode_failure_resets_to_empty_state() {
    let auth = Arc::new(AuthContext::new(true));
    let (widget, mut completions) =
        mount_with_encoder(&auth, UploadConfig::default(), Arc::new(FailingEncoder));
    let mut rx = widget.subscribe();

    widget.handle_drop(vec![png_file("corrupt.png", 64)]).unwrap();
    assert_eq!(widget.snapshot().phase, UploadPhase::Reading);

    let snapshot = timeout(
        Duration::from_secs(1),
        rx.wait_for(|s| s.phase == UploadPhase::Idle && !s.has_file()),
    )
    .await
    .expect("widget did not reset")
    .unwrap()
    .clone();
    assert_eq!(snapshot.progress, 0);

    sleep(Duration::from_secs(5)).await;
    assert!(completions.try_recv().is_err());
    assert!(matches!(widget.render(), UploadView::Dropzone { .. }));
}

#[tokio::test(start_paused = true)]
async fn test_empty_file_is_a_decode_failure() {
    let auth = Arc::new(AuthContext::new(true));
    let (widget, mut completions) = mount(&auth, UploadConfig::default());
    let mut rx = widget.subscribe();

    widget
        .handle_drop(vec![SelectedFile::new("empty.png", "image/png", Vec::new())])
        .unwrap();

    timeout(Duration::from_secs(1), rx.wait_for(|s| !s.has_file()))
        .await
        .expect("widget did not reset")
        .unwrap();

    sleep(Duration::from_secs(5)).await;
    assert!(completions.try_recv().is_err());
}

#[tokio::test(start_paused = true)]
async fn test_signed_out_handlers_are_noops() {
    let auth = Arc::new(AuthContext::new(false));
    let (widget, mut completions) = mount(&auth, UploadConfig::default());

    assert_eq!(widget.handle_drag_enter(), Err(UploadError::Unauthenticated));
    assert_eq!(widget.handle_drag_over(), Err(UploadError::Unauthenticated));
    assert_eq!(widget.handle_drag_leave(), Err(UploadError::Unauthenticated));
    assert_eq!(
        widget.handle_drop(vec![png_file("plan.png", 8)]),
        Err(UploadError::Unauthenticated)
    );
    assert_eq!(
        widget.handle_file_change(vec![png_file("plan.png", 8)]),
        Err(UploadError::Unauthenticated)
    );
    assert_eq!(widget.snapshot(), UploadSnapshot::initial(false));

    match widget.render() {
        UploadView::Dropzone {
            input_disabled,
            prompt,
            ..
        } => {
            assert!(input_disabled);
            assert_eq!(prompt, "Sign in or Sign up with Puter to upload");
        }
        other => panic!("expected dropzone, got {other:?}"),
    }

    sleep(Duration::from_secs(2)).await;
    assert!(completions.try_recv().is_err());
}

#[tokio::test(start_paused = true)]
async fn test_sign_out_clears_dragging_and_blocks_drop() {
    let auth = Arc::new(AuthContext::new(true));
    let (widget, mut completions) = mount(&auth, UploadConfig::default());
    let mut rx = widget.subscribe();

    widget.handle_drag_enter().unwrap();
    assert!(widget.snapshot().is_dragging);
    assert_eq!(widget.render().class_name(), "dropzone is-dragging");

    auth.sign_out();
    timeout(
        Duration::from_secs(1),
        rx.wait_for(|s| !s.is_dragging && !s.is_signed_in),
    )
    .await
    .expect("dragging state was not cleared")
    .unwrap();

    assert_eq!(
        widget.handle_drop(vec![png_file("plan.png", 8)]),
        Err(UploadError::Unauthenticated)
    );
    assert_eq!(widget.handle_drag_over(), Err(UploadError::Unauthenticated));
    assert!(!widget.snapshot().is_dragging);
    assert!(!widget.snapshot().has_file());

    auth.sign_in();
    timeout(Duration::from_secs(1), rx.wait_for(|s| s.is_signed_in))
        .await
        .expect("sign-in was not observed")
        .unwrap();

    widget.handle_drag_enter().unwrap();
    widget.handle_drop(vec![png_file("plan.png", 8)]).unwrap();
    assert!(!widget.snapshot().is_dragging);

    let (data_url, _) = completions.recv().await.unwrap();
    assert!(data_url.starts_with("data:image/png;base64,"));
}

#[tokio::test(start_paused = true)]
async fn test_drag_leave_clears_dragging() {
    let auth = Arc::new(AuthContext::new(true));
    let (widget, _completions) = mount(&auth, UploadConfig::default());

    widget.handle_drag_over().unwrap();
    assert!(widget.snapshot().is_dragging);
    widget.handle_drag_leave().unwrap();
    assert!(!widget.snapshot().is_dragging);
}

#[tokio::test(start_paused = true)]
async fn test_custom_step_overshoot_is_clamped() {
    let auth = Arc::new(AuthContext::new(true));
    let config = UploadConfig {
        progress_step: 30,
        progress_interval: Duration::from_millis(20),
        redirect_delay: Duration::from_millis(10),
        ..UploadConfig::default()
    };
    let (widget, mut completions) = mount(&auth, config);
    let mut rx = widget.subscribe();

    widget.handle_drop(vec![png_file("plan.png", 8)]).unwrap();

    let mut seen = Vec::new();
    while seen.last() != Some(&100) {
        rx.changed().await.unwrap();
        let progress = rx.borrow_and_update().progress;
        if progress != 0 && seen.last() != Some(&progress) {
            seen.push(progress);
        }
    }
    assert_eq!(seen, vec![30, 60, 90, 100]);
    assert!(completions.recv().await.is_some());
}

#[tokio::test]
async fn test_mount_rejects_invalid_config() {
    let auth = Arc::new(AuthContext::new(true));
    let invalid = [
        UploadConfig {
            progress_interval: Duration::ZERO,
            ..UploadConfig::default()
        },
        UploadConfig {
            progress_step: 0,
            ..UploadConfig::default()
        },
        UploadConfig {
            allowed_content_types: Vec::new(),
            ..UploadConfig::default()
        },
    ];

    for config in invalid {
        let result = UploadWidget::mount(config, auth.clone(), Arc::new(Base64Encoder), |_| {});
        assert!(matches!(result, Err(UploadError::InvalidConfig(_))));
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_teardown_waits_for_running_callback() {
    let auth = Arc::new(AuthContext::new(true));
    let (started_tx, started_rx) = std::sync::mpsc::channel();
    let finished = Arc::new(AtomicBool::new(false));
    let calls = Arc::new(AtomicUsize::new(0));

    let widget = {
        let finished = finished.clone();
        let calls = calls.clone();
        UploadWidget::mount(fast_config(), auth, Arc::new(Base64Encoder), move |_| {
            calls.fetch_add(1, Ordering::SeqCst);
            let _ = started_tx.send(());
            std::thread::sleep(Duration::from_millis(200));
            finished.store(true, Ordering::SeqCst);
        })
        .unwrap()
    };
    widget.handle_drop(vec![png_file("plan.png", 64)]).unwrap();

    let widget = Arc::new(widget);
    let finished_at_return = tokio::task::spawn_blocking({
        let widget = widget.clone();
        let finished = finished.clone();
        move || {
            started_rx
                .recv_timeout(Duration::from_secs(5))
                .expect("callback did not start");
            widget.teardown();
            finished.load(Ordering::SeqCst)
        }
    })
    .await
    .unwrap();

    assert!(
        finished_at_return,
        "teardown returned while the callback was still running"
    );
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_teardown_from_inside_callback_returns() {
    let auth = Arc::new(AuthContext::new(true));
    let slot: Arc<OnceLock<Weak<UploadWidget>>> = Arc::new(OnceLock::new());
    let (done_tx, mut done_rx) = mpsc::unbounded_channel();

    let widget = {
        let slot = slot.clone();
        UploadWidget::mount(
            fast_config(),
            auth,
            Arc::new(Base64Encoder),
            move |data_url: String| {
                if let Some(widget) = slot.get().and_then(Weak::upgrade) {
                    widget.teardown();
                }
                let _ = done_tx.send(data_url);
            },
        )
        .unwrap()
    };
    let widget = Arc::new(widget);
    assert!(slot.set(Arc::downgrade(&widget)).is_ok());

    widget.handle_drop(vec![png_file("plan.png", 64)]).unwrap();

    let data_url = timeout(Duration::from_secs(5), done_rx.recv())
        .await
        .expect("teardown inside the callback blocked")
        .unwrap();
    assert!(data_url.starts_with("data:image/png;base64,"));
    assert!(widget.is_torn_down());
}
