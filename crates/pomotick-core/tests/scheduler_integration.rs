//! Integration tests for the tokio scheduler driving a session.
//!
//! Time is paused, so these run instantly while exercising the real
//! channel-based delivery path used by the CLI.

use std::time::Duration;

use pomotick_core::{MemoryStore, Mode, Session, SilentNotifier, TokioScheduler};
use tokio::time::Instant;

#[tokio::test(start_paused = true)]
async fn test_session_counts_down_on_tokio_ticks() {
    let (scheduler, mut wakeups) = TokioScheduler::new();
    let mut session = Session::new(scheduler, SilentNotifier, MemoryStore::new());
    session.start();

    for _ in 0..5 {
        let wakeup = wakeups.recv().await.unwrap();
        session.handle_wakeup(wakeup);
    }
    assert_eq!(session.engine().remaining_secs(), 25 * 60 - 5);
}

#[tokio::test(start_paused = true)]
async fn test_queued_tick_is_dropped_after_pause() {
    let (scheduler, mut wakeups) = TokioScheduler::new();
    let mut session = Session::new(scheduler, SilentNotifier, MemoryStore::new());
    session.start();

    tokio::time::sleep(Duration::from_millis(1500)).await;
    session.pause();

    // The tick fired at 1s is still queued; it must not move the timer.
    while let Ok(wakeup) = wakeups.try_recv() {
        session.handle_wakeup(wakeup);
    }
    assert_eq!(session.engine().remaining_secs(), 25 * 60);
}

#[tokio::test(start_paused = true)]
async fn test_auto_start_fires_through_channel() {
    let (scheduler, mut wakeups) = TokioScheduler::new();
    let store = MemoryStore::new();
    let mut session = Session::new(scheduler, SilentNotifier, store)
        .with_auto_start_delay(Duration::from_millis(250));
    session.save_settings(&pomotick_core::SettingsCandidate::from_value(
        &serde_json::json!({"autoStart": true}),
    ));

    let start = Instant::now();
    session.skip();
    let wakeup = wakeups.recv().await.unwrap();
    session.handle_wakeup(wakeup);
    assert_eq!(start.elapsed(), Duration::from_millis(250));
    assert_eq!(session.engine().mode(), Mode::ShortBreak);
    assert!(session.engine().is_running());
}
