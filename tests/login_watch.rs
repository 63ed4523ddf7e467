//! End-to-end exercise of the cross-context login flow: one task plays the
//! login form polling for completion, another plays the completion page
//! opened from the emailed link.

use std::sync::Arc;
use std::time::Duration;

use sezamo::notify::{
    CompletionFlag, LoginWatcher, POLL_TICK_LIMIT, RESEND_COOLDOWN_TICKS, SharedFlag, WatchOutcome,
    WatchState, watch,
};
use tokio::sync::mpsc;

#[tokio::test(start_paused = true)]
async fn completion_page_unblocks_waiting_form() {
    let flag = Arc::new(SharedFlag::new());
    let mut watcher = LoginWatcher::new();
    watcher.mark_issued();

    // The user opens the link in another tab ~90 seconds later; the
    // completion page sets the shared flag and closes.
    let completion_flag = Arc::clone(&flag);
    let completion_page = tokio::spawn(async move {
        tokio::time::sleep(Duration::from_secs(90)).await;
        completion_flag.set();
    });

    let (_cancel_tx, mut cancel_rx) = mpsc::unbounded_channel();
    let outcome = watch(watcher, flag.as_ref(), &mut cancel_rx).await;

    assert_eq!(outcome, WatchOutcome::Completed);
    assert!(completion_page.await.is_ok());
    // The flag was consumed by the winning context.
    assert!(!flag.take());
}

#[tokio::test(start_paused = true)]
async fn abandoned_form_times_out_after_ten_minutes() {
    let flag = SharedFlag::new();
    let mut watcher = LoginWatcher::new();
    watcher.mark_issued();

    let (_cancel_tx, mut cancel_rx) = mpsc::unbounded_channel();
    let started = tokio::time::Instant::now();
    let outcome = watch(watcher, &flag, &mut cancel_rx).await;

    assert_eq!(outcome, WatchOutcome::TimedOut);
    assert_eq!(
        started.elapsed(),
        Duration::from_secs(u64::from(POLL_TICK_LIMIT))
    );
}

#[tokio::test(start_paused = true)]
async fn closing_the_form_cancels_the_watch() {
    let flag = SharedFlag::new();
    let mut watcher = LoginWatcher::new();
    watcher.mark_issued();

    let (cancel_tx, mut cancel_rx) = mpsc::unbounded_channel();
    let closer = tokio::spawn(async move {
        tokio::time::sleep(Duration::from_secs(5)).await;
        cancel_tx.send(()).ok();
    });

    let outcome = watch(watcher, &flag, &mut cancel_rx).await;
    assert_eq!(outcome, WatchOutcome::Cancelled);
    assert!(closer.await.is_ok());
}

#[test]
fn resend_after_countdown_keeps_original_deadline() {
    let flag = SharedFlag::new();
    let mut watcher = LoginWatcher::new();
    watcher.mark_issued();

    // Wait out the first countdown, resend, then let the attempt run dry.
    let mut total_ticks = 0;
    while !watcher.can_resend() {
        watcher.tick(&flag);
        total_ticks += 1;
    }
    assert_eq!(total_ticks, RESEND_COOLDOWN_TICKS);
    assert!(watcher.resend());
    assert_eq!(watcher.state(), WatchState::Issued);

    while watcher.state() != WatchState::TimedOut {
        watcher.tick(&flag);
        total_ticks += 1;
    }
    assert_eq!(total_ticks, POLL_TICK_LIMIT);
}
