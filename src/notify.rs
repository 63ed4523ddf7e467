//! Cross-context login completion.
//!
//! The login link is normally opened in a different tab (or window) than the
//! one showing the login form. The completion page sets a flag shared between
//! the contexts; the originating context polls that flag once per second and
//! treats it as its own login signal, so the user never has to return to the
//! first tab and interact with it again.
//!
//! [`LoginWatcher`] is the deterministic core of that poll loop: a tick-driven
//! state machine that also runs the resend countdown, which ticks on the same
//! cadence but is otherwise independent of the completion timeout. [`watch`]
//! drives it on a real clock.

use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use tokio::sync::mpsc;

/// Poll cadence for the completion flag.
pub const POLL_INTERVAL: Duration = Duration::from_secs(1);

/// Ticks before an unanswered login attempt times out (10 minutes).
pub const POLL_TICK_LIMIT: u32 = 600;

/// Ticks before the resend action unlocks again.
pub const RESEND_COOLDOWN_TICKS: u32 = 60;

/// Flag shared between the originating context and the completion page.
///
/// `take` must be consuming: when several contexts poll the same flag, only
/// one of them observes the completion.
pub trait CompletionFlag: Send + Sync {
    fn set(&self);
    fn take(&self) -> bool;
}

/// In-process [`CompletionFlag`] backed by an atomic.
#[derive(Debug, Default)]
pub struct SharedFlag(AtomicBool);

impl SharedFlag {
    #[must_use]
    pub fn new() -> Self {
        Self(AtomicBool::new(false))
    }
}

impl CompletionFlag for SharedFlag {
    fn set(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    fn take(&self) -> bool {
        self.0.swap(false, Ordering::SeqCst)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum WatchState {
    /// No login link has been requested yet.
    Idle,
    /// A link was issued; the resend countdown is running.
    Issued,
    /// The countdown elapsed; resend is available while polling continues.
    WaitingForCompletion,
    /// The completion flag was observed. Terminal.
    Completed,
    /// The tick limit elapsed without completion. Terminal.
    TimedOut,
}

/// Tick-driven poll loop state.
#[derive(Debug)]
pub struct LoginWatcher {
    state: WatchState,
    ticks: u32,
    resend_remaining: u32,
}

impl Default for LoginWatcher {
    fn default() -> Self {
        Self::new()
    }
}

impl LoginWatcher {
    #[must_use]
    pub fn new() -> Self {
        Self {
            state: WatchState::Idle,
            ticks: 0,
            resend_remaining: 0,
        }
    }

    #[must_use]
    pub fn state(&self) -> WatchState {
        self.state
    }

    /// Seconds left before resend unlocks. Zero means resend is available
    /// (once a link has been issued).
    #[must_use]
    pub fn resend_remaining(&self) -> u32 {
        self.resend_remaining
    }

    /// Record a successful link issuance: start polling and the countdown.
    pub fn mark_issued(&mut self) {
        self.state = WatchState::Issued;
        self.ticks = 0;
        self.resend_remaining = RESEND_COOLDOWN_TICKS;
    }

    #[must_use]
    pub fn can_resend(&self) -> bool {
        matches!(
            self.state,
            WatchState::Issued | WatchState::WaitingForCompletion
        ) && self.resend_remaining == 0
    }

    /// Record a resend. Restarts the countdown but NOT the completion
    /// timeout; the attempt as a whole still expires on the original clock.
    pub fn resend(&mut self) -> bool {
        if !self.can_resend() {
            return false;
        }
        self.state = WatchState::Issued;
        self.resend_remaining = RESEND_COOLDOWN_TICKS;
        true
    }

    /// Advance one poll interval. Checks the flag first so a completion that
    /// lands on the final tick still wins over the timeout.
    pub fn tick(&mut self, flag: &dyn CompletionFlag) -> WatchState {
        match self.state {
            WatchState::Idle | WatchState::Completed | WatchState::TimedOut => return self.state,
            WatchState::Issued | WatchState::WaitingForCompletion => {}
        }

        if flag.take() {
            self.state = WatchState::Completed;
            self.resend_remaining = 0;
            return self.state;
        }

        self.ticks += 1;
        if self.resend_remaining > 0 {
            self.resend_remaining -= 1;
            if self.resend_remaining == 0 {
                self.state = WatchState::WaitingForCompletion;
            }
        }

        if self.ticks >= POLL_TICK_LIMIT {
            self.state = WatchState::TimedOut;
        }
        self.state
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum WatchOutcome {
    Completed,
    TimedOut,
    Cancelled,
}

/// Drive a [`LoginWatcher`] on a real clock until it terminates or the
/// caller cancels (e.g. the user navigates away).
pub async fn watch(
    mut watcher: LoginWatcher,
    flag: &dyn CompletionFlag,
    cancel: &mut mpsc::UnboundedReceiver<()>,
) -> WatchOutcome {
    let mut interval = tokio::time::interval(POLL_INTERVAL);
    // The first tick of a tokio interval fires immediately; consume it so
    // every subsequent tick marks one elapsed interval.
    interval.tick().await;

    loop {
        tokio::select! {
            _ = interval.tick() => match watcher.tick(flag) {
                WatchState::Completed => return WatchOutcome::Completed,
                WatchState::TimedOut => return WatchOutcome::TimedOut,
                _ => {}
            },
            _ = cancel.recv() => return WatchOutcome::Cancelled,
        }
    }
}
