//! Rate limiting primitives for auth flows.
//!
//! The client-side resend countdown only guards a single well-behaved tab;
//! this limiter is the server-side throttle that covers hostile or duplicated
//! clients. It is in-process state, which matches the single-instance
//! deployment of the token store.

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::{Duration, Instant};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum RateLimitAction {
    IssueToken,
    ValidateToken,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RateLimitDecision {
    Allowed,
    Limited,
}

pub trait RateLimiter: Send + Sync {
    fn check_ip(&self, ip: Option<&str>, action: RateLimitAction) -> RateLimitDecision;
    fn check_email(&self, email: &str, action: RateLimitAction) -> RateLimitDecision;
}

#[derive(Clone, Debug)]
pub struct NoopRateLimiter;

impl RateLimiter for NoopRateLimiter {
    fn check_ip(&self, _ip: Option<&str>, _action: RateLimitAction) -> RateLimitDecision {
        RateLimitDecision::Allowed
    }

    fn check_email(&self, _email: &str, _action: RateLimitAction) -> RateLimitDecision {
        RateLimitDecision::Allowed
    }
}

struct Window {
    started: Instant,
    count: u32,
}

/// Fixed-window counter per key and action.
///
/// A zero limit for an action disables the check for that action.
pub struct WindowRateLimiter {
    window: Duration,
    issue_limit: u32,
    validate_limit: u32,
    windows: Mutex<HashMap<(String, RateLimitAction), Window>>,
}

impl WindowRateLimiter {
    #[must_use]
    pub fn new(window: Duration, issue_limit: u32, validate_limit: u32) -> Self {
        Self {
            window,
            issue_limit,
            validate_limit,
            windows: Mutex::new(HashMap::new()),
        }
    }

    /// One-minute windows, the default for the server CLI.
    #[must_use]
    pub fn per_minute(issue_limit: u32, validate_limit: u32) -> Self {
        Self::new(Duration::from_secs(60), issue_limit, validate_limit)
    }

    fn limit_for(&self, action: RateLimitAction) -> u32 {
        match action {
            RateLimitAction::IssueToken => self.issue_limit,
            RateLimitAction::ValidateToken => self.validate_limit,
        }
    }

    fn check(&self, key: String, action: RateLimitAction) -> RateLimitDecision {
        let limit = self.limit_for(action);
        if limit == 0 {
            return RateLimitDecision::Allowed;
        }

        let now = Instant::now();
        let Ok(mut windows) = self.windows.lock() else {
            // A poisoned lock means a panic elsewhere; fail closed.
            return RateLimitDecision::Limited;
        };

        // Drop stale windows so the map does not grow with abandoned keys.
        windows.retain(|_, window| now.duration_since(window.started) < self.window);

        let window = windows.entry((key, action)).or_insert(Window {
            started: now,
            count: 0,
        });
        if window.count >= limit {
            return RateLimitDecision::Limited;
        }
        window.count += 1;
        RateLimitDecision::Allowed
    }
}

impl RateLimiter for WindowRateLimiter {
    fn check_ip(&self, ip: Option<&str>, action: RateLimitAction) -> RateLimitDecision {
        // Requests without a resolvable client IP share one bucket.
        let key = format!("ip:{}", ip.unwrap_or("unknown"));
        self.check(key, action)
    }

    fn check_email(&self, email: &str, action: RateLimitAction) -> RateLimitDecision {
        self.check(format!("email:{email}"), action)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn noop_rate_limiter_allows() {
        let limiter = NoopRateLimiter;
        assert_eq!(
            limiter.check_ip(None, RateLimitAction::IssueToken),
            RateLimitDecision::Allowed
        );
        assert_eq!(
            limiter.check_email("user@example.com", RateLimitAction::ValidateToken),
            RateLimitDecision::Allowed
        );
    }

    #[test]
    fn window_limiter_limits_after_threshold() {
        let limiter = WindowRateLimiter::per_minute(2, 2);
        let ip = Some("1.2.3.4");
        assert_eq!(
            limiter.check_ip(ip, RateLimitAction::IssueToken),
            RateLimitDecision::Allowed
        );
        assert_eq!(
            limiter.check_ip(ip, RateLimitAction::IssueToken),
            RateLimitDecision::Allowed
        );
        assert_eq!(
            limiter.check_ip(ip, RateLimitAction::IssueToken),
            RateLimitDecision::Limited
        );
    }

    #[test]
    fn window_limiter_tracks_actions_separately() {
        let limiter = WindowRateLimiter::per_minute(1, 1);
        let ip = Some("1.2.3.4");
        assert_eq!(
            limiter.check_ip(ip, RateLimitAction::IssueToken),
            RateLimitDecision::Allowed
        );
        assert_eq!(
            limiter.check_ip(ip, RateLimitAction::ValidateToken),
            RateLimitDecision::Allowed
        );
        assert_eq!(
            limiter.check_ip(ip, RateLimitAction::IssueToken),
            RateLimitDecision::Limited
        );
    }

    #[test]
    fn window_limiter_tracks_keys_separately() {
        let limiter = WindowRateLimiter::per_minute(1, 1);
        assert_eq!(
            limiter.check_email("a@example.com", RateLimitAction::IssueToken),
            RateLimitDecision::Allowed
        );
        assert_eq!(
            limiter.check_email("b@example.com", RateLimitAction::IssueToken),
            RateLimitDecision::Allowed
        );
        assert_eq!(
            limiter.check_email("a@example.com", RateLimitAction::IssueToken),
            RateLimitDecision::Limited
        );
    }

    #[test]
    fn zero_limit_disables_action() {
        let limiter = WindowRateLimiter::per_minute(0, 1);
        for _ in 0..10 {
            assert_eq!(
                limiter.check_ip(Some("1.2.3.4"), RateLimitAction::IssueToken),
                RateLimitDecision::Allowed
            );
        }
    }

    #[test]
    fn windows_expire() {
        let limiter = WindowRateLimiter::new(Duration::from_millis(10), 1, 1);
        assert_eq!(
            limiter.check_ip(Some("1.2.3.4"), RateLimitAction::IssueToken),
            RateLimitDecision::Allowed
        );
        std::thread::sleep(Duration::from_millis(20));
        assert_eq!(
            limiter.check_ip(Some("1.2.3.4"), RateLimitAction::IssueToken),
            RateLimitDecision::Allowed
        );
    }
}
