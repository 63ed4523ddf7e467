//! Auth state and configuration.

use std::sync::Arc;

use super::rate_limit::RateLimiter;

const DEFAULT_LOGIN_TOKEN_TTL_SECONDS: i64 = 10 * 60;
const DEFAULT_RESEND_COOLDOWN_SECONDS: i64 = 60;
const DEFAULT_SESSION_TTL_SECONDS: i64 = 36 * 60 * 60;
const DEFAULT_FROM_EMAIL: &str = "login@sezamo.dev";

#[derive(Clone, Debug)]
pub struct AuthConfig {
    base_url: String,
    from_email: String,
    login_token_ttl_seconds: i64,
    resend_cooldown_seconds: i64,
    session_ttl_seconds: i64,
}

impl AuthConfig {
    #[must_use]
    pub fn new(base_url: String) -> Self {
        Self {
            base_url,
            from_email: DEFAULT_FROM_EMAIL.to_string(),
            login_token_ttl_seconds: DEFAULT_LOGIN_TOKEN_TTL_SECONDS,
            resend_cooldown_seconds: DEFAULT_RESEND_COOLDOWN_SECONDS,
            session_ttl_seconds: DEFAULT_SESSION_TTL_SECONDS,
        }
    }

    #[must_use]
    pub fn with_from_email(mut self, from_email: String) -> Self {
        self.from_email = from_email;
        self
    }

    #[must_use]
    pub fn with_login_token_ttl_seconds(mut self, seconds: i64) -> Self {
        self.login_token_ttl_seconds = seconds;
        self
    }

    #[must_use]
    pub fn with_resend_cooldown_seconds(mut self, seconds: i64) -> Self {
        self.resend_cooldown_seconds = seconds;
        self
    }

    #[must_use]
    pub fn with_session_ttl_seconds(mut self, seconds: i64) -> Self {
        self.session_ttl_seconds = seconds;
        self
    }

    pub(crate) fn base_url(&self) -> &str {
        &self.base_url
    }

    pub(super) fn from_email(&self) -> &str {
        &self.from_email
    }

    pub(super) fn login_token_ttl_seconds(&self) -> i64 {
        self.login_token_ttl_seconds
    }

    pub(super) fn resend_cooldown_seconds(&self) -> i64 {
        self.resend_cooldown_seconds
    }

    pub(super) fn session_ttl_seconds(&self) -> i64 {
        self.session_ttl_seconds
    }

    pub(super) fn session_cookie_secure(&self) -> bool {
        self.base_url.starts_with("https://")
    }
}

pub struct AuthState {
    config: AuthConfig,
    rate_limiter: Arc<dyn RateLimiter>,
}

impl AuthState {
    #[must_use]
    pub fn new(config: AuthConfig, rate_limiter: Arc<dyn RateLimiter>) -> Self {
        Self {
            config,
            rate_limiter,
        }
    }

    #[must_use]
    pub fn config(&self) -> &AuthConfig {
        &self.config
    }

    pub(super) fn rate_limiter(&self) -> &dyn RateLimiter {
        self.rate_limiter.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::super::rate_limit::NoopRateLimiter;
    use super::{AuthConfig, AuthState};
    use std::sync::Arc;

    #[test]
    fn auth_config_defaults_and_overrides() {
        let config = AuthConfig::new("https://dashboard.example.com".to_string());

        assert_eq!(config.base_url(), "https://dashboard.example.com");
        assert_eq!(
            config.login_token_ttl_seconds(),
            super::DEFAULT_LOGIN_TOKEN_TTL_SECONDS
        );
        assert_eq!(
            config.resend_cooldown_seconds(),
            super::DEFAULT_RESEND_COOLDOWN_SECONDS
        );
        assert_eq!(
            config.session_ttl_seconds(),
            super::DEFAULT_SESSION_TTL_SECONDS
        );
        assert!(config.session_cookie_secure());

        let config = config
            .with_from_email("noreply@example.com".to_string())
            .with_login_token_ttl_seconds(120)
            .with_resend_cooldown_seconds(30)
            .with_session_ttl_seconds(3600);

        assert_eq!(config.from_email(), "noreply@example.com");
        assert_eq!(config.login_token_ttl_seconds(), 120);
        assert_eq!(config.resend_cooldown_seconds(), 30);
        assert_eq!(config.session_ttl_seconds(), 3600);
    }

    #[test]
    fn cookie_not_secure_over_http() {
        let config = AuthConfig::new("http://localhost:8080".to_string());
        assert!(!config.session_cookie_secure());
    }

    #[test]
    fn auth_state_exposes_config() {
        let config = AuthConfig::new("https://dashboard.example.com".to_string());
        let state = AuthState::new(config, Arc::new(NoopRateLimiter));
        assert_eq!(state.config().base_url(), "https://dashboard.example.com");
    }
}
