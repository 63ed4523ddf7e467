use crate::api::{
    self,
    email::{EmailSender, LogEmailSender},
    handlers::auth::{AuthConfig, NoopRateLimiter, RateLimiter, WindowRateLimiter},
};
use anyhow::Result;
use std::sync::Arc;

#[derive(Debug)]
pub struct Args {
    pub port: u16,
    pub dsn: String,
    pub base_url: String,
    pub from_email: String,
    pub login_token_ttl_seconds: i64,
    pub resend_cooldown_seconds: i64,
    pub session_ttl_seconds: i64,
    pub issue_limit_per_minute: u32,
    pub validate_limit_per_minute: u32,
}

/// Execute the server action.
/// # Errors
/// Returns an error if the base URL is invalid or the server fails to start.
pub async fn execute(args: Args) -> Result<()> {
    let auth_config = AuthConfig::new(args.base_url)
        .with_from_email(args.from_email)
        .with_login_token_ttl_seconds(args.login_token_ttl_seconds)
        .with_resend_cooldown_seconds(args.resend_cooldown_seconds)
        .with_session_ttl_seconds(args.session_ttl_seconds);

    // A zero limit disables the in-process throttle entirely.
    let rate_limiter: Arc<dyn RateLimiter> =
        if args.issue_limit_per_minute == 0 && args.validate_limit_per_minute == 0 {
            Arc::new(NoopRateLimiter)
        } else {
            Arc::new(WindowRateLimiter::per_minute(
                args.issue_limit_per_minute,
                args.validate_limit_per_minute,
            ))
        };

    // Delivery transport is a deployment concern; the default logs the message.
    let email_sender: Arc<dyn EmailSender> = Arc::new(LogEmailSender);

    api::new(args.port, args.dsn, auth_config, rate_limiter, email_sender).await
}
