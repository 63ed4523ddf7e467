use anyhow::{Context, Result};
use clap::{Arg, Command};

/// Parsed auth-related CLI options.
#[derive(Debug)]
pub struct Options {
    pub base_url: String,
    pub from_email: String,
    pub login_token_ttl_seconds: i64,
    pub resend_cooldown_seconds: i64,
    pub session_ttl_seconds: i64,
    pub issue_limit_per_minute: u32,
    pub validate_limit_per_minute: u32,
}

impl Options {
    /// Extract auth options from parsed matches.
    ///
    /// # Errors
    /// Returns an error if a defaulted argument is missing (clap misconfiguration).
    pub fn parse(matches: &clap::ArgMatches) -> Result<Self> {
        Ok(Self {
            base_url: matches
                .get_one::<String>("base-url")
                .cloned()
                .context("missing required argument: --base-url")?,
            from_email: matches
                .get_one::<String>("from-email")
                .cloned()
                .context("missing required argument: --from-email")?,
            login_token_ttl_seconds: matches
                .get_one::<i64>("login-token-ttl-seconds")
                .copied()
                .context("missing required argument: --login-token-ttl-seconds")?,
            resend_cooldown_seconds: matches
                .get_one::<i64>("resend-cooldown-seconds")
                .copied()
                .context("missing required argument: --resend-cooldown-seconds")?,
            session_ttl_seconds: matches
                .get_one::<i64>("session-ttl-seconds")
                .copied()
                .context("missing required argument: --session-ttl-seconds")?,
            issue_limit_per_minute: matches
                .get_one::<u32>("issue-limit-per-minute")
                .copied()
                .context("missing required argument: --issue-limit-per-minute")?,
            validate_limit_per_minute: matches
                .get_one::<u32>("validate-limit-per-minute")
                .copied()
                .context("missing required argument: --validate-limit-per-minute")?,
        })
    }
}

pub fn with_args(command: Command) -> Command {
    let command = with_link_args(command);
    with_rate_limit_args(command)
}

fn with_link_args(command: Command) -> Command {
    command
        .arg(
            Arg::new("base-url")
                .long("base-url")
                .help("Public base URL used to build magic-login links")
                .env("SEZAMO_BASE_URL")
                .default_value("http://localhost:8080"),
        )
        .arg(
            Arg::new("from-email")
                .long("from-email")
                .help("Sender address for login emails")
                .env("SEZAMO_FROM_EMAIL")
                .default_value("login@sezamo.dev"),
        )
        .arg(
            Arg::new("login-token-ttl-seconds")
                .long("login-token-ttl-seconds")
                .help("Magic-link token TTL in seconds")
                .env("SEZAMO_LOGIN_TOKEN_TTL_SECONDS")
                .default_value("600")
                .value_parser(clap::value_parser!(i64)),
        )
        .arg(
            Arg::new("resend-cooldown-seconds")
                .long("resend-cooldown-seconds")
                .help("Cooldown advertised to clients before a resend is permitted")
                .env("SEZAMO_RESEND_COOLDOWN_SECONDS")
                .default_value("60")
                .value_parser(clap::value_parser!(i64)),
        )
        .arg(
            Arg::new("session-ttl-seconds")
                .long("session-ttl-seconds")
                .help("Absolute session lifetime in seconds")
                .env("SEZAMO_SESSION_TTL_SECONDS")
                .default_value("129600")
                .value_parser(clap::value_parser!(i64)),
        )
}

fn with_rate_limit_args(command: Command) -> Command {
    command
        .arg(
            Arg::new("issue-limit-per-minute")
                .long("issue-limit-per-minute")
                .help("Max magic-link issuance requests per client/minute (0 disables)")
                .env("SEZAMO_ISSUE_LIMIT_PER_MINUTE")
                .default_value("5")
                .value_parser(clap::value_parser!(u32)),
        )
        .arg(
            Arg::new("validate-limit-per-minute")
                .long("validate-limit-per-minute")
                .help("Max magic-link validation attempts per client/minute (0 disables)")
                .env("SEZAMO_VALIDATE_LIMIT_PER_MINUTE")
                .default_value("10")
                .value_parser(clap::value_parser!(u32)),
        )
}
