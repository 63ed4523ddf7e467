//! Command-line argument dispatch and server initialization.
//!
//! This module parses validated CLI arguments and maps them to the appropriate
//! action, such as starting the API server with its full configuration state.

use crate::cli::actions::{Action, server::Args};
use crate::cli::commands::auth;
use anyhow::{Context, Result};

/// Map validated CLI matches to a server action.
///
/// # Errors
/// Returns an error if required arguments are missing or inconsistent.
pub fn handler(matches: &clap::ArgMatches) -> Result<Action> {
    let port = matches.get_one::<u16>("port").copied().unwrap_or(8080);
    let dsn = matches
        .get_one::<String>("dsn")
        .cloned()
        .context("missing required argument: --dsn")?;

    let auth_opts = auth::Options::parse(matches)?;

    Ok(Action::Server(Args {
        port,
        dsn,
        base_url: auth_opts.base_url,
        from_email: auth_opts.from_email,
        login_token_ttl_seconds: auth_opts.login_token_ttl_seconds,
        resend_cooldown_seconds: auth_opts.resend_cooldown_seconds,
        session_ttl_seconds: auth_opts.session_ttl_seconds,
        issue_limit_per_minute: auth_opts.issue_limit_per_minute,
        validate_limit_per_minute: auth_opts.validate_limit_per_minute,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::actions::Action;

    #[test]
    fn dsn_required() {
        temp_env::with_vars([("SEZAMO_DSN", None::<&str>)], || {
            let command = crate::cli::commands::new();
            let result = command.try_get_matches_from(vec!["sezamo"]);
            assert!(result.is_err());
        });
    }

    #[test]
    fn server_action_from_matches() {
        temp_env::with_vars(
            [
                ("SEZAMO_DSN", Some("postgres://localhost:5432/sezamo")),
                ("SEZAMO_BASE_URL", Some("https://dashboard.example.com")),
                ("SEZAMO_SESSION_TTL_SECONDS", None::<&str>),
            ],
            || {
                let command = crate::cli::commands::new();
                let matches = command.get_matches_from(vec!["sezamo"]);
                let action = handler(&matches);
                assert!(action.is_ok());
                if let Ok(Action::Server(args)) = action {
                    assert_eq!(args.port, 8080);
                    assert_eq!(args.base_url, "https://dashboard.example.com");
                    assert_eq!(args.login_token_ttl_seconds, 600);
                    assert_eq!(args.resend_cooldown_seconds, 60);
                    assert_eq!(args.session_ttl_seconds, 129_600);
                }
            },
        );
    }
}
