//! # Sezamo (Passwordless Magic-Link Authentication)
//!
//! `sezamo` is the authentication authority for the dashboard: it issues
//! single-use, time-limited login tokens ("magic links"), delivers them by
//! email, validates each token exactly once, and manages browser sessions.
//!
//! ## Single-Use Tokens
//!
//! Each account holds at most one outstanding login token. Issuing a new token
//! **overwrites** the previous row, so only the newest link is ever valid.
//! Validation consumes the token in a single conditional update: concurrent
//! clicks on the same link produce exactly one winner.
//!
//! - **Hashed at rest:** Only SHA-256 hashes of login and session tokens are
//!   stored; raw values exist in the emailed link and the session cookie.
//! - **Approval gate:** Accounts must be approved at issuance time *and* again
//!   at validation time. De-approving an account kills links already in flight.
//!
//! ## Sessions
//!
//! Sessions have an absolute 36-hour lifetime from creation with no sliding
//! renewal. Logout is idempotent and always clears the cookie.
//!
//! ## Cross-Tab Completion
//!
//! The tab that requested the link and the tab that followed it are separate
//! execution contexts with no server push channel between them. The
//! [`notify`] module implements the polling bridge: a shared client-local
//! flag set by the validating context and a once-per-second watcher that the
//! requesting context runs until completion or a ten-minute timeout.

pub mod api;
pub mod cli;
pub mod notify;

#[allow(clippy::doc_markdown, clippy::needless_raw_string_hashes)]
pub mod built_info {
    include!(concat!(env!("OUT_DIR"), "/built.rs"));
}

pub const GIT_COMMIT_HASH: &str = match built_info::GIT_COMMIT_HASH {
    Some(hash) => hash,
    None => "unknown",
};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_git_commit_hash_format() {
        if GIT_COMMIT_HASH == "unknown" {
            // Acceptable in non-git build environments
            return;
        }
        assert!(
            GIT_COMMIT_HASH.chars().all(|c| c.is_ascii_hexdigit()),
            "GIT_COMMIT_HASH should be a hex string, got: {GIT_COMMIT_HASH}"
        );
        assert!(
            GIT_COMMIT_HASH.len() >= 7,
            "GIT_COMMIT_HASH should be at least 7 characters long, got: {GIT_COMMIT_HASH}"
        );
    }
}
