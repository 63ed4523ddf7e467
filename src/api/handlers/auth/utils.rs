//! Email normalization and token helpers.
//!
//! Login and session tokens are 32 bytes of OS randomness, URL-safe base64
//! encoded. Raw values travel in the emailed link or the cookie; the database
//! only ever sees their SHA-256.

use anyhow::{Context, Result};
use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use rand::{RngCore, rngs::OsRng};
use regex::Regex;
use sha2::{Digest, Sha256};
use std::sync::OnceLock;

static EMAIL_RE: OnceLock<Option<Regex>> = OnceLock::new();

/// Normalize an email for lookup/uniqueness checks.
pub(super) fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// Basic shape check on already-normalized input. Deliverability is proven by
/// the link actually arriving, so this only rejects obvious garbage.
pub(super) fn valid_email(email_normalized: &str) -> bool {
    EMAIL_RE
        .get_or_init(|| Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").ok())
        .as_ref()
        .is_some_and(|regex| regex.is_match(email_normalized))
}

fn random_token() -> Result<String> {
    let mut bytes = [0u8; 32];
    OsRng
        .try_fill_bytes(&mut bytes)
        .context("failed to read OS randomness")?;
    Ok(URL_SAFE_NO_PAD.encode(bytes))
}

fn sha256(token: &str) -> Vec<u8> {
    Sha256::digest(token.as_bytes()).to_vec()
}

/// Mint the single-use token embedded in the magic link.
pub(super) fn generate_login_token() -> Result<String> {
    random_token()
}

/// Mint the session token carried by the auth cookie.
pub(crate) fn generate_session_token() -> Result<String> {
    random_token()
}

pub(super) fn hash_login_token(token: &str) -> Vec<u8> {
    sha256(token)
}

pub(crate) fn hash_session_token(token: &str) -> Vec<u8> {
    sha256(token)
}

/// The link target sent in login emails.
pub(super) fn build_login_url(base_url: &str, token: &str) -> String {
    let base = base_url.trim_end_matches('/');
    format!("{base}/magic_login?token={token}")
}

/// Destination after a successful validation: the page that sets the shared
/// completion flag for the originating tab and then closes itself.
pub(super) fn build_complete_url(base_url: &str) -> String {
    let base = base_url.trim_end_matches('/');
    format!("{base}/login/complete")
}

/// SQLSTATE 23505, unique constraint violation.
pub(super) fn is_unique_violation(err: &sqlx::Error) -> bool {
    match err {
        sqlx::Error::Database(db_err) => db_err.code().is_some_and(|code| code.as_ref() == "23505"),
        _ => false,
    }
}

/// Client IP for rate limiting, from the usual reverse-proxy headers.
pub(super) fn extract_client_ip(headers: &axum::http::HeaderMap) -> Option<String> {
    let forwarded = headers
        .get("x-forwarded-for")
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.split(',').next())
        .map(str::trim)
        .filter(|value| !value.is_empty());
    if forwarded.is_some() {
        return forwarded.map(str::to_string);
    }
    headers
        .get("x-real-ip")
        .and_then(|value| value.to_str().ok())
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(str::to_string)
}
