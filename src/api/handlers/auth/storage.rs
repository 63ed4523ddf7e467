//! Database helpers for login tokens, accounts, and sessions.
//!
//! The `login_tokens` table is the single shared mutable resource of the
//! subsystem. Its unique key on `email` serializes concurrent issuances
//! (later write wins), and `consume_login_token` folds the expiry check and
//! the invalidation into one conditional UPDATE so that concurrent
//! validations of the same token have at most one winner.

use anyhow::{Context, Result, anyhow};
use sqlx::{PgPool, Row};
use tracing::Instrument;

use super::utils::{generate_session_token, hash_session_token, is_unique_violation};

/// Account row from the external user directory. Read-only here.
#[derive(Debug)]
pub(super) struct AccountRecord {
    pub(super) id: i64,
    pub(super) name: String,
    pub(super) email: String,
    pub(super) is_admin: bool,
    pub(super) is_approved: bool,
}

/// Result of the atomic consume step.
#[derive(Debug)]
pub(super) enum ConsumeOutcome {
    /// The token was valid and is now spent; holds the owning email.
    Consumed(String),
    /// No row carries this token hash.
    NotFound,
    /// The row exists but its expiry is at or before now (spent or stale).
    Expired,
}

/// Minimal data returned for a valid session cookie.
pub(crate) struct SessionRecord {
    pub(crate) account_id: i64,
    pub(crate) name: String,
    pub(crate) email: String,
    pub(crate) is_admin: bool,
}

/// Look up an account by normalized email (case-insensitive compare).
pub(super) async fn lookup_account_by_email(
    pool: &PgPool,
    email_normalized: &str,
) -> Result<Option<AccountRecord>> {
    let query = r"
        SELECT id, name, email, is_admin, is_approved
        FROM accounts
        WHERE lower(email) = $1
        LIMIT 1
    ";
    let span = tracing::info_span!(
        "db.query",
        db.system = "postgresql",
        db.operation = "SELECT",
        db.statement = query
    );
    let row = sqlx::query(query)
        .bind(email_normalized)
        .fetch_optional(pool)
        .instrument(span)
        .await
        .context("failed to lookup account by email")?;

    Ok(row.map(|row| AccountRecord {
        id: row.get("id"),
        name: row.get("name"),
        email: row.get("email"),
        is_admin: row.get("is_admin"),
        is_approved: row.get("is_approved"),
    }))
}

/// Write the single outstanding token row for an email.
///
/// The upsert replaces any prior token and expiry, which implicitly
/// invalidates a previously issued link: only the newest token is ever valid.
pub(super) async fn upsert_login_token(
    pool: &PgPool,
    email_normalized: &str,
    token_hash: &[u8],
    ttl_seconds: i64,
) -> Result<()> {
    let query = r"
        INSERT INTO login_tokens (email, token_hash, expires_at)
        VALUES ($1, $2, NOW() + ($3 * INTERVAL '1 second'))
        ON CONFLICT (email) DO UPDATE
        SET token_hash = EXCLUDED.token_hash,
            expires_at = EXCLUDED.expires_at,
            created_at = NOW()
    ";
    let span = tracing::info_span!(
        "db.query",
        db.system = "postgresql",
        db.operation = "INSERT",
        db.statement = query
    );
    sqlx::query(query)
        .bind(email_normalized)
        .bind(token_hash)
        .bind(ttl_seconds)
        .execute(pool)
        .instrument(span)
        .await
        .context("failed to upsert login token")?;
    Ok(())
}

/// Atomically consume a login token.
///
/// The expiry check and the invalidation are one conditional UPDATE: the row
/// is forced into the past in the same statement that confirmed it was still
/// valid. Under N concurrent attempts exactly one sees `Consumed`; the rest
/// match zero rows and report `Expired` or `NotFound`. The new expiry sits a
/// full second in the past because a blocked concurrent UPDATE re-evaluates
/// the WHERE clause with its own `NOW()`, which may trail the winner's by
/// microseconds; a bare `NOW()` would leave that loser a window to also pass
/// the `>` check.
pub(super) async fn consume_login_token(
    pool: &PgPool,
    token_hash: &[u8],
) -> Result<ConsumeOutcome> {
    let query = r"
        UPDATE login_tokens
        SET expires_at = NOW() - INTERVAL '1 second'
        WHERE token_hash = $1
          AND expires_at > NOW()
        RETURNING email
    ";
    let span = tracing::info_span!(
        "db.query",
        db.system = "postgresql",
        db.operation = "UPDATE",
        db.statement = query
    );
    let row = sqlx::query(query)
        .bind(token_hash)
        .fetch_optional(pool)
        .instrument(span)
        .await
        .context("failed to consume login token")?;

    if let Some(row) = row {
        return Ok(ConsumeOutcome::Consumed(row.get("email")));
    }

    // Losing a race and presenting an unknown token render the same generic
    // message to the user; the distinction only matters for logs.
    let query = "SELECT 1 FROM login_tokens WHERE token_hash = $1 LIMIT 1";
    let span = tracing::info_span!(
        "db.query",
        db.system = "postgresql",
        db.operation = "SELECT",
        db.statement = query
    );
    let row = sqlx::query(query)
        .bind(token_hash)
        .fetch_optional(pool)
        .instrument(span)
        .await
        .context("failed to check spent login token")?;

    if row.is_some() {
        Ok(ConsumeOutcome::Expired)
    } else {
        Ok(ConsumeOutcome::NotFound)
    }
}

/// Create a session row and return the raw token for the cookie.
///
/// Only the hash is persisted. Expiry is absolute: creation time plus TTL,
/// never extended afterwards.
pub(super) async fn insert_session(
    pool: &PgPool,
    account_id: i64,
    ttl_seconds: i64,
) -> Result<String> {
    let query = r"
        INSERT INTO sessions (session_hash, account_id, expires_at)
        VALUES ($1, $2, NOW() + ($3 * INTERVAL '1 second'))
    ";
    let span = tracing::info_span!(
        "db.query",
        db.system = "postgresql",
        db.operation = "INSERT",
        db.statement = query
    );

    // Token collisions are practically impossible but cheap to retry.
    for _ in 0..3 {
        let token = generate_session_token()?;
        let token_hash = hash_session_token(&token);
        let result = sqlx::query(query)
            .bind(&token_hash)
            .bind(account_id)
            .bind(ttl_seconds)
            .execute(pool)
            .instrument(span.clone())
            .await;

        match result {
            Ok(_) => return Ok(token),
            Err(err) if is_unique_violation(&err) => {}
            Err(err) => return Err(err).context("failed to insert session"),
        }
    }

    Err(anyhow!("failed to generate unique session token"))
}

/// Resolve a session hash into the authenticated account, if still valid.
pub(super) async fn lookup_session(
    pool: &PgPool,
    token_hash: &[u8],
) -> Result<Option<SessionRecord>> {
    // Only accept unexpired sessions bound to still-approved accounts.
    let query = r"
        SELECT accounts.id, accounts.name, accounts.email, accounts.is_admin
        FROM sessions
        JOIN accounts ON accounts.id = sessions.account_id
        WHERE sessions.session_hash = $1
          AND sessions.expires_at > NOW()
          AND accounts.is_approved
        LIMIT 1
    ";
    let span = tracing::info_span!(
        "db.query",
        db.system = "postgresql",
        db.operation = "SELECT",
        db.statement = query
    );
    let row = sqlx::query(query)
        .bind(token_hash)
        .fetch_optional(pool)
        .instrument(span)
        .await
        .context("failed to lookup session")?;

    if row.is_none() {
        return Ok(None);
    }

    // Record activity for audit/visibility without extending the session TTL.
    let query = r"
        UPDATE sessions
        SET last_seen_at = NOW()
        WHERE session_hash = $1
    ";
    let span = tracing::info_span!(
        "db.query",
        db.system = "postgresql",
        db.operation = "UPDATE",
        db.statement = query
    );
    sqlx::query(query)
        .bind(token_hash)
        .execute(pool)
        .instrument(span)
        .await
        .context("failed to update session last_seen_at")?;

    Ok(row.map(|row| SessionRecord {
        account_id: row.get("id"),
        name: row.get("name"),
        email: row.get("email"),
        is_admin: row.get("is_admin"),
    }))
}

/// Delete a session row. Logout is idempotent; zero deleted rows is fine.
pub(super) async fn delete_session(pool: &PgPool, token_hash: &[u8]) -> Result<()> {
    let query = "DELETE FROM sessions WHERE session_hash = $1";
    let span = tracing::info_span!(
        "db.query",
        db.system = "postgresql",
        db.operation = "DELETE",
        db.statement = query
    );
    sqlx::query(query)
        .bind(token_hash)
        .execute(pool)
        .instrument(span)
        .await
        .context("failed to delete session")?;
    Ok(())
}
