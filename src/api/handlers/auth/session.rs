//! Session inspection and logout endpoints, plus cookie helpers.

use axum::{
    Extension, Json,
    http::{HeaderMap, HeaderValue, StatusCode, header},
    response::IntoResponse,
};
use sqlx::PgPool;
use std::sync::Arc;
use tracing::instrument;

use super::state::{AuthConfig, AuthState};
use super::storage::{SessionRecord, delete_session, lookup_session};
use super::types::SessionResponse;
use super::utils::hash_session_token;

pub(crate) const SESSION_COOKIE_NAME: &str = "sezamo_session";

/// Return the authenticated account for the presented session cookie.
///
/// 204 (not 401) for anonymous callers: the login page polls this endpoint
/// and an empty success keeps browser consoles free of error noise.
#[utoipa::path(
    get,
    path = "/v1/auth/session",
    responses (
        (status = 200, description = "Active session", body = SessionResponse),
        (status = 204, description = "No active session"),
    ),
    tag = "auth"
)]
#[instrument(skip_all)]
pub async fn session(headers: HeaderMap, Extension(pool): Extension<PgPool>) -> impl IntoResponse {
    match authenticate_session(&headers, &pool).await {
        Ok(Some(record)) => Json(SessionResponse {
            account_id: record.account_id,
            name: record.name,
            email: record.email,
            is_admin: record.is_admin,
        })
        .into_response(),
        Ok(None) => StatusCode::NO_CONTENT.into_response(),
        Err(status) => status.into_response(),
    }
}

/// Terminate the session named by the cookie. Idempotent: a missing or
/// already-deleted session still clears the cookie and returns 204.
#[utoipa::path(
    post,
    path = "/v1/auth/logout",
    responses (
        (status = 204, description = "Session terminated"),
    ),
    tag = "auth"
)]
#[instrument(skip_all)]
pub async fn logout(
    headers: HeaderMap,
    Extension(pool): Extension<PgPool>,
    Extension(auth_state): Extension<Arc<AuthState>>,
) -> impl IntoResponse {
    if let Some(token) = extract_session_token(&headers) {
        let token_hash = hash_session_token(&token);
        if let Err(err) = delete_session(&pool, &token_hash).await {
            tracing::error!("failed to delete session: {err}");
            return StatusCode::INTERNAL_SERVER_ERROR.into_response();
        }
    }

    let cookie = clear_session_cookie(auth_state.config());
    let mut response_headers = HeaderMap::new();
    if let Ok(cookie) = HeaderValue::from_str(&cookie) {
        response_headers.insert(header::SET_COOKIE, cookie);
    }
    (StatusCode::NO_CONTENT, response_headers).into_response()
}

/// Resolve the session cookie into an account, if any.
pub(crate) async fn authenticate_session(
    headers: &HeaderMap,
    pool: &PgPool,
) -> Result<Option<SessionRecord>, StatusCode> {
    let Some(token) = extract_session_token(headers) else {
        return Ok(None);
    };
    let token_hash = hash_session_token(&token);
    match lookup_session(pool, &token_hash).await {
        Ok(record) => Ok(record),
        Err(err) => {
            tracing::error!("failed to lookup session: {err}");
            Err(StatusCode::INTERNAL_SERVER_ERROR)
        }
    }
}

/// Pull the session token out of the Cookie header.
fn extract_session_token(headers: &HeaderMap) -> Option<String> {
    let cookies = headers.get(header::COOKIE)?.to_str().ok()?;
    cookies.split(';').find_map(|pair| {
        let (name, value) = pair.trim().split_once('=')?;
        if name == SESSION_COOKIE_NAME && !value.is_empty() {
            Some(value.to_string())
        } else {
            None
        }
    })
}

/// Build the Set-Cookie value for a freshly created session.
pub(super) fn session_cookie(auth_state: &AuthState, token: &str) -> String {
    let config = auth_state.config();
    let mut cookie = format!(
        "{SESSION_COOKIE_NAME}={token}; Path=/; HttpOnly; SameSite=Lax; Max-Age={}",
        config.session_ttl_seconds()
    );
    if config.session_cookie_secure() {
        cookie.push_str("; Secure");
    }
    cookie
}

/// Build the Set-Cookie value that expires the session cookie.
fn clear_session_cookie(config: &AuthConfig) -> String {
    let mut cookie =
        format!("{SESSION_COOKIE_NAME}=; Path=/; HttpOnly; SameSite=Lax; Max-Age=0");
    if config.session_cookie_secure() {
        cookie.push_str("; Secure");
    }
    cookie
}
