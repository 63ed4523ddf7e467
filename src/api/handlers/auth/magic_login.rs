//! Magic-link validation endpoint.
//!
//! This is the link target opened from the email, usually in a fresh tab.
//! On success it sets the session cookie and redirects to the completion
//! page, which signals the originating tab and closes itself.

use axum::{
    Extension,
    extract::Query,
    http::{HeaderMap, HeaderValue, StatusCode, header},
    response::IntoResponse,
};
use sqlx::PgPool;
use std::sync::Arc;
use tracing::instrument;

use super::rate_limit::{RateLimitAction, RateLimitDecision};
use super::session::session_cookie;
use super::state::AuthState;
use super::storage::{ConsumeOutcome, consume_login_token, insert_session, lookup_account_by_email};
use super::types::MagicLoginQuery;
use super::utils::{build_complete_url, extract_client_ip, hash_login_token};

/// One message for every invalid-token path. Expired, spent, unknown, and
/// deleted-account tokens are indistinguishable to the caller.
const INVALID_LINK: &str = "Invalid or expired login link";

/// Validate a login link token, establish a session, and redirect.
#[utoipa::path(
    get,
    path = "/magic_login",
    params(
        ("token" = Option<String>, Query, description = "Opaque single-use login token"),
    ),
    responses (
        (status = 303, description = "Session established, redirect to completion page"),
        (status = 400, description = "Invalid or expired login link"),
        (status = 403, description = "Account not approved"),
        (status = 429, description = "Too many requests"),
    ),
    tag = "auth"
)]
#[instrument(skip_all)]
pub async fn magic_login(
    headers: HeaderMap,
    Extension(pool): Extension<PgPool>,
    Extension(auth_state): Extension<Arc<AuthState>>,
    Query(query): Query<MagicLoginQuery>,
) -> impl IntoResponse {
    let Some(token) = query.token.filter(|token| !token.is_empty()) else {
        return (StatusCode::BAD_REQUEST, INVALID_LINK).into_response();
    };

    let client_ip = extract_client_ip(&headers);
    if auth_state
        .rate_limiter()
        .check_ip(client_ip.as_deref(), RateLimitAction::ValidateToken)
        == RateLimitDecision::Limited
    {
        tracing::warn!(client_ip, "login link validation rate limited");
        return (StatusCode::TOO_MANY_REQUESTS, "Too many requests").into_response();
    }

    let token_hash = hash_login_token(&token);
    let email = match consume_login_token(&pool, &token_hash).await {
        Ok(ConsumeOutcome::Consumed(email)) => email,
        Ok(outcome) => {
            tracing::info!(?outcome, "login link rejected");
            return (StatusCode::BAD_REQUEST, INVALID_LINK).into_response();
        }
        Err(err) => {
            tracing::error!("failed to consume login token: {err}");
            return StatusCode::INTERNAL_SERVER_ERROR.into_response();
        }
    };

    // Approval is re-checked here: a token issued before an account was
    // suspended must not open a session after.
    let account = match lookup_account_by_email(&pool, &email).await {
        Ok(Some(account)) => account,
        Ok(None) => {
            tracing::warn!(email, "consumed token for missing account");
            return (StatusCode::BAD_REQUEST, INVALID_LINK).into_response();
        }
        Err(err) => {
            tracing::error!("failed to lookup account: {err}");
            return StatusCode::INTERNAL_SERVER_ERROR.into_response();
        }
    };

    if !account.is_approved {
        tracing::info!(email, "consumed token for unapproved account");
        return (StatusCode::FORBIDDEN, "Account not approved").into_response();
    }

    let config = auth_state.config();
    let session_token =
        match insert_session(&pool, account.id, config.session_ttl_seconds()).await {
            Ok(token) => token,
            Err(err) => {
                tracing::error!("failed to create session: {err}");
                return StatusCode::INTERNAL_SERVER_ERROR.into_response();
            }
        };

    let cookie = session_cookie(&auth_state, &session_token);
    let complete_url = build_complete_url(config.base_url());

    let mut response_headers = HeaderMap::new();
    let (Ok(cookie), Ok(location)) = (
        HeaderValue::from_str(&cookie),
        HeaderValue::from_str(&complete_url),
    ) else {
        tracing::error!("failed to build session response headers");
        return StatusCode::INTERNAL_SERVER_ERROR.into_response();
    };
    response_headers.insert(header::SET_COOKIE, cookie);
    response_headers.insert(header::LOCATION, location);

    tracing::info!(email, account_id = account.id, "login link validated");
    (StatusCode::SEE_OTHER, response_headers).into_response()
}
