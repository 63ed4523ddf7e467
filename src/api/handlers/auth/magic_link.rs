//! Magic-link issuance endpoint.

use axum::{Extension, Json, http::HeaderMap, http::StatusCode, response::IntoResponse};
use sqlx::PgPool;
use std::sync::Arc;
use tracing::instrument;

use super::rate_limit::{RateLimitAction, RateLimitDecision};
use super::state::AuthState;
use super::storage::{lookup_account_by_email, upsert_login_token};
use super::types::{MagicLinkRequest, MagicLinkResponse};
use super::utils::{
    build_login_url, extract_client_ip, generate_login_token, hash_login_token, normalize_email,
    valid_email,
};
use crate::api::email::{EmailSender, login_email};

/// Issue a single-use login link and email it to the account holder.
///
/// Issuance failures are reported precisely (unknown email, unapproved
/// account, delivery failure) because the caller already typed the address;
/// only validation hides its reasons.
#[utoipa::path(
    post,
    path = "/v1/auth/magic-link",
    request_body = MagicLinkRequest,
    responses (
        (status = 200, description = "Login link sent", body = MagicLinkResponse),
        (status = 400, description = "Missing or invalid email"),
        (status = 403, description = "Account not approved"),
        (status = 404, description = "Email not registered"),
        (status = 429, description = "Too many requests"),
        (status = 502, description = "Email delivery failed"),
    ),
    tag = "auth"
)]
#[instrument(skip_all)]
pub async fn request_magic_link(
    headers: HeaderMap,
    Extension(pool): Extension<PgPool>,
    Extension(auth_state): Extension<Arc<AuthState>>,
    Extension(email_sender): Extension<Arc<dyn EmailSender>>,
    payload: Option<Json<MagicLinkRequest>>,
) -> impl IntoResponse {
    let Some(Json(payload)) = payload else {
        return (StatusCode::BAD_REQUEST, "Email is required").into_response();
    };

    let email = normalize_email(&payload.email);
    if email.is_empty() || !valid_email(&email) {
        return (StatusCode::BAD_REQUEST, "A valid email is required").into_response();
    }

    let client_ip = extract_client_ip(&headers);
    if auth_state
        .rate_limiter()
        .check_ip(client_ip.as_deref(), RateLimitAction::IssueToken)
        == RateLimitDecision::Limited
    {
        tracing::warn!(client_ip, "login link issuance rate limited by ip");
        return (StatusCode::TOO_MANY_REQUESTS, "Too many requests").into_response();
    }

    let account = match lookup_account_by_email(&pool, &email).await {
        Ok(Some(account)) => account,
        Ok(None) => {
            tracing::info!(email, "login link requested for unknown email");
            return (StatusCode::NOT_FOUND, "Email not registered").into_response();
        }
        Err(err) => {
            tracing::error!("failed to lookup account: {err}");
            return StatusCode::INTERNAL_SERVER_ERROR.into_response();
        }
    };

    if !account.is_approved {
        tracing::info!(email, "login link requested for unapproved account");
        return (StatusCode::FORBIDDEN, "Account not approved").into_response();
    }

    if auth_state
        .rate_limiter()
        .check_email(&email, RateLimitAction::IssueToken)
        == RateLimitDecision::Limited
    {
        tracing::warn!(email, "login link issuance rate limited by email");
        return (StatusCode::TOO_MANY_REQUESTS, "Too many requests").into_response();
    }

    let token = match generate_login_token() {
        Ok(token) => token,
        Err(err) => {
            tracing::error!("failed to generate login token: {err}");
            return StatusCode::INTERNAL_SERVER_ERROR.into_response();
        }
    };
    let token_hash = hash_login_token(&token);

    let config = auth_state.config();
    if let Err(err) = upsert_login_token(
        &pool,
        &email,
        &token_hash,
        config.login_token_ttl_seconds(),
    )
    .await
    {
        tracing::error!("failed to store login token: {err}");
        return StatusCode::INTERNAL_SERVER_ERROR.into_response();
    }

    let login_url = build_login_url(config.base_url(), &token);
    let message = login_email(config.from_email(), &account.email, &account.name, &login_url);

    // Delivery failure is surfaced to the caller so they can retry instead of
    // waiting for a link that will never arrive.
    if let Err(err) = email_sender.send(&message) {
        tracing::error!(email, "failed to send login email: {err}");
        return (StatusCode::BAD_GATEWAY, "Failed to send login email").into_response();
    }

    tracing::info!(email, account_id = account.id, "login link issued");
    (
        StatusCode::OK,
        Json(MagicLinkResponse {
            message: "Login link sent. Check your email.".to_string(),
            resend_cooldown_seconds: config.resend_cooldown_seconds(),
        }),
    )
        .into_response()
}
