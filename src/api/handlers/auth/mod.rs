//! Auth handlers and supporting modules.
//!
//! This module coordinates magic-link issuance, single-use validation, and
//! session management.
//!
//! ## Single-Use Guarantee
//!
//! The `login_tokens` table holds at most one row per email. Issuance upserts
//! the row (later write wins); validation consumes it with one conditional
//! update, so concurrent validations of the same token have exactly one
//! winner. Tokens and session cookies are stored as SHA-256 hashes only.
//!
//! ## Rate Limiting
//!
//! Issuance and validation pass through a [`RateLimiter`] keyed by client IP
//! and by email. The client-side resend countdown (see [`crate::notify`]) is a
//! UI guard only; the server-side limiter is what a hostile client cannot
//! bypass.

pub(crate) mod magic_link;
pub(crate) mod magic_login;
mod rate_limit;
pub(crate) mod session;
mod state;
mod storage;
#[cfg(test)]
mod tests;
pub(crate) mod types;
mod utils;

pub use rate_limit::{NoopRateLimiter, RateLimiter, WindowRateLimiter};
pub use state::{AuthConfig, AuthState};
