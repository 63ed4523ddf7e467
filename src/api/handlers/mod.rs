//! API handlers for Sezamo.
//!
//! This module organizes the service's route handlers: the auth domain
//! (magic-link issuance, validation, sessions) plus health and root.

pub mod auth;
pub mod health;
pub mod root;
