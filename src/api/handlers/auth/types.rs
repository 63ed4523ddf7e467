//! Request/response types for auth endpoints.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(ToSchema, Serialize, Deserialize, Debug)]
pub struct MagicLinkRequest {
    pub email: String,
}

#[derive(ToSchema, Serialize, Deserialize, Debug)]
pub struct MagicLinkResponse {
    pub message: String,
    /// Seconds the client should wait before offering "resend".
    pub resend_cooldown_seconds: i64,
}

#[derive(ToSchema, Serialize, Deserialize, Debug)]
pub struct MagicLoginQuery {
    pub token: Option<String>,
}

#[derive(ToSchema, Serialize, Deserialize, Debug)]
pub struct SessionResponse {
    pub account_id: i64,
    pub name: String,
    pub email: String,
    pub is_admin: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::{Context, Result};

    #[test]
    fn magic_link_request_round_trips() -> Result<()> {
        let request = MagicLinkRequest {
            email: "alice@example.com".to_string(),
        };
        let value = serde_json::to_value(&request)?;
        let email = value
            .get("email")
            .and_then(serde_json::Value::as_str)
            .context("missing email")?;
        assert_eq!(email, "alice@example.com");
        let decoded: MagicLinkRequest = serde_json::from_value(value)?;
        assert_eq!(decoded.email, "alice@example.com");
        Ok(())
    }

    #[test]
    fn magic_login_query_token_optional() -> Result<()> {
        let decoded: MagicLoginQuery = serde_json::from_value(serde_json::json!({}))?;
        assert!(decoded.token.is_none());
        let decoded: MagicLoginQuery = serde_json::from_value(serde_json::json!({
            "token": "opaque"
        }))?;
        assert_eq!(decoded.token.as_deref(), Some("opaque"));
        Ok(())
    }

    #[test]
    fn session_response_round_trips() -> Result<()> {
        let response = SessionResponse {
            account_id: 7,
            name: "Demo".to_string(),
            email: "demo@example.com".to_string(),
            is_admin: false,
        };
        let value = serde_json::to_value(&response)?;
        let decoded: SessionResponse = serde_json::from_value(value)?;
        assert_eq!(decoded.account_id, 7);
        assert!(!decoded.is_admin);
        Ok(())
    }
}
