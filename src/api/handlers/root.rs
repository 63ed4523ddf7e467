use axum::response::{IntoResponse, Json};
use serde_json::json;

// Undocumented service banner; the OpenAPI spec only covers /v1 and /magic_login.
pub async fn root() -> impl IntoResponse {
    Json(json!({
        "name": env!("CARGO_PKG_NAME"),
        "version": env!("CARGO_PKG_VERSION"),
    }))
}
