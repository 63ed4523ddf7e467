use crate::GIT_COMMIT_HASH;
use axum::{
    body::Body,
    extract::Extension,
    http::{HeaderMap, HeaderValue, Method, StatusCode},
    response::{IntoResponse, Json},
};
use serde::{Deserialize, Serialize};
use sqlx::{Connection, PgPool};
use tracing::{Instrument, error, info_span};
use utoipa::ToSchema;

#[derive(ToSchema, Serialize, Deserialize, Debug)]
pub struct Health {
    commit: String,
    name: String,
    version: String,
    database: String,
}

/// Liveness/readiness probe: acquires a connection and pings the database.
/// `OPTIONS` (used for preflight) returns the headers with an empty body.
#[utoipa::path(
    get,
    path = "/health",
    responses (
        (status = 200, description = "Database is healthy", body = Health),
        (status = 503, description = "Database is unhealthy", body = Health)
    ),
    tag = "sezamo"
)]
pub async fn health(method: Method, pool: Extension<PgPool>) -> impl IntoResponse {
    let database_ok = ping_database(&pool.0).await;

    let health = Health {
        commit: GIT_COMMIT_HASH.to_string(),
        name: env!("CARGO_PKG_NAME").to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        database: if database_ok { "ok" } else { "error" }.to_string(),
    };

    let mut headers = HeaderMap::new();
    if let Ok(value) = x_app_header(&health).parse::<HeaderValue>() {
        headers.insert("X-App", value);
    }

    let body = if method == Method::GET {
        Json(&health).into_response()
    } else {
        Body::empty().into_response()
    };

    let status = if database_ok {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };
    (status, headers, body)
}

async fn ping_database(pool: &PgPool) -> bool {
    let acquire_span = info_span!(
        "db.acquire",
        db.system = "postgresql",
        db.operation = "ACQUIRE"
    );
    let mut conn = match pool.acquire().instrument(acquire_span).await {
        Ok(conn) => conn,
        Err(err) => {
            error!("Failed to acquire database connection: {err}");
            return false;
        }
    };

    let ping_span = info_span!("db.ping", db.system = "postgresql", db.operation = "PING");
    match conn.ping().instrument(ping_span).await {
        Ok(()) => true,
        Err(err) => {
            error!("Failed to ping database: {err}");
            false
        }
    }
}

/// `name:version:short-commit`, same shape the CLI prints for `--version`.
fn x_app_header(health: &Health) -> String {
    let short_hash = if health.commit.len() >= 7 {
        &health.commit[..7]
    } else {
        ""
    };
    format!("{}:{}:{}", health.name, health.version, short_hash)
}

#[cfg(test)]
mod tests {
    use super::{Health, x_app_header};

    #[test]
    fn x_app_header_shortens_commit() {
        let health = Health {
            commit: "0123456789abcdef".to_string(),
            name: "sezamo".to_string(),
            version: "0.1.0".to_string(),
            database: "ok".to_string(),
        };
        assert_eq!(x_app_header(&health), "sezamo:0.1.0:0123456");
    }

    #[test]
    fn x_app_header_handles_unknown_commit() {
        let health = Health {
            commit: "unknown".to_string(),
            name: "sezamo".to_string(),
            version: "0.1.0".to_string(),
            database: "error".to_string(),
        };
        assert_eq!(x_app_header(&health), "sezamo:0.1.0:unknown");
    }
}
