use std::time::Duration;

use axum::{extract::Extension, http::StatusCode, Json};
use serde::Serialize;

use crate::kernel::outbox::{OutboxBacklog, OutboxEmail};
use crate::server::app::AppState;

const PROBE_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Serialize)]
pub struct HealthResponse {
    status: &'static str,
    database: DatabaseHealth,
    connection_pool: ConnectionPoolHealth,
    #[serde(skip_serializing_if = "Option::is_none")]
    email_outbox: Option<OutboxBacklog>,
}

#[derive(Serialize)]
pub struct DatabaseHealth {
    status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

#[derive(Serialize)]
pub struct ConnectionPoolHealth {
    size: u32,
    idle_connections: usize,
    max_connections: u32,
}

/// Health check endpoint, open to anonymous callers
///
/// 200 when the database answers within five seconds, 503 otherwise. The
/// outbox backlog is informational and never fails the check.
pub async fn health_handler(
    Extension(state): Extension<AppState>,
) -> (StatusCode, Json<HealthResponse>) {
    let pool = &state.db_pool;

    let database = match tokio::time::timeout(PROBE_TIMEOUT, sqlx::query("SELECT 1").execute(pool)).await {
        Ok(Ok(_)) => DatabaseHealth {
            status: "ok",
            error: None,
        },
        Ok(Err(e)) => DatabaseHealth {
            status: "error",
            error: Some(format!("Query failed: {}", e)),
        },
        Err(_) => DatabaseHealth {
            status: "error",
            error: Some("Query timeout (>5s)".to_string()),
        },
    };
    let healthy = database.error.is_none();

    let email_outbox = if healthy {
        match tokio::time::timeout(PROBE_TIMEOUT, OutboxEmail::backlog(pool)).await {
            Ok(Ok(backlog)) => Some(backlog),
            _ => None,
        }
    } else {
        None
    };

    let connection_pool = ConnectionPoolHealth {
        size: pool.size(),
        idle_connections: pool.num_idle(),
        max_connections: pool.options().get_max_connections(),
    };

    let (status_code, status) = if healthy {
        (StatusCode::OK, "healthy")
    } else {
        (StatusCode::SERVICE_UNAVAILABLE, "unhealthy")
    };

    (
        status_code,
        Json(HealthResponse {
            status,
            database,
            connection_pool,
            email_outbox,
        }),
    )
}
