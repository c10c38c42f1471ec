//! Application setup and server configuration.

use std::sync::Arc;

use anyhow::{anyhow, Result};
use axum::{
    extract::Extension,
    http::{
        header::{AUTHORIZATION, CONTENT_TYPE},
        HeaderValue, Method,
    },
    middleware,
    routing::get,
    Router,
};
use sqlx::PgPool;
use tower_governor::{governor::GovernorConfigBuilder, GovernorLayer};
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::common::auth::JwtService;
use crate::server::middleware::jwt_auth_middleware;
use crate::server::routes::{api_routes, health_handler};

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub db_pool: PgPool,
    pub jwt_service: Arc<JwtService>,
}

impl AppState {
    pub fn new(db_pool: PgPool, jwt_service: JwtService) -> Self {
        Self {
            db_pool,
            jwt_service: Arc::new(jwt_service),
        }
    }
}

/// Routes, JWT middleware and shared state.
///
/// Transport concerns (rate limit, CORS, tracing) are added by `build_app`,
/// so tests can drive this router directly.
pub fn build_router(state: AppState) -> Router {
    let jwt_service = state.jwt_service.clone();

    Router::new()
        .route("/health", get(health_handler))
        .merge(api_routes())
        // Middleware layers (applied in reverse order - last added runs first)
        .layer(middleware::from_fn(move |req, next| {
            jwt_auth_middleware(jwt_service.clone(), req, next)
        }))
        .layer(Extension(state))
}

/// Build the full Axum application.
///
/// An empty `allowed_origins` allows any origin.
pub fn build_app(state: AppState, allowed_origins: &[String]) -> Result<Router> {
    let cors = CorsLayer::new()
        .allow_origin(allow_origin(allowed_origins))
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([AUTHORIZATION, CONTENT_TYPE]);

    // 10 requests per second per IP, bursts up to 20
    let rate_limit_config = Arc::new(
        GovernorConfigBuilder::default()
            .per_second(10)
            .burst_size(20)
            .use_headers()
            .finish()
            .ok_or_else(|| anyhow!("invalid rate limiter configuration"))?,
    );
    let rate_limit_layer = GovernorLayer {
        config: rate_limit_config,
    };

    Ok(build_router(state)
        .layer(rate_limit_layer)
        .layer(cors)
        .layer(TraceLayer::new_for_http()))
}

fn allow_origin(allowed_origins: &[String]) -> AllowOrigin {
    if allowed_origins.is_empty() {
        return AllowOrigin::any();
    }
    let origins: Vec<HeaderValue> = allowed_origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!(origin = %origin, "ignoring invalid CORS origin");
                None
            }
        })
        .collect();
    AllowOrigin::list(origins)
}
