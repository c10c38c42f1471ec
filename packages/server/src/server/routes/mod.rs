// HTTP routes
pub mod health;
pub mod notifications;
pub mod ticket_config;
pub mod tickets;
pub mod users;

pub use health::*;

use axum::Router;

/// Every authenticated API route.
pub fn api_routes() -> Router {
    Router::new()
        .merge(tickets::router())
        .merge(users::router())
        .merge(ticket_config::router())
        .merge(notifications::router())
}
