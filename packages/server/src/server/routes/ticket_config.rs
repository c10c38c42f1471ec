use axum::{
    extract::Extension,
    routing::get,
    Json, Router,
};
use serde::Deserialize;

use crate::domains::ticket_config::actions;
use crate::domains::ticket_config::{TicketCategoryConfig, TicketTypeConfig};
use crate::server::app::AppState;
use crate::server::error::ApiResult;
use crate::server::extract::ApiQuery;
use crate::server::middleware::CurrentUser;

pub fn router() -> Router {
    Router::new()
        .route("/ticket-config/types", get(list_types))
        .route("/ticket-config/categories", get(list_categories))
}

#[derive(Debug, Deserialize)]
struct CategoryParams {
    type_code: Option<String>,
}

async fn list_types(
    Extension(state): Extension<AppState>,
    _user: CurrentUser,
) -> ApiResult<Json<Vec<TicketTypeConfig>>> {
    Ok(Json(actions::list_ticket_types(&state.db_pool).await?))
}

async fn list_categories(
    Extension(state): Extension<AppState>,
    _user: CurrentUser,
    ApiQuery(params): ApiQuery<CategoryParams>,
) -> ApiResult<Json<Vec<TicketCategoryConfig>>> {
    Ok(Json(
        actions::list_ticket_categories(params.type_code.as_deref(), &state.db_pool).await?,
    ))
}
