use axum::{
    extract::Extension,
    routing::{get, put},
    Json, Router,
};
use serde_json::{json, Value};

use crate::common::NotificationId;
use crate::domains::notifications::actions;
use crate::domains::notifications::models::Notification;
use crate::server::app::AppState;
use crate::server::error::ApiResult;
use crate::server::extract::ApiPath;
use crate::server::middleware::CurrentUser;

pub fn router() -> Router {
    Router::new()
        .route("/notifications", get(list_notifications))
        .route("/notifications/unread-count", get(unread_count))
        .route("/notifications/read-all", put(mark_all_as_read))
        .route("/notifications/:id/read", put(mark_as_read))
}

async fn list_notifications(
    Extension(state): Extension<AppState>,
    user: CurrentUser,
) -> ApiResult<Json<Vec<Notification>>> {
    Ok(Json(
        actions::list_my_notifications(user.0.id, &state.db_pool).await?,
    ))
}

async fn unread_count(
    Extension(state): Extension<AppState>,
    user: CurrentUser,
) -> ApiResult<Json<Value>> {
    let count = actions::unread_count(user.0.id, &state.db_pool).await?;
    Ok(Json(json!({ "unread_count": count })))
}

async fn mark_as_read(
    Extension(state): Extension<AppState>,
    user: CurrentUser,
    ApiPath(id): ApiPath<NotificationId>,
) -> ApiResult<Json<Notification>> {
    Ok(Json(
        actions::mark_as_read(id, user.0.id, &state.db_pool).await?,
    ))
}

async fn mark_all_as_read(
    Extension(state): Extension<AppState>,
    user: CurrentUser,
) -> ApiResult<Json<Value>> {
    let updated = actions::mark_all_as_read(user.0.id, &state.db_pool).await?;
    Ok(Json(json!({ "updated": updated })))
}
