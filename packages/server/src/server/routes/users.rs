use axum::{
    extract::Extension,
    http::StatusCode,
    routing::get,
    Json, Router,
};
use serde::Serialize;

use crate::common::UserId;
use crate::domains::users::actions::{self, UserRemoval};
use crate::domains::users::data::{CreateUserInput, TechnicianStats, UpdateUserInput};
use crate::domains::users::models::{RoleRecord, TechnicianWorkload, User};
use crate::server::app::AppState;
use crate::server::error::ApiResult;
use crate::server::extract::{ApiJson, ApiPath};
use crate::server::middleware::CurrentUser;

pub fn router() -> Router {
    Router::new()
        .route("/users", get(list_users).post(create_user))
        .route("/users/roles", get(list_roles))
        .route("/users/technicians", get(list_technicians))
        .route("/users/technicians/:id/stats", get(technician_stats))
        .route(
            "/users/:id",
            get(get_user).put(update_user).delete(delete_user),
        )
        .route("/auth/me", get(me))
}

async fn me(user: CurrentUser) -> Json<User> {
    Json(user.0)
}

async fn list_technicians(
    Extension(state): Extension<AppState>,
    user: CurrentUser,
) -> ApiResult<Json<Vec<TechnicianWorkload>>> {
    Ok(Json(actions::list_technicians(&user.actor(), &state.db_pool).await?))
}

async fn technician_stats(
    Extension(state): Extension<AppState>,
    user: CurrentUser,
    ApiPath(id): ApiPath<UserId>,
) -> ApiResult<Json<TechnicianStats>> {
    Ok(Json(actions::technician_stats(id, &user.actor(), &state.db_pool).await?))
}

async fn list_roles(
    Extension(state): Extension<AppState>,
    _user: CurrentUser,
) -> ApiResult<Json<Vec<RoleRecord>>> {
    Ok(Json(actions::list_roles(&state.db_pool).await?))
}

async fn list_users(
    Extension(state): Extension<AppState>,
    user: CurrentUser,
) -> ApiResult<Json<Vec<User>>> {
    Ok(Json(actions::list_users(&user.actor(), &state.db_pool).await?))
}

async fn create_user(
    Extension(state): Extension<AppState>,
    user: CurrentUser,
    ApiJson(input): ApiJson<CreateUserInput>,
) -> ApiResult<(StatusCode, Json<User>)> {
    let created = actions::create_user(input, &user.actor(), &state.db_pool).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

async fn get_user(
    Extension(state): Extension<AppState>,
    user: CurrentUser,
    ApiPath(id): ApiPath<UserId>,
) -> ApiResult<Json<User>> {
    Ok(Json(actions::get_user(id, &user.actor(), &state.db_pool).await?))
}

async fn update_user(
    Extension(state): Extension<AppState>,
    user: CurrentUser,
    ApiPath(id): ApiPath<UserId>,
    ApiJson(input): ApiJson<UpdateUserInput>,
) -> ApiResult<Json<User>> {
    Ok(Json(
        actions::update_user(id, input, &user.actor(), &state.db_pool).await?,
    ))
}

#[derive(Debug, Serialize)]
struct DeleteUserResponse {
    detail: &'static str,
    deactivated: bool,
}

async fn delete_user(
    Extension(state): Extension<AppState>,
    user: CurrentUser,
    ApiPath(id): ApiPath<UserId>,
) -> ApiResult<Json<DeleteUserResponse>> {
    let response = match actions::delete_user(id, &user.actor(), &state.db_pool).await? {
        UserRemoval::Deleted => DeleteUserResponse {
            detail: "User deleted",
            deactivated: false,
        },
        UserRemoval::Deactivated => DeleteUserResponse {
            detail: "User has tickets and was deactivated instead",
            deactivated: true,
        },
    };
    Ok(Json(response))
}
