use axum::{
    extract::Extension,
    http::StatusCode,
    routing::{get, put},
    Json, Router,
};
use serde::Deserialize;
use sqlx::PgPool;

use crate::common::TicketId;
use crate::domains::tickets::actions;
use crate::domains::tickets::data::{
    AssignInput, CommentInput, CreateTicketInput, DelegateInput, EditTicketInput, FeedbackInput,
    StatusUpdateInput, TicketData, ValidateInput,
};
use crate::domains::tickets::models::{Comment, Ticket, TicketHistory};
use crate::server::app::AppState;
use crate::server::error::ApiResult;
use crate::server::extract::{ApiJson, ApiPath, ApiQuery};
use crate::server::middleware::CurrentUser;

pub fn router() -> Router {
    Router::new()
        .route("/tickets", get(list_tickets).post(create_ticket))
        .route("/tickets/me", get(my_tickets))
        .route("/tickets/assigned", get(assigned_tickets))
        .route(
            "/tickets/:id",
            get(get_ticket).put(edit_ticket).delete(delete_ticket),
        )
        .route("/tickets/:id/assign", put(assign_ticket))
        .route("/tickets/:id/reassign", put(reassign_ticket))
        .route("/tickets/:id/escalate", put(escalate_ticket))
        .route("/tickets/:id/status", put(update_status))
        .route("/tickets/:id/validate", put(validate_ticket))
        .route("/tickets/:id/delegate-adjoint", put(delegate_to_adjoint))
        .route("/tickets/:id/accept-assignment", put(accept_assignment))
        .route("/tickets/:id/reject-assignment", put(reject_assignment))
        .route("/tickets/:id/feedback", put(submit_feedback))
        .route("/tickets/:id/reopen-by-user", put(reopen_by_user))
        .route("/tickets/:id/reopen", put(reopen_ticket))
        .route("/tickets/:id/history", get(ticket_history))
        .route("/tickets/:id/comments", get(list_comments).post(add_comment))
}

/// Mutations answer with the ticket and its people, like GET does.
async fn respond(ticket: Ticket, pool: &PgPool) -> ApiResult<Json<TicketData>> {
    Ok(Json(TicketData::load(ticket, pool).await?))
}

async fn create_ticket(
    Extension(state): Extension<AppState>,
    user: CurrentUser,
    ApiJson(input): ApiJson<CreateTicketInput>,
) -> ApiResult<(StatusCode, Json<TicketData>)> {
    let ticket = actions::create_ticket(input, &user.actor(), &state.db_pool).await?;
    Ok((StatusCode::CREATED, respond(ticket, &state.db_pool).await?))
}

async fn list_tickets(
    Extension(state): Extension<AppState>,
    user: CurrentUser,
) -> ApiResult<Json<Vec<TicketData>>> {
    Ok(Json(actions::list_tickets(&user.actor(), &state.db_pool).await?))
}

async fn my_tickets(
    Extension(state): Extension<AppState>,
    user: CurrentUser,
) -> ApiResult<Json<Vec<TicketData>>> {
    Ok(Json(actions::my_tickets(&user.actor(), &state.db_pool).await?))
}

async fn assigned_tickets(
    Extension(state): Extension<AppState>,
    user: CurrentUser,
) -> ApiResult<Json<Vec<TicketData>>> {
    Ok(Json(actions::assigned_tickets(&user.actor(), &state.db_pool).await?))
}

async fn get_ticket(
    Extension(state): Extension<AppState>,
    user: CurrentUser,
    ApiPath(id): ApiPath<TicketId>,
) -> ApiResult<Json<TicketData>> {
    Ok(Json(actions::get_ticket(id, &user.actor(), &state.db_pool).await?))
}

async fn edit_ticket(
    Extension(state): Extension<AppState>,
    user: CurrentUser,
    ApiPath(id): ApiPath<TicketId>,
    ApiJson(input): ApiJson<EditTicketInput>,
) -> ApiResult<Json<TicketData>> {
    let ticket = actions::edit_ticket(id, input, &user.actor(), &state.db_pool).await?;
    respond(ticket, &state.db_pool).await
}

async fn delete_ticket(
    Extension(state): Extension<AppState>,
    user: CurrentUser,
    ApiPath(id): ApiPath<TicketId>,
) -> ApiResult<StatusCode> {
    actions::delete_ticket(id, &user.actor(), &state.db_pool).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn assign_ticket(
    Extension(state): Extension<AppState>,
    user: CurrentUser,
    ApiPath(id): ApiPath<TicketId>,
    ApiJson(input): ApiJson<AssignInput>,
) -> ApiResult<Json<TicketData>> {
    let ticket = actions::assign_ticket(id, input, &user.actor(), &state.db_pool).await?;
    respond(ticket, &state.db_pool).await
}

async fn reassign_ticket(
    Extension(state): Extension<AppState>,
    user: CurrentUser,
    ApiPath(id): ApiPath<TicketId>,
    ApiJson(input): ApiJson<AssignInput>,
) -> ApiResult<Json<TicketData>> {
    let ticket = actions::reassign_ticket(id, input, &user.actor(), &state.db_pool).await?;
    respond(ticket, &state.db_pool).await
}

async fn escalate_ticket(
    Extension(state): Extension<AppState>,
    user: CurrentUser,
    ApiPath(id): ApiPath<TicketId>,
) -> ApiResult<Json<TicketData>> {
    let ticket = actions::escalate_ticket(id, &user.actor(), &state.db_pool).await?;
    respond(ticket, &state.db_pool).await
}

async fn update_status(
    Extension(state): Extension<AppState>,
    user: CurrentUser,
    ApiPath(id): ApiPath<TicketId>,
    ApiJson(input): ApiJson<StatusUpdateInput>,
) -> ApiResult<Json<TicketData>> {
    let ticket = actions::update_status(id, input, &user.actor(), &state.db_pool).await?;
    respond(ticket, &state.db_pool).await
}

async fn validate_ticket(
    Extension(state): Extension<AppState>,
    user: CurrentUser,
    ApiPath(id): ApiPath<TicketId>,
    ApiJson(input): ApiJson<ValidateInput>,
) -> ApiResult<Json<TicketData>> {
    let ticket = actions::validate_ticket(id, input, &user.actor(), &state.db_pool).await?;
    respond(ticket, &state.db_pool).await
}

async fn delegate_to_adjoint(
    Extension(state): Extension<AppState>,
    user: CurrentUser,
    ApiPath(id): ApiPath<TicketId>,
    ApiJson(input): ApiJson<DelegateInput>,
) -> ApiResult<Json<TicketData>> {
    let ticket = actions::delegate_to_adjoint(id, input, &user.actor(), &state.db_pool).await?;
    respond(ticket, &state.db_pool).await
}

async fn accept_assignment(
    Extension(state): Extension<AppState>,
    user: CurrentUser,
    ApiPath(id): ApiPath<TicketId>,
) -> ApiResult<Json<TicketData>> {
    let ticket = actions::accept_assignment(id, &user.actor(), &state.db_pool).await?;
    respond(ticket, &state.db_pool).await
}

#[derive(Debug, Deserialize)]
struct RejectAssignmentParams {
    reason: Option<String>,
}

async fn reject_assignment(
    Extension(state): Extension<AppState>,
    user: CurrentUser,
    ApiPath(id): ApiPath<TicketId>,
    ApiQuery(params): ApiQuery<RejectAssignmentParams>,
) -> ApiResult<Json<TicketData>> {
    let ticket =
        actions::reject_assignment(id, params.reason, &user.actor(), &state.db_pool).await?;
    respond(ticket, &state.db_pool).await
}

async fn submit_feedback(
    Extension(state): Extension<AppState>,
    user: CurrentUser,
    ApiPath(id): ApiPath<TicketId>,
    ApiJson(input): ApiJson<FeedbackInput>,
) -> ApiResult<Json<TicketData>> {
    let ticket = actions::submit_feedback(id, input, &user.actor(), &state.db_pool).await?;
    respond(ticket, &state.db_pool).await
}

async fn reopen_by_user(
    Extension(state): Extension<AppState>,
    user: CurrentUser,
    ApiPath(id): ApiPath<TicketId>,
) -> ApiResult<Json<TicketData>> {
    let ticket = actions::reopen_by_user(id, &user.actor(), &state.db_pool).await?;
    respond(ticket, &state.db_pool).await
}

async fn reopen_ticket(
    Extension(state): Extension<AppState>,
    user: CurrentUser,
    ApiPath(id): ApiPath<TicketId>,
    ApiJson(input): ApiJson<AssignInput>,
) -> ApiResult<Json<TicketData>> {
    let ticket = actions::reopen_ticket(id, input, &user.actor(), &state.db_pool).await?;
    respond(ticket, &state.db_pool).await
}

async fn ticket_history(
    Extension(state): Extension<AppState>,
    user: CurrentUser,
    ApiPath(id): ApiPath<TicketId>,
) -> ApiResult<Json<Vec<TicketHistory>>> {
    Ok(Json(actions::ticket_history(id, &user.actor(), &state.db_pool).await?))
}

async fn add_comment(
    Extension(state): Extension<AppState>,
    user: CurrentUser,
    ApiPath(id): ApiPath<TicketId>,
    ApiJson(input): ApiJson<CommentInput>,
) -> ApiResult<(StatusCode, Json<Comment>)> {
    let comment = actions::add_comment(id, input, &user.actor(), &state.db_pool).await?;
    Ok((StatusCode::CREATED, Json(comment)))
}

async fn list_comments(
    Extension(state): Extension<AppState>,
    user: CurrentUser,
    ApiPath(id): ApiPath<TicketId>,
) -> ApiResult<Json<Vec<Comment>>> {
    Ok(Json(actions::list_comments(id, &user.actor(), &state.db_pool).await?))
}
