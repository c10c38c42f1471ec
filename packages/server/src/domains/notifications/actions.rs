//! In-app notification inbox.

use sqlx::PgPool;
use tracing::debug;

use super::models::Notification;
use crate::common::{DomainError, DomainResult, NotificationId, UserId};

pub async fn list_my_notifications(user_id: UserId, pool: &PgPool) -> DomainResult<Vec<Notification>> {
    Ok(Notification::find_for_user(user_id, pool).await?)
}

pub async fn unread_count(user_id: UserId, pool: &PgPool) -> DomainResult<i64> {
    Ok(Notification::count_unread(user_id, pool).await?)
}

pub async fn mark_as_read(
    id: NotificationId,
    user_id: UserId,
    pool: &PgPool,
) -> DomainResult<Notification> {
    Notification::mark_read(id, user_id, pool)
        .await?
        .ok_or(DomainError::NotFound("Notification"))
}

pub async fn mark_all_as_read(user_id: UserId, pool: &PgPool) -> DomainResult<u64> {
    let updated = Notification::mark_all_read(user_id, pool).await?;
    debug!(user_id = %user_id, updated, "notifications marked read");
    Ok(updated)
}
