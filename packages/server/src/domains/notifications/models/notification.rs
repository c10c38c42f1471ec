use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{PgExecutor, PgPool};
use typed_builder::TypedBuilder;

use crate::common::{NotificationId, TicketId, UserId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "notification_type", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum NotificationType {
    /// Broadcast to agents when a ticket is opened
    NouveauTicket,
    /// Receipt sent to the requester
    TicketCree,
    /// A technician received a ticket
    Assignation,
    /// The requester's ticket got a technician
    TicketAssigne,
    /// A technician lost a ticket to a colleague
    Reassignation,
    TechnicienChange,
    Escalade,
    TicketEnCours,
    TicketResolu,
    TicketCloture,
    TicketRejete,
    /// The requester refused a resolution
    RejetResolution,
    TicketEnAttente,
    TicketReouvert,
    Commentaire,
    ClotureAutomatique,
}

#[derive(sqlx::FromRow, Debug, Clone, Serialize)]
pub struct Notification {
    pub id: NotificationId,
    pub user_id: UserId,
    #[sqlx(rename = "type")]
    #[serde(rename = "type")]
    pub kind: NotificationType,
    pub ticket_id: Option<TicketId>,
    pub message: String,
    pub read: bool,
    pub created_at: DateTime<Utc>,
    pub read_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, TypedBuilder)]
#[builder(field_defaults(setter(into)))]
pub struct NewNotification {
    pub user_id: UserId,
    pub kind: NotificationType,
    #[builder(default)]
    pub ticket_id: Option<TicketId>,
    pub message: String,
}

impl Notification {
    pub async fn insert<'e>(new: &NewNotification, executor: impl PgExecutor<'e>) -> Result<Self> {
        sqlx::query_as::<_, Self>(
            r#"
            INSERT INTO notifications (id, user_id, type, ticket_id, message)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING *
            "#,
        )
        .bind(NotificationId::new())
        .bind(new.user_id)
        .bind(new.kind)
        .bind(new.ticket_id)
        .bind(&new.message)
        .fetch_one(executor)
        .await
        .map_err(Into::into)
    }

    pub async fn find_for_user(user_id: UserId, pool: &PgPool) -> Result<Vec<Self>> {
        sqlx::query_as::<_, Self>(
            "SELECT * FROM notifications WHERE user_id = $1 ORDER BY created_at DESC, id DESC",
        )
        .bind(user_id)
        .fetch_all(pool)
        .await
        .map_err(Into::into)
    }

    pub async fn find_for_ticket(ticket_id: TicketId, pool: &PgPool) -> Result<Vec<Self>> {
        sqlx::query_as::<_, Self>(
            "SELECT * FROM notifications WHERE ticket_id = $1 ORDER BY created_at, id",
        )
        .bind(ticket_id)
        .fetch_all(pool)
        .await
        .map_err(Into::into)
    }

    pub async fn count_unread(user_id: UserId, pool: &PgPool) -> Result<i64> {
        sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM notifications WHERE user_id = $1 AND NOT read",
        )
        .bind(user_id)
        .fetch_one(pool)
        .await
        .map_err(Into::into)
    }

    /// Mark one of `user_id`'s notifications read. `None` if it isn't theirs.
    pub async fn mark_read(
        id: NotificationId,
        user_id: UserId,
        pool: &PgPool,
    ) -> Result<Option<Self>> {
        sqlx::query_as::<_, Self>(
            r#"
            UPDATE notifications
            SET read = TRUE, read_at = COALESCE(read_at, NOW())
            WHERE id = $1 AND user_id = $2
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(user_id)
        .fetch_optional(pool)
        .await
        .map_err(Into::into)
    }

    pub async fn mark_all_read(user_id: UserId, pool: &PgPool) -> Result<u64> {
        let result = sqlx::query(
            "UPDATE notifications SET read = TRUE, read_at = NOW() WHERE user_id = $1 AND NOT read",
        )
        .bind(user_id)
        .execute(pool)
        .await?;
        Ok(result.rows_affected())
    }
}
