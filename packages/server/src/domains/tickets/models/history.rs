use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::{PgExecutor, PgPool};

use super::ticket::TicketStatus;
use crate::common::{TicketHistoryId, TicketId, UserId};

/// One row of a ticket's audit trail.
///
/// Rows are only ever inserted; they disappear solely through the cascade
/// when their ticket is deleted. `user_id` is `None` for system actions.
#[derive(sqlx::FromRow, Debug, Clone, Serialize)]
pub struct TicketHistory {
    pub id: TicketHistoryId,
    pub ticket_id: TicketId,
    pub old_status: Option<TicketStatus>,
    pub new_status: TicketStatus,
    pub user_id: Option<UserId>,
    pub reason: Option<String>,
    pub changed_at: DateTime<Utc>,
}

impl TicketHistory {
    pub async fn append<'e>(
        ticket_id: TicketId,
        old_status: Option<TicketStatus>,
        new_status: TicketStatus,
        user_id: Option<UserId>,
        reason: Option<&str>,
        executor: impl PgExecutor<'e>,
    ) -> Result<Self> {
        sqlx::query_as::<_, Self>(
            r#"
            INSERT INTO ticket_history (id, ticket_id, old_status, new_status, user_id, reason)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING *
            "#,
        )
        .bind(TicketHistoryId::new())
        .bind(ticket_id)
        .bind(old_status)
        .bind(new_status)
        .bind(user_id)
        .bind(reason)
        .fetch_one(executor)
        .await
        .map_err(Into::into)
    }

    /// Newest first.
    pub async fn find_for_ticket(ticket_id: TicketId, pool: &PgPool) -> Result<Vec<Self>> {
        sqlx::query_as::<_, Self>(
            "SELECT * FROM ticket_history WHERE ticket_id = $1 ORDER BY changed_at DESC, id DESC",
        )
        .bind(ticket_id)
        .fetch_all(pool)
        .await
        .map_err(Into::into)
    }
}
