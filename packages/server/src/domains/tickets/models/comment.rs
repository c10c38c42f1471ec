use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{PgExecutor, PgPool};

use crate::common::{CommentId, TicketId, UserId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, Default)]
#[sqlx(type_name = "comment_type", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum CommentType {
    #[default]
    Technique,
    Utilisateur,
    Systeme,
}

#[derive(sqlx::FromRow, Debug, Clone, Serialize)]
pub struct Comment {
    pub id: CommentId,
    pub ticket_id: TicketId,
    pub user_id: UserId,
    pub content: String,
    #[sqlx(rename = "type")]
    #[serde(rename = "type")]
    pub comment_type: CommentType,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Comment {
    pub async fn create<'e>(
        ticket_id: TicketId,
        user_id: UserId,
        content: &str,
        comment_type: CommentType,
        executor: impl PgExecutor<'e>,
    ) -> Result<Self> {
        sqlx::query_as::<_, Self>(
            r#"
            INSERT INTO comments (id, ticket_id, user_id, content, type)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING *
            "#,
        )
        .bind(CommentId::new())
        .bind(ticket_id)
        .bind(user_id)
        .bind(content)
        .bind(comment_type)
        .fetch_one(executor)
        .await
        .map_err(Into::into)
    }

    /// Oldest first, as a conversation reads.
    pub async fn find_for_ticket(ticket_id: TicketId, pool: &PgPool) -> Result<Vec<Self>> {
        sqlx::query_as::<_, Self>(
            "SELECT * FROM comments WHERE ticket_id = $1 ORDER BY created_at, id",
        )
        .bind(ticket_id)
        .fetch_all(pool)
        .await
        .map_err(Into::into)
    }
}
