use anyhow::Result;
use serde::Serialize;
use sqlx::PgPool;

use crate::common::{TicketCategoryId, TicketTypeId};

/// A ticket type offered on the creation form.
#[derive(sqlx::FromRow, Debug, Clone, Serialize)]
pub struct TicketTypeConfig {
    pub id: TicketTypeId,
    pub code: String,
    pub label: String,
    pub is_active: bool,
}

/// A category, with the code of the type it belongs to.
#[derive(sqlx::FromRow, Debug, Clone, Serialize)]
pub struct TicketCategoryConfig {
    pub id: TicketCategoryId,
    pub name: String,
    pub description: Option<String>,
    pub type_code: String,
    pub is_active: bool,
}

impl TicketTypeConfig {
    pub async fn find_active(pool: &PgPool) -> Result<Vec<Self>> {
        sqlx::query_as::<_, Self>(
            "SELECT id, code, label, is_active FROM ticket_types WHERE is_active ORDER BY label",
        )
        .fetch_all(pool)
        .await
        .map_err(Into::into)
    }
}

impl TicketCategoryConfig {
    /// Active categories, optionally restricted to one type code.
    pub async fn find_active(type_code: Option<&str>, pool: &PgPool) -> Result<Vec<Self>> {
        sqlx::query_as::<_, Self>(
            r#"
            SELECT c.id, c.name, c.description, t.code AS type_code, c.is_active
            FROM ticket_categories c
            JOIN ticket_types t ON t.id = c.ticket_type_id
            WHERE c.is_active
              AND ($1::text IS NULL OR t.code = $1)
            ORDER BY c.name
            "#,
        )
        .bind(type_code)
        .fetch_all(pool)
        .await
        .map_err(Into::into)
    }
}
