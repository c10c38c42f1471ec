use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::{PgExecutor, PgPool};

use crate::common::auth::Role;
use crate::common::RoleId;

/// Row of the `roles` reference table.
#[derive(sqlx::FromRow, Debug, Clone, Serialize)]
pub struct RoleRecord {
    pub id: RoleId,
    #[sqlx(try_from = "String")]
    pub name: Role,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl RoleRecord {
    pub async fn find_by_id<'e>(id: RoleId, executor: impl PgExecutor<'e>) -> Result<Option<Self>> {
        sqlx::query_as::<_, Self>("SELECT * FROM roles WHERE id = $1")
            .bind(id)
            .fetch_optional(executor)
            .await
            .map_err(Into::into)
    }

    pub async fn find_by_role<'e>(role: Role, executor: impl PgExecutor<'e>) -> Result<Option<Self>> {
        sqlx::query_as::<_, Self>("SELECT * FROM roles WHERE name = $1")
            .bind(role.name())
            .fetch_optional(executor)
            .await
            .map_err(Into::into)
    }

    pub async fn find_all(pool: &PgPool) -> Result<Vec<Self>> {
        sqlx::query_as::<_, Self>("SELECT * FROM roles ORDER BY created_at, name")
            .fetch_all(pool)
            .await
            .map_err(Into::into)
    }
}
