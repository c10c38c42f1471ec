use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{PgExecutor, PgPool};
use typed_builder::TypedBuilder;

use crate::common::auth::{Actor, Role};
use crate::common::{RoleId, UserId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "specialization", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum Specialization {
    Materiel,
    Applicatif,
}

/// A helpdesk account.
///
/// Credentials live with the identity service; `username` is the login it
/// knows the user by. The role name is joined in from `roles`.
#[derive(sqlx::FromRow, Debug, Clone, Serialize)]
pub struct User {
    pub id: UserId,
    pub full_name: String,
    pub email: String,
    pub username: String,
    pub agency: Option<String>,
    pub phone: Option<String>,
    pub role_id: RoleId,
    #[sqlx(rename = "role_name", try_from = "String")]
    pub role: Role,
    pub actif: bool,
    pub specialization: Option<Specialization>,
    pub max_tickets_capacity: Option<i32>,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub last_login_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, TypedBuilder)]
#[builder(field_defaults(setter(into)))]
pub struct NewUser {
    pub full_name: String,
    pub email: String,
    pub username: String,
    pub role_id: RoleId,
    #[builder(default)]
    pub agency: Option<String>,
    #[builder(default)]
    pub phone: Option<String>,
    #[builder(default)]
    pub specialization: Option<Specialization>,
    #[builder(default)]
    pub max_tickets_capacity: Option<i32>,
    #[builder(default)]
    pub notes: Option<String>,
}

const SELECT_USER: &str = r#"
    SELECT u.*, r.name AS role_name
    FROM users u
    JOIN roles r ON r.id = u.role_id
"#;

impl User {
    pub fn actor(&self) -> Actor {
        Actor::new(self.id, self.role)
    }

    pub async fn create<'e>(new: &NewUser, executor: impl PgExecutor<'e>) -> Result<Self> {
        sqlx::query_as::<_, Self>(
            r#"
            WITH inserted AS (
                INSERT INTO users (id, full_name, email, username, role_id, agency, phone,
                                   specialization, max_tickets_capacity, notes)
                VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
                RETURNING *
            )
            SELECT inserted.*, r.name AS role_name
            FROM inserted
            JOIN roles r ON r.id = inserted.role_id
            "#,
        )
        .bind(UserId::new())
        .bind(&new.full_name)
        .bind(&new.email)
        .bind(&new.username)
        .bind(new.role_id)
        .bind(&new.agency)
        .bind(&new.phone)
        .bind(new.specialization)
        .bind(new.max_tickets_capacity)
        .bind(&new.notes)
        .fetch_one(executor)
        .await
        .map_err(Into::into)
    }

    pub async fn find_by_id<'e>(id: UserId, executor: impl PgExecutor<'e>) -> Result<Option<Self>> {
        sqlx::query_as::<_, Self>(&format!("{} WHERE u.id = $1", SELECT_USER))
            .bind(id)
            .fetch_optional(executor)
            .await
            .map_err(Into::into)
    }

    pub async fn find_by_ids(ids: &[UserId], pool: &PgPool) -> Result<Vec<Self>> {
        sqlx::query_as::<_, Self>(&format!("{} WHERE u.id = ANY($1)", SELECT_USER))
            .bind(ids)
            .fetch_all(pool)
            .await
            .map_err(Into::into)
    }

    pub async fn find_all(pool: &PgPool) -> Result<Vec<Self>> {
        sqlx::query_as::<_, Self>(&format!("{} ORDER BY u.full_name, u.id", SELECT_USER))
            .fetch_all(pool)
            .await
            .map_err(Into::into)
    }

    /// Active users holding any of `roles`.
    pub async fn find_active_by_roles<'e>(
        roles: &[Role],
        executor: impl PgExecutor<'e>,
    ) -> Result<Vec<Self>> {
        let names: Vec<&str> = roles.iter().map(Role::name).collect();
        sqlx::query_as::<_, Self>(&format!(
            "{} WHERE u.actif AND r.name = ANY($1) ORDER BY u.full_name, u.id",
            SELECT_USER
        ))
        .bind(names)
        .fetch_all(executor)
        .await
        .map_err(Into::into)
    }

    pub async fn email_taken(email: &str, except: Option<UserId>, pool: &PgPool) -> Result<bool> {
        sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM users WHERE lower(email) = lower($1) AND ($2::uuid IS NULL OR id <> $2))",
        )
        .bind(email)
        .bind(except)
        .fetch_one(pool)
        .await
        .map_err(Into::into)
    }

    pub async fn username_taken(username: &str, pool: &PgPool) -> Result<bool> {
        sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM users WHERE username = $1)")
            .bind(username)
            .fetch_one(pool)
            .await
            .map_err(Into::into)
    }

    /// Whether any ticket, history row or comment references the user.
    pub async fn has_tickets(id: UserId, pool: &PgPool) -> Result<bool> {
        sqlx::query_scalar::<_, bool>(
            r#"
            SELECT EXISTS(
                SELECT 1 FROM tickets
                WHERE creator_id = $1 OR technician_id = $1 OR secretary_id = $1
            )
            OR EXISTS(SELECT 1 FROM ticket_history WHERE user_id = $1)
            OR EXISTS(SELECT 1 FROM comments WHERE user_id = $1)
            "#,
        )
        .bind(id)
        .fetch_one(pool)
        .await
        .map_err(Into::into)
    }

    /// Persist profile fields (everything but id, username and timestamps).
    pub async fn save(&self, pool: &PgPool) -> Result<()> {
        sqlx::query(
            r#"
            UPDATE users
            SET full_name = $2,
                email = $3,
                agency = $4,
                phone = $5,
                role_id = $6,
                actif = $7,
                specialization = $8,
                max_tickets_capacity = $9,
                notes = $10
            WHERE id = $1
            "#,
        )
        .bind(self.id)
        .bind(&self.full_name)
        .bind(&self.email)
        .bind(&self.agency)
        .bind(&self.phone)
        .bind(self.role_id)
        .bind(self.actif)
        .bind(self.specialization)
        .bind(self.max_tickets_capacity)
        .bind(&self.notes)
        .execute(pool)
        .await?;
        Ok(())
    }

    pub async fn deactivate(id: UserId, pool: &PgPool) -> Result<()> {
        sqlx::query("UPDATE users SET actif = FALSE WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(())
    }

    pub async fn delete(id: UserId, pool: &PgPool) -> Result<()> {
        sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(())
    }

    /// True when the address can receive mail.
    pub fn has_email(&self) -> bool {
        !self.email.trim().is_empty()
    }
}
