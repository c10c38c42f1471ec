use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{PgExecutor, PgPool};
use std::fmt;
use typed_builder::TypedBuilder;

use crate::common::{TicketId, UserId};

// ============================================================================
// Enums
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type, Default)]
#[sqlx(type_name = "ticket_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum TicketStatus {
    #[default]
    EnAttenteAnalyse,
    AssigneTechnicien,
    EnCours,
    Resolu,
    Rejete,
    Cloture,
}

impl TicketStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TicketStatus::EnAttenteAnalyse => "en_attente_analyse",
            TicketStatus::AssigneTechnicien => "assigne_technicien",
            TicketStatus::EnCours => "en_cours",
            TicketStatus::Resolu => "resolu",
            TicketStatus::Rejete => "rejete",
            TicketStatus::Cloture => "cloture",
        }
    }
}

impl fmt::Display for TicketStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize, sqlx::Type, Default,
)]
#[sqlx(type_name = "ticket_priority", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum TicketPriority {
    Faible,
    #[default]
    Moyenne,
    Haute,
    Critique,
}

impl TicketPriority {
    /// Next level up, `None` once critical.
    pub fn escalated(&self) -> Option<Self> {
        match self {
            TicketPriority::Faible => Some(TicketPriority::Moyenne),
            TicketPriority::Moyenne => Some(TicketPriority::Haute),
            TicketPriority::Haute => Some(TicketPriority::Critique),
            TicketPriority::Critique => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            TicketPriority::Faible => "faible",
            TicketPriority::Moyenne => "moyenne",
            TicketPriority::Haute => "haute",
            TicketPriority::Critique => "critique",
        }
    }
}

impl fmt::Display for TicketPriority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "ticket_type", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum TicketType {
    Materiel,
    Applicatif,
}

// ============================================================================
// Ticket Model
// ============================================================================

#[derive(sqlx::FromRow, Debug, Clone, Serialize, Deserialize)]
pub struct Ticket {
    pub id: TicketId,
    pub number: i64,
    pub title: String,
    pub description: String,
    #[sqlx(rename = "type")]
    #[serde(rename = "type")]
    pub ticket_type: TicketType,
    pub priority: TicketPriority,
    pub status: TicketStatus,
    pub category: Option<String>,
    pub creator_id: UserId,
    pub technician_id: Option<UserId>,
    pub secretary_id: Option<UserId>,
    pub user_agency: Option<String>,
    pub attachments: Option<serde_json::Value>,
    pub created_at: DateTime<Utc>,
    pub assigned_at: Option<DateTime<Utc>>,
    pub resolved_at: Option<DateTime<Utc>>,
    pub closed_at: Option<DateTime<Utc>>,
    pub auto_closed_at: Option<DateTime<Utc>>,
    pub feedback_score: Option<i32>,
    pub feedback_comment: Option<String>,
}

#[derive(Debug, Clone, TypedBuilder)]
#[builder(field_defaults(setter(into)))]
pub struct NewTicket {
    pub title: String,
    pub description: String,
    pub ticket_type: TicketType,
    #[builder(default)]
    pub priority: TicketPriority,
    #[builder(default)]
    pub category: Option<String>,
    pub creator_id: UserId,
    #[builder(default)]
    pub user_agency: Option<String>,
    #[builder(default)]
    pub attachments: Option<serde_json::Value>,
}

impl Ticket {
    /// Insert a new ticket; the number comes from `ticket_number_seq`.
    pub async fn create<'e>(new: &NewTicket, executor: impl PgExecutor<'e>) -> Result<Self> {
        sqlx::query_as::<_, Self>(
            r#"
            INSERT INTO tickets (id, title, description, type, priority, category,
                                 creator_id, user_agency, attachments)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            RETURNING *
            "#,
        )
        .bind(TicketId::new())
        .bind(&new.title)
        .bind(&new.description)
        .bind(new.ticket_type)
        .bind(new.priority)
        .bind(&new.category)
        .bind(new.creator_id)
        .bind(&new.user_agency)
        .bind(&new.attachments)
        .fetch_one(executor)
        .await
        .map_err(Into::into)
    }

    pub async fn find_by_id<'e>(
        id: TicketId,
        executor: impl PgExecutor<'e>,
    ) -> Result<Option<Self>> {
        sqlx::query_as::<_, Self>("SELECT * FROM tickets WHERE id = $1")
            .bind(id)
            .fetch_optional(executor)
            .await
            .map_err(Into::into)
    }

    /// Load and row-lock a ticket for the rest of the transaction.
    pub async fn find_for_update<'e>(
        id: TicketId,
        executor: impl PgExecutor<'e>,
    ) -> Result<Option<Self>> {
        sqlx::query_as::<_, Self>("SELECT * FROM tickets WHERE id = $1 FOR UPDATE")
            .bind(id)
            .fetch_optional(executor)
            .await
            .map_err(Into::into)
    }

    pub async fn find_all(pool: &PgPool) -> Result<Vec<Self>> {
        sqlx::query_as::<_, Self>("SELECT * FROM tickets ORDER BY created_at DESC, number DESC")
            .fetch_all(pool)
            .await
            .map_err(Into::into)
    }

    pub async fn find_by_creator(creator_id: UserId, pool: &PgPool) -> Result<Vec<Self>> {
        sqlx::query_as::<_, Self>(
            "SELECT * FROM tickets WHERE creator_id = $1 ORDER BY created_at DESC, number DESC",
        )
        .bind(creator_id)
        .fetch_all(pool)
        .await
        .map_err(Into::into)
    }

    pub async fn find_by_technician(technician_id: UserId, pool: &PgPool) -> Result<Vec<Self>> {
        sqlx::query_as::<_, Self>(
            "SELECT * FROM tickets WHERE technician_id = $1 ORDER BY created_at DESC, number DESC",
        )
        .bind(technician_id)
        .fetch_all(pool)
        .await
        .map_err(Into::into)
    }

    /// Ids of resolved tickets whose creator has not validated since `cutoff`.
    pub async fn find_resolved_before(
        cutoff: DateTime<Utc>,
        pool: &PgPool,
    ) -> Result<Vec<TicketId>> {
        sqlx::query_scalar::<_, TicketId>(
            r#"
            SELECT id FROM tickets
            WHERE status = 'resolu' AND resolved_at IS NOT NULL AND resolved_at <= $1
            ORDER BY resolved_at
            "#,
        )
        .bind(cutoff)
        .fetch_all(pool)
        .await
        .map_err(Into::into)
    }

    /// Persist every mutable column of this ticket.
    pub async fn save<'e>(&self, executor: impl PgExecutor<'e>) -> Result<()> {
        sqlx::query(
            r#"
            UPDATE tickets
            SET title = $2,
                description = $3,
                type = $4,
                priority = $5,
                status = $6,
                category = $7,
                technician_id = $8,
                secretary_id = $9,
                assigned_at = $10,
                resolved_at = $11,
                closed_at = $12,
                auto_closed_at = $13,
                feedback_score = $14,
                feedback_comment = $15
            WHERE id = $1
            "#,
        )
        .bind(self.id)
        .bind(&self.title)
        .bind(&self.description)
        .bind(self.ticket_type)
        .bind(self.priority)
        .bind(self.status)
        .bind(&self.category)
        .bind(self.technician_id)
        .bind(self.secretary_id)
        .bind(self.assigned_at)
        .bind(self.resolved_at)
        .bind(self.closed_at)
        .bind(self.auto_closed_at)
        .bind(self.feedback_score)
        .bind(&self.feedback_comment)
        .execute(executor)
        .await?;
        Ok(())
    }

    /// Delete a ticket. History, comments and notifications cascade.
    pub async fn delete<'e>(id: TicketId, executor: impl PgExecutor<'e>) -> Result<()> {
        sqlx::query("DELETE FROM tickets WHERE id = $1")
            .bind(id)
            .execute(executor)
            .await?;
        Ok(())
    }

    pub fn is_creator(&self, user_id: UserId) -> bool {
        self.creator_id == user_id
    }

    pub fn is_assigned_to(&self, user_id: UserId) -> bool {
        self.technician_id == Some(user_id)
    }

    /// Short human label used in notifications and emails.
    pub fn label(&self) -> String {
        format!("#{} \"{}\"", self.number, self.title)
    }
}
