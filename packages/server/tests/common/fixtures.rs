//! Test fixtures for creating test data.
//!
//! Users are created through the model layer; tickets are driven through the
//! real actions so every fixture ticket carries its history and side effects.

use anyhow::{Context, Result};
use chrono::{Duration, Utc};
use helpdesk_core::common::auth::Role;
use helpdesk_core::common::{TicketId, UserId};
use helpdesk_core::domains::notifications::models::{Notification, NotificationType};
use helpdesk_core::domains::tickets::actions;
use helpdesk_core::domains::tickets::data::{AssignInput, CreateTicketInput, StatusUpdateInput};
use helpdesk_core::domains::tickets::models::{Ticket, TicketPriority, TicketStatus, TicketType};
use helpdesk_core::domains::users::models::{NewUser, RoleRecord, User};
use sqlx::PgPool;
use uuid::Uuid;

/// Create an active user holding `role`, with a unique email and username.
pub async fn create_user(pool: &PgPool, role: Role) -> Result<User> {
    create_user_named(pool, role, &format!("{} test", role)).await
}

pub async fn create_user_named(pool: &PgPool, role: Role, full_name: &str) -> Result<User> {
    let role_record = RoleRecord::find_by_role(role, pool)
        .await?
        .context("role is seeded by migrations")?;
    let suffix = Uuid::new_v4().simple().to_string();

    let user = User::create(
        &NewUser::builder()
            .full_name(full_name)
            .email(format!("{}@helpdesk.test", suffix))
            .username(format!("user_{}", suffix))
            .role_id(role_record.id)
            .agency(Some("Siège".to_string()))
            .build(),
        pool,
    )
    .await?;
    Ok(user)
}

pub async fn deactivate_user(pool: &PgPool, id: UserId) -> Result<()> {
    sqlx::query("UPDATE users SET actif = FALSE WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await?;
    Ok(())
}

/// The people involved in a typical ticket.
pub struct Cast {
    pub requester: User,
    pub secretary: User,
    pub technician: User,
}

impl Cast {
    pub async fn new(pool: &PgPool) -> Result<Self> {
        Ok(Self {
            requester: create_user(pool, Role::Utilisateur).await?,
            secretary: create_user(pool, Role::SecretaireDsi).await?,
            technician: create_user(pool, Role::Technicien).await?,
        })
    }
}

pub fn ticket_input(title: &str) -> CreateTicketInput {
    CreateTicketInput {
        title: title.to_string(),
        description: "L'imprimante du deuxième étage ne répond plus".to_string(),
        ticket_type: TicketType::Materiel,
        priority: TicketPriority::Moyenne,
        category: Some("Imprimante".to_string()),
        attachments: None,
    }
}

pub async fn open_ticket(pool: &PgPool, creator: &User) -> Result<Ticket> {
    Ok(actions::create_ticket(ticket_input("Imprimante en panne"), &creator.actor(), pool).await?)
}

pub fn assign_input(technician_id: UserId) -> AssignInput {
    AssignInput {
        technician_id,
        reason: None,
        notes: None,
    }
}

pub fn status_input(status: TicketStatus) -> StatusUpdateInput {
    StatusUpdateInput {
        status,
        reason: None,
        resolution_summary: None,
    }
}

/// Open, assign and start a ticket.
pub async fn ticket_in_progress(pool: &PgPool, cast: &Cast) -> Result<Ticket> {
    let ticket = open_ticket(pool, &cast.requester).await?;
    actions::assign_ticket(
        ticket.id,
        assign_input(cast.technician.id),
        &cast.secretary.actor(),
        pool,
    )
    .await?;
    Ok(actions::update_status(
        ticket.id,
        status_input(TicketStatus::EnCours),
        &cast.technician.actor(),
        pool,
    )
    .await?)
}

/// A ticket the technician has resolved and the requester has not validated.
pub async fn resolved_ticket(pool: &PgPool, cast: &Cast) -> Result<Ticket> {
    let ticket = ticket_in_progress(pool, cast).await?;
    Ok(actions::update_status(
        ticket.id,
        StatusUpdateInput {
            status: TicketStatus::Resolu,
            reason: None,
            resolution_summary: Some("Pilote réinstallé".to_string()),
        },
        &cast.technician.actor(),
        pool,
    )
    .await?)
}

/// Move `resolved_at` into the past.
pub async fn backdate_resolution(pool: &PgPool, id: TicketId, days: i64) -> Result<()> {
    sqlx::query("UPDATE tickets SET resolved_at = $2 WHERE id = $1")
        .bind(id)
        .bind(Utc::now() - Duration::days(days))
        .execute(pool)
        .await?;
    Ok(())
}

/// Move `auto_closed_at` into the past.
pub async fn backdate_auto_close(pool: &PgPool, id: TicketId, days: i64) -> Result<()> {
    sqlx::query("UPDATE tickets SET auto_closed_at = $2 WHERE id = $1")
        .bind(id)
        .bind(Utc::now() - Duration::days(days))
        .execute(pool)
        .await?;
    Ok(())
}

pub async fn reload(pool: &PgPool, id: TicketId) -> Result<Ticket> {
    Ticket::find_by_id(id, pool)
        .await?
        .context("ticket should exist")
}

/// Notifications of `kind` that `user` received about `ticket`.
pub async fn notifications_of(
    pool: &PgPool,
    user: &User,
    ticket: TicketId,
    kind: NotificationType,
) -> Result<Vec<Notification>> {
    Ok(Notification::find_for_user(user.id, pool)
        .await?
        .into_iter()
        .filter(|n| n.ticket_id == Some(ticket) && n.kind == kind)
        .collect())
}

pub async fn history_count(pool: &PgPool, id: TicketId) -> Result<i64> {
    let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM ticket_history WHERE ticket_id = $1")
        .bind(id)
        .fetch_one(pool)
        .await?;
    Ok(count)
}
