use chrono::Utc;
use sqlx::PgPool;
use tracing::info;

use super::transition::{active_users, load_actor, lock_ticket, record_transition};
use crate::common::auth::{Actor, Role};
use crate::common::{DomainResult, TicketId};
use crate::domains::notifications::models::NotificationType;
use crate::domains::tickets::effects::TicketEffects;
use crate::domains::tickets::emails::TicketEmail;
use crate::domains::tickets::machines::{decide, TicketAction};
use crate::domains::tickets::models::Ticket;

/// The requester reopens a ticket that was closed automatically, within the
/// reopen window. The ticket goes back to triage unassigned.
pub async fn reopen_by_user(id: TicketId, actor: &Actor, pool: &PgPool) -> DomainResult<Ticket> {
    let mut tx = pool.begin().await?;
    let mut ticket = lock_ticket(id, &mut tx).await?;
    let transition = decide(&ticket, actor, &TicketAction::ReopenAutoClosed, Utc::now())?;

    record_transition(
        &mut ticket,
        &transition,
        Some(actor.id),
        Some("Reopened by the requester after automatic closure"),
        &mut tx,
    )
    .await?;

    let creator = load_actor(actor, &mut tx).await?;
    let mut effects = TicketEffects::new();
    effects
        .notify(
            &creator,
            NotificationType::TicketReouvert,
            &ticket,
            format!("Your ticket {} has been reopened", ticket.label()),
        )
        .email(&creator, &ticket, TicketEmail::Reopened);
    for agent in active_users(&Role::AGENTS, &mut tx).await? {
        effects.notify(
            &agent,
            NotificationType::NouveauTicket,
            &ticket,
            format!(
                "Ticket {} was reopened by {} and needs triage",
                ticket.label(),
                creator.full_name
            ),
        );
    }
    effects.flush(&mut tx).await?;

    tx.commit().await?;
    info!(ticket_id = %ticket.id, creator_id = %creator.id, "auto-closed ticket reopened");
    Ok(ticket)
}
