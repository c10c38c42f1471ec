//! Creating, editing and deleting tickets.

use chrono::Utc;
use sqlx::PgPool;
use tracing::info;

use super::transition::{active_users, load_actor, lock_ticket, record_transition};
use crate::common::auth::{Actor, Capability, Role};
use crate::common::{DomainError, DomainResult, TicketId};
use crate::domains::notifications::models::NotificationType;
use crate::domains::tickets::data::{non_blank, CreateTicketInput, EditTicketInput};
use crate::domains::tickets::effects::TicketEffects;
use crate::domains::tickets::emails::TicketEmail;
use crate::domains::tickets::machines::{decide, TicketAction};
use crate::domains::tickets::models::{NewTicket, Ticket, TicketHistory};

/// Open a ticket. Agents hear about it, the requester gets a receipt.
pub async fn create_ticket(
    input: CreateTicketInput,
    actor: &Actor,
    pool: &PgPool,
) -> DomainResult<Ticket> {
    actor.can(Capability::CreateTickets).check()?;
    input.validate()?;

    let mut tx = pool.begin().await?;
    let creator = load_actor(actor, &mut tx).await?;

    let ticket = Ticket::create(
        &NewTicket::builder()
            .title(input.title.trim())
            .description(input.description.trim())
            .ticket_type(input.ticket_type)
            .priority(input.priority)
            .category(non_blank(input.category.as_deref()).map(String::from))
            .creator_id(creator.id)
            .user_agency(creator.agency.clone())
            .attachments(input.attachments)
            .build(),
        &mut *tx,
    )
    .await?;
    TicketHistory::append(
        ticket.id,
        None,
        ticket.status,
        Some(creator.id),
        Some("Ticket created"),
        &mut *tx,
    )
    .await?;

    let mut effects = TicketEffects::new();
    for agent in active_users(&Role::AGENTS, &mut tx).await? {
        effects
            .notify(
                &agent,
                NotificationType::NouveauTicket,
                &ticket,
                format!("New ticket {} from {}", ticket.label(), creator.full_name),
            )
            .email(
                &agent,
                &ticket,
                TicketEmail::NewTicket {
                    creator_name: &creator.full_name,
                },
            );
    }
    effects
        .notify(
            &creator,
            NotificationType::TicketCree,
            &ticket,
            format!("Your ticket {} has been created", ticket.label()),
        )
        .email(&creator, &ticket, TicketEmail::Created);
    effects.flush(&mut tx).await?;

    tx.commit().await?;
    info!(ticket_id = %ticket.id, number = ticket.number, creator_id = %creator.id, "ticket created");
    Ok(ticket)
}

/// Partial edit by the creator while nobody has picked the ticket up.
pub async fn edit_ticket(
    id: TicketId,
    input: EditTicketInput,
    actor: &Actor,
    pool: &PgPool,
) -> DomainResult<Ticket> {
    let mut tx = pool.begin().await?;
    let mut ticket = lock_ticket(id, &mut tx).await?;
    let transition = decide(&ticket, actor, &TicketAction::Edit, Utc::now())?;

    if let Some(title) = input.title {
        ticket.title = non_blank(Some(&title))
            .ok_or_else(|| DomainError::validation("Title is required"))?
            .to_string();
    }
    if let Some(description) = input.description {
        ticket.description = non_blank(Some(&description))
            .ok_or_else(|| DomainError::validation("Description is required"))?
            .to_string();
    }
    if let Some(ticket_type) = input.ticket_type {
        ticket.ticket_type = ticket_type;
    }
    if let Some(priority) = input.priority {
        ticket.priority = priority;
    }
    if let Some(category) = input.category {
        ticket.category = non_blank(Some(&category)).map(String::from);
    }

    record_transition(
        &mut ticket,
        &transition,
        Some(actor.id),
        Some("Ticket updated"),
        &mut tx,
    )
    .await?;
    tx.commit().await?;

    info!(ticket_id = %ticket.id, "ticket edited");
    Ok(ticket)
}

/// Delete a ticket the creator no longer needs. History, comments and
/// notifications go with it.
pub async fn delete_ticket(id: TicketId, actor: &Actor, pool: &PgPool) -> DomainResult<()> {
    let mut tx = pool.begin().await?;
    let ticket = lock_ticket(id, &mut tx).await?;
    decide(&ticket, actor, &TicketAction::Delete, Utc::now())?;

    Ticket::delete(ticket.id, &mut *tx).await?;
    tx.commit().await?;

    info!(ticket_id = %ticket.id, number = ticket.number, "ticket deleted");
    Ok(())
}
