use sqlx::PgPool;

use super::transition::ensure_can_view;
use crate::common::auth::{Actor, Capability};
use crate::common::{DomainError, DomainResult, TicketId};
use crate::domains::tickets::data::TicketData;
use crate::domains::tickets::models::{Ticket, TicketHistory};

pub async fn get_ticket(id: TicketId, actor: &Actor, pool: &PgPool) -> DomainResult<TicketData> {
    let ticket = Ticket::find_by_id(id, pool)
        .await?
        .ok_or(DomainError::NotFound("Ticket"))?;
    ensure_can_view(&ticket, actor)?;
    TicketData::load(ticket, pool).await
}

/// Every ticket, newest first. Agents only.
pub async fn list_tickets(actor: &Actor, pool: &PgPool) -> DomainResult<Vec<TicketData>> {
    actor.can(Capability::ViewAllTickets).check()?;
    TicketData::load_all(Ticket::find_all(pool).await?, pool).await
}

pub async fn my_tickets(actor: &Actor, pool: &PgPool) -> DomainResult<Vec<TicketData>> {
    TicketData::load_all(Ticket::find_by_creator(actor.id, pool).await?, pool).await
}

pub async fn assigned_tickets(actor: &Actor, pool: &PgPool) -> DomainResult<Vec<TicketData>> {
    TicketData::load_all(Ticket::find_by_technician(actor.id, pool).await?, pool).await
}

/// Audit trail, newest first.
pub async fn ticket_history(
    id: TicketId,
    actor: &Actor,
    pool: &PgPool,
) -> DomainResult<Vec<TicketHistory>> {
    let ticket = Ticket::find_by_id(id, pool)
        .await?
        .ok_or(DomainError::NotFound("Ticket"))?;
    ensure_can_view(&ticket, actor)?;
    Ok(TicketHistory::find_for_ticket(ticket.id, pool).await?)
}
