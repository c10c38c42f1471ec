//! Who works on a ticket: assignment, reassignment, the technician's answer,
//! delegation to an adjoint and reopening of rejected resolutions.

use chrono::Utc;
use sqlx::PgPool;
use tracing::info;

use super::transition::{find_user, load_assignee, lock_ticket, record_transition};
use crate::common::auth::{Actor, Role};
use crate::common::{DomainResult, TicketId};
use crate::domains::notifications::models::NotificationType;
use crate::domains::tickets::data::{non_blank, AssignInput, DelegateInput};
use crate::domains::tickets::effects::TicketEffects;
use crate::domains::tickets::emails::TicketEmail;
use crate::domains::tickets::machines::{decide, TicketAction};
use crate::domains::tickets::models::Ticket;

pub async fn assign_ticket(
    id: TicketId,
    input: AssignInput,
    actor: &Actor,
    pool: &PgPool,
) -> DomainResult<Ticket> {
    let mut tx = pool.begin().await?;
    let mut ticket = lock_ticket(id, &mut tx).await?;
    let transition = decide(
        &ticket,
        actor,
        &TicketAction::Assign {
            technician_id: input.technician_id,
        },
        Utc::now(),
    )?;
    let technician = load_assignee(input.technician_id, Role::Technicien, &mut tx).await?;

    let reason = non_blank(input.reason.as_deref())
        .map(String::from)
        .unwrap_or_else(|| format!("Assigned to {}", technician.full_name));
    record_transition(&mut ticket, &transition, Some(actor.id), Some(&reason), &mut tx).await?;

    let mut effects = TicketEffects::new();
    effects
        .notify(
            &technician,
            NotificationType::Assignation,
            &ticket,
            format!("Ticket {} has been assigned to you", ticket.label()),
        )
        .email(
            &technician,
            &ticket,
            TicketEmail::AssignedToTechnician {
                notes: input.notes.as_deref(),
            },
        );
    if let Some(creator) = find_user(ticket.creator_id, &mut tx).await? {
        effects
            .notify(
                &creator,
                NotificationType::TicketAssigne,
                &ticket,
                format!(
                    "Your ticket {} has been assigned to {}",
                    ticket.label(),
                    technician.full_name
                ),
            )
            .email(
                &creator,
                &ticket,
                TicketEmail::TechnicianAssigned {
                    technician_name: &technician.full_name,
                },
            );
    }
    effects.flush(&mut tx).await?;

    tx.commit().await?;
    info!(ticket_id = %ticket.id, technician_id = %technician.id, assigned_by = %actor.id, "ticket assigned");
    Ok(ticket)
}

pub async fn reassign_ticket(
    id: TicketId,
    input: AssignInput,
    actor: &Actor,
    pool: &PgPool,
) -> DomainResult<Ticket> {
    let mut tx = pool.begin().await?;
    let mut ticket = lock_ticket(id, &mut tx).await?;
    let previous_technician_id = ticket.technician_id;
    let transition = decide(
        &ticket,
        actor,
        &TicketAction::Reassign {
            technician_id: input.technician_id,
        },
        Utc::now(),
    )?;
    let technician = load_assignee(input.technician_id, Role::Technicien, &mut tx).await?;

    let reason = non_blank(input.reason.as_deref())
        .map(String::from)
        .unwrap_or_else(|| format!("Reassigned to {}", technician.full_name));
    record_transition(&mut ticket, &transition, Some(actor.id), Some(&reason), &mut tx).await?;

    let mut effects = TicketEffects::new();
    effects
        .notify(
            &technician,
            NotificationType::Assignation,
            &ticket,
            format!("Ticket {} has been assigned to you", ticket.label()),
        )
        .email(
            &technician,
            &ticket,
            TicketEmail::AssignedToTechnician {
                notes: input.notes.as_deref(),
            },
        );
    if let Some(previous_id) = previous_technician_id {
        if let Some(previous) = find_user(previous_id, &mut tx).await? {
            effects
                .notify(
                    &previous,
                    NotificationType::Reassignation,
                    &ticket,
                    format!("Ticket {} has been reassigned to another technician", ticket.label()),
                )
                .email(&previous, &ticket, TicketEmail::Unassigned);
        }
    }
    if let Some(creator) = find_user(ticket.creator_id, &mut tx).await? {
        effects
            .notify(
                &creator,
                NotificationType::TechnicienChange,
                &ticket,
                format!(
                    "{} now handles your ticket {}",
                    technician.full_name,
                    ticket.label()
                ),
            )
            .email(
                &creator,
                &ticket,
                TicketEmail::TechnicianChanged {
                    technician_name: &technician.full_name,
                },
            );
    }
    effects.flush(&mut tx).await?;

    tx.commit().await?;
    info!(
        ticket_id = %ticket.id,
        from = ?previous_technician_id,
        to = %technician.id,
        "ticket reassigned"
    );
    Ok(ticket)
}

/// The assigned technician confirms they take the ticket.
pub async fn accept_assignment(id: TicketId, actor: &Actor, pool: &PgPool) -> DomainResult<Ticket> {
    let mut tx = pool.begin().await?;
    let mut ticket = lock_ticket(id, &mut tx).await?;
    let transition = decide(&ticket, actor, &TicketAction::AcceptAssignment, Utc::now())?;

    record_transition(
        &mut ticket,
        &transition,
        Some(actor.id),
        Some("Assignment accepted"),
        &mut tx,
    )
    .await?;
    tx.commit().await?;

    info!(ticket_id = %ticket.id, technician_id = %actor.id, "assignment accepted");
    Ok(ticket)
}

/// The assigned technician hands the ticket back for triage.
pub async fn reject_assignment(
    id: TicketId,
    reason: Option<String>,
    actor: &Actor,
    pool: &PgPool,
) -> DomainResult<Ticket> {
    let mut tx = pool.begin().await?;
    let mut ticket = lock_ticket(id, &mut tx).await?;
    let transition = decide(&ticket, actor, &TicketAction::RejectAssignment, Utc::now())?;

    let reason = match non_blank(reason.as_deref()) {
        Some(reason) => format!("Assignment rejected: {}", reason),
        None => "Assignment rejected".to_string(),
    };
    record_transition(&mut ticket, &transition, Some(actor.id), Some(&reason), &mut tx).await?;

    let mut effects = TicketEffects::new();
    if let Some(secretary_id) = ticket.secretary_id {
        if let Some(secretary) = find_user(secretary_id, &mut tx).await? {
            let technician_name = find_user(actor.id, &mut tx)
                .await?
                .map(|u| u.full_name)
                .unwrap_or_else(|| "The technician".to_string());
            effects.notify(
                &secretary,
                NotificationType::TicketEnAttente,
                &ticket,
                format!(
                    "{} rejected the assignment of ticket {}. {}",
                    technician_name,
                    ticket.label(),
                    reason
                ),
            );
        }
    }
    effects.flush(&mut tx).await?;

    tx.commit().await?;
    info!(ticket_id = %ticket.id, technician_id = %actor.id, "assignment rejected");
    Ok(ticket)
}

/// DSI hands triage of a ticket to an adjoint.
pub async fn delegate_to_adjoint(
    id: TicketId,
    input: DelegateInput,
    actor: &Actor,
    pool: &PgPool,
) -> DomainResult<Ticket> {
    let mut tx = pool.begin().await?;
    let mut ticket = lock_ticket(id, &mut tx).await?;
    let transition = decide(
        &ticket,
        actor,
        &TicketAction::DelegateToAdjoint {
            adjoint_id: input.adjoint_id,
        },
        Utc::now(),
    )?;
    let adjoint = load_assignee(input.adjoint_id, Role::AdjointDsi, &mut tx).await?;

    let reason =
        input.history_reason(|| format!("Delegated to {} for analysis", adjoint.full_name));
    record_transition(&mut ticket, &transition, Some(actor.id), Some(&reason), &mut tx).await?;

    let mut effects = TicketEffects::new();
    effects
        .notify(
            &adjoint,
            NotificationType::TicketEnAttente,
            &ticket,
            format!("Ticket {} has been delegated to you", ticket.label()),
        )
        .email(
            &adjoint,
            &ticket,
            TicketEmail::Delegated {
                reason: &reason,
                notes: input.notes.as_deref(),
            },
        );
    effects.flush(&mut tx).await?;

    tx.commit().await?;
    info!(ticket_id = %ticket.id, adjoint_id = %adjoint.id, "ticket delegated");
    Ok(ticket)
}

/// Send a ticket whose resolution was rejected back to a technician.
pub async fn reopen_ticket(
    id: TicketId,
    input: AssignInput,
    actor: &Actor,
    pool: &PgPool,
) -> DomainResult<Ticket> {
    let mut tx = pool.begin().await?;
    let mut ticket = lock_ticket(id, &mut tx).await?;
    let transition = decide(
        &ticket,
        actor,
        &TicketAction::ReopenRejected {
            technician_id: input.technician_id,
        },
        Utc::now(),
    )?;
    let technician = load_assignee(input.technician_id, Role::Technicien, &mut tx).await?;

    let reason = non_blank(input.reason.as_deref())
        .map(String::from)
        .unwrap_or_else(|| format!("Reopened and assigned to {}", technician.full_name));
    record_transition(&mut ticket, &transition, Some(actor.id), Some(&reason), &mut tx).await?;

    let mut effects = TicketEffects::new();
    if let Some(creator) = find_user(ticket.creator_id, &mut tx).await? {
        effects
            .notify(
                &creator,
                NotificationType::TicketReouvert,
                &ticket,
                format!("Your ticket {} has been reopened", ticket.label()),
            )
            .email(&creator, &ticket, TicketEmail::Reopened);
    }
    effects
        .notify(
            &technician,
            NotificationType::Assignation,
            &ticket,
            format!("Reopened ticket {} has been assigned to you", ticket.label()),
        )
        .email(
            &technician,
            &ticket,
            TicketEmail::AssignedToTechnician {
                notes: input.notes.as_deref(),
            },
        );
    effects.flush(&mut tx).await?;

    tx.commit().await?;
    info!(ticket_id = %ticket.id, technician_id = %technician.id, "rejected ticket reopened");
    Ok(ticket)
}
