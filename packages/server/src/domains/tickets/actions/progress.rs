//! Moving a ticket through work, resolution and closure.

use std::collections::HashSet;

use chrono::Utc;
use sqlx::PgPool;
use tracing::info;

use super::transition::{active_users, find_user, load_actor, lock_ticket, record_transition};
use crate::common::auth::{Actor, Role};
use crate::common::{DomainError, DomainResult, TicketId};
use crate::domains::notifications::models::NotificationType;
use crate::domains::tickets::data::{non_blank, StatusUpdateInput, ValidateInput};
use crate::domains::tickets::effects::TicketEffects;
use crate::domains::tickets::emails::TicketEmail;
use crate::domains::tickets::machines::{decide, TicketAction};
use crate::domains::tickets::models::{Ticket, TicketStatus};

/// Roles told when a requester rejects a resolution.
const REJECTION_WATCHERS: [Role; 3] = [Role::Dsi, Role::AdjointDsi, Role::SecretaireDsi];

/// Roles told about escalations.
const ESCALATION_WATCHERS: [Role; 2] = [Role::Dsi, Role::AdjointDsi];

/// Set a ticket to en_cours, resolu or cloture.
pub async fn update_status(
    id: TicketId,
    input: StatusUpdateInput,
    actor: &Actor,
    pool: &PgPool,
) -> DomainResult<Ticket> {
    let action = match input.status {
        TicketStatus::EnCours => TicketAction::StartWork,
        TicketStatus::Resolu => TicketAction::Resolve,
        TicketStatus::Cloture => TicketAction::Close,
        other => {
            return Err(DomainError::validation(format!(
                "Status {} cannot be set directly",
                other
            )))
        }
    };

    let mut tx = pool.begin().await?;
    let mut ticket = lock_ticket(id, &mut tx).await?;
    let transition = decide(&ticket, actor, &action, Utc::now())?;

    let summary = non_blank(input.resolution_summary.as_deref());
    let reason = match action {
        TicketAction::Resolve => summary.or(non_blank(input.reason.as_deref())),
        _ => non_blank(input.reason.as_deref()),
    };
    record_transition(&mut ticket, &transition, Some(actor.id), reason, &mut tx).await?;

    let mut effects = TicketEffects::new();
    if let Some(creator) = find_user(ticket.creator_id, &mut tx).await? {
        match action {
            TicketAction::StartWork => {
                effects
                    .notify(
                        &creator,
                        NotificationType::TicketEnCours,
                        &ticket,
                        format!("Work has started on your ticket {}", ticket.label()),
                    )
                    .email(&creator, &ticket, TicketEmail::InProgress);
            }
            TicketAction::Resolve => {
                effects
                    .notify(
                        &creator,
                        NotificationType::TicketResolu,
                        &ticket,
                        format!(
                            "Your ticket {} has been resolved. Please validate the resolution",
                            ticket.label()
                        ),
                    )
                    .email(&creator, &ticket, TicketEmail::Resolved { summary });
            }
            _ => {
                effects
                    .notify(
                        &creator,
                        NotificationType::TicketCloture,
                        &ticket,
                        format!("Your ticket {} has been closed", ticket.label()),
                    )
                    .email(&creator, &ticket, TicketEmail::Closed);
            }
        }
    }
    if matches!(action, TicketAction::Close) {
        if let Some(technician_id) = ticket.technician_id.filter(|id| *id != actor.id) {
            if let Some(technician) = find_user(technician_id, &mut tx).await? {
                effects.notify(
                    &technician,
                    NotificationType::TicketCloture,
                    &ticket,
                    format!("Ticket {} has been closed", ticket.label()),
                );
            }
        }
    }
    effects.flush(&mut tx).await?;

    tx.commit().await?;
    info!(
        ticket_id = %ticket.id,
        from = %transition.from,
        to = %transition.to,
        user_id = %actor.id,
        "ticket status updated"
    );
    Ok(ticket)
}

/// The requester accepts or rejects the resolution.
pub async fn validate_ticket(
    id: TicketId,
    input: ValidateInput,
    actor: &Actor,
    pool: &PgPool,
) -> DomainResult<Ticket> {
    let mut tx = pool.begin().await?;
    let mut ticket = lock_ticket(id, &mut tx).await?;
    let rejection_reason = non_blank(input.rejection_reason.as_deref()).map(String::from);
    let transition = decide(
        &ticket,
        actor,
        &TicketAction::Validate {
            accepted: input.validated,
            rejection_reason: rejection_reason.clone(),
        },
        Utc::now(),
    )?;

    let history_reason = match &rejection_reason {
        Some(reason) if !input.validated => format!("Resolution rejected: {}", reason),
        _ => "Resolution validated by the requester".to_string(),
    };
    record_transition(
        &mut ticket,
        &transition,
        Some(actor.id),
        Some(&history_reason),
        &mut tx,
    )
    .await?;

    let creator = load_actor(actor, &mut tx).await?;
    let technician = match ticket.technician_id {
        Some(id) => find_user(id, &mut tx).await?,
        None => None,
    };

    let mut effects = TicketEffects::new();
    match (input.validated, rejection_reason.as_deref()) {
        (false, Some(reason)) => {
            if let Some(technician) = &technician {
                effects
                    .notify(
                        technician,
                        NotificationType::RejetResolution,
                        &ticket,
                        format!(
                            "{} rejected the resolution of ticket {}: {}",
                            creator.full_name,
                            ticket.label(),
                            reason
                        ),
                    )
                    .email(technician, &ticket, TicketEmail::ResolutionRejected { reason });
            }
            for watcher in active_users(&REJECTION_WATCHERS, &mut tx).await? {
                effects.notify(
                    &watcher,
                    NotificationType::TicketRejete,
                    &ticket,
                    format!(
                        "The resolution of ticket {} was rejected: {}",
                        ticket.label(),
                        reason
                    ),
                );
            }
        }
        _ => {
            effects.notify(
                &creator,
                NotificationType::TicketCloture,
                &ticket,
                format!("Your ticket {} is closed", ticket.label()),
            );
            if let Some(technician) = &technician {
                effects.notify(
                    technician,
                    NotificationType::TicketCloture,
                    &ticket,
                    format!(
                        "{} validated the resolution of ticket {}",
                        creator.full_name,
                        ticket.label()
                    ),
                );
            }
        }
    }
    effects.flush(&mut tx).await?;

    tx.commit().await?;
    info!(
        ticket_id = %ticket.id,
        accepted = input.validated,
        status = %ticket.status,
        "resolution validated by requester"
    );
    Ok(ticket)
}

/// Raise the priority one level.
pub async fn escalate_ticket(id: TicketId, actor: &Actor, pool: &PgPool) -> DomainResult<Ticket> {
    let mut tx = pool.begin().await?;
    let mut ticket = lock_ticket(id, &mut tx).await?;
    let previous = ticket.priority;
    let transition = decide(&ticket, actor, &TicketAction::Escalate, Utc::now())?;

    let reason = match transition.priority {
        Some(next) => format!("Priority raised from {} to {}", previous, next),
        None => "Priority raised".to_string(),
    };
    record_transition(&mut ticket, &transition, Some(actor.id), Some(&reason), &mut tx).await?;

    let mut recipients = active_users(&ESCALATION_WATCHERS, &mut tx).await?;
    for id in [ticket.technician_id, Some(ticket.creator_id)].into_iter().flatten() {
        if let Some(user) = find_user(id, &mut tx).await? {
            recipients.push(user);
        }
    }

    let mut seen = HashSet::from([actor.id]);
    let mut effects = TicketEffects::new();
    for user in recipients.iter().filter(|u| seen.insert(u.id)) {
        effects.notify(
            user,
            NotificationType::Escalade,
            &ticket,
            format!(
                "Ticket {} escalated to priority {}",
                ticket.label(),
                ticket.priority
            ),
        );
    }
    effects.flush(&mut tx).await?;

    tx.commit().await?;
    info!(ticket_id = %ticket.id, from = %previous, to = %ticket.priority, "ticket escalated");
    Ok(ticket)
}
