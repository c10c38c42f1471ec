//! Closing resolved tickets the requester never validated.

use chrono::{Duration, Utc};
use sqlx::PgPool;
use tracing::{debug, error, info};

use super::transition::{find_user, lock_ticket, record_transition};
use crate::common::{DomainResult, TicketId};
use crate::domains::notifications::models::NotificationType;
use crate::domains::tickets::effects::TicketEffects;
use crate::domains::tickets::emails::TicketEmail;
use crate::domains::tickets::machines::{decide_auto_close, REOPEN_WINDOW_DAYS};
use crate::domains::tickets::models::{Ticket, TicketStatus};

/// Close every ticket resolved more than `after_days` days ago.
///
/// Each ticket gets its own transaction, so one failure does not hold back
/// the others. Returns how many tickets were closed.
pub async fn auto_close_resolved_tickets(after_days: i64, pool: &PgPool) -> DomainResult<usize> {
    let cutoff = Utc::now() - Duration::days(after_days);
    let candidates = Ticket::find_resolved_before(cutoff, pool).await?;
    if candidates.is_empty() {
        debug!(after_days, "no resolved tickets to auto-close");
        return Ok(0);
    }

    let mut closed = 0;
    for id in candidates {
        match close_one(id, after_days, pool).await {
            Ok(true) => closed += 1,
            Ok(false) => {}
            Err(e) => error!(ticket_id = %id, error = %e, "failed to auto-close ticket"),
        }
    }

    info!(closed, after_days, "auto-close sweep finished");
    Ok(closed)
}

/// Returns false when the ticket changed since it was selected.
async fn close_one(id: TicketId, after_days: i64, pool: &PgPool) -> DomainResult<bool> {
    let now = Utc::now();
    let cutoff = now - Duration::days(after_days);

    let mut tx = pool.begin().await?;
    let mut ticket = lock_ticket(id, &mut tx).await?;
    let still_due = ticket.status == TicketStatus::Resolu
        && ticket.resolved_at.is_some_and(|resolved| resolved <= cutoff);
    if !still_due {
        debug!(ticket_id = %id, status = %ticket.status, "ticket no longer due for auto-close");
        return Ok(false);
    }

    let transition = decide_auto_close(&ticket, now)?;
    let reason = format!(
        "Closed automatically: resolution not validated within {} days",
        after_days
    );
    record_transition(&mut ticket, &transition, None, Some(&reason), &mut tx).await?;

    if let Some(creator) = find_user(ticket.creator_id, &mut tx).await? {
        let mut effects = TicketEffects::new();
        effects
            .notify(
                &creator,
                NotificationType::ClotureAutomatique,
                &ticket,
                format!(
                    "Your ticket {} was closed automatically. You can reopen it within {} days",
                    ticket.label(),
                    REOPEN_WINDOW_DAYS
                ),
            )
            .email(
                &creator,
                &ticket,
                TicketEmail::AutoClosed {
                    reopen_window_days: REOPEN_WINDOW_DAYS,
                },
            );
        effects.flush(&mut tx).await?;
    }

    tx.commit().await?;
    info!(ticket_id = %ticket.id, number = ticket.number, "ticket auto-closed");
    Ok(true)
}
