use sqlx::PgPool;
use tracing::info;

use super::transition::lock_ticket;
use crate::common::auth::Actor;
use crate::common::{DomainError, DomainResult, TicketId};
use crate::domains::tickets::data::{non_blank, FeedbackInput};
use crate::domains::tickets::models::{Ticket, TicketHistory, TicketStatus};

/// The requester rates a closed ticket. A later rating replaces the earlier one.
pub async fn submit_feedback(
    id: TicketId,
    input: FeedbackInput,
    actor: &Actor,
    pool: &PgPool,
) -> DomainResult<Ticket> {
    input.validate()?;

    let mut tx = pool.begin().await?;
    let mut ticket = lock_ticket(id, &mut tx).await?;
    if !ticket.is_creator(actor.id) {
        return Err(DomainError::forbidden(
            "Only the ticket creator can give feedback",
        ));
    }
    if ticket.status != TicketStatus::Cloture {
        return Err(DomainError::validation(
            "Feedback can only be given on a closed ticket",
        ));
    }

    ticket.feedback_score = Some(input.score);
    ticket.feedback_comment = non_blank(input.comment.as_deref()).map(String::from);
    ticket.save(&mut *tx).await?;
    TicketHistory::append(
        ticket.id,
        Some(ticket.status),
        ticket.status,
        Some(actor.id),
        Some(&format!("Feedback submitted ({}/5)", input.score)),
        &mut *tx,
    )
    .await?;

    tx.commit().await?;
    info!(ticket_id = %ticket.id, score = input.score, "feedback recorded");
    Ok(ticket)
}
