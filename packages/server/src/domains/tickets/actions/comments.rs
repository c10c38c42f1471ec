use sqlx::PgPool;
use tracing::info;

use super::transition::{ensure_can_view, find_user, load_actor};
use crate::common::auth::Actor;
use crate::common::{DomainError, DomainResult, TicketId};
use crate::domains::notifications::models::NotificationType;
use crate::domains::tickets::data::{non_blank, CommentInput};
use crate::domains::tickets::effects::TicketEffects;
use crate::domains::tickets::emails::TicketEmail;
use crate::domains::tickets::models::{Comment, Ticket};

/// Comment on a ticket; the creator hears about comments left by others.
pub async fn add_comment(
    id: TicketId,
    input: CommentInput,
    actor: &Actor,
    pool: &PgPool,
) -> DomainResult<Comment> {
    let content = non_blank(Some(&input.content))
        .ok_or_else(|| DomainError::validation("Comment cannot be empty"))?
        .to_string();

    let mut tx = pool.begin().await?;
    let ticket = Ticket::find_by_id(id, &mut *tx)
        .await?
        .ok_or(DomainError::NotFound("Ticket"))?;
    ensure_can_view(&ticket, actor)?;

    let comment = Comment::create(ticket.id, actor.id, &content, input.comment_type, &mut *tx).await?;

    if !ticket.is_creator(actor.id) {
        let author = load_actor(actor, &mut tx).await?;
        if let Some(creator) = find_user(ticket.creator_id, &mut tx).await? {
            let mut effects = TicketEffects::new();
            effects
                .notify(
                    &creator,
                    NotificationType::Commentaire,
                    &ticket,
                    format!("{} commented on your ticket {}", author.full_name, ticket.label()),
                )
                .email(
                    &creator,
                    &ticket,
                    TicketEmail::CommentAdded {
                        author_name: &author.full_name,
                        content: &content,
                    },
                );
            effects.flush(&mut tx).await?;
        }
    }

    tx.commit().await?;
    info!(ticket_id = %ticket.id, comment_id = %comment.id, "comment added");
    Ok(comment)
}

pub async fn list_comments(id: TicketId, actor: &Actor, pool: &PgPool) -> DomainResult<Vec<Comment>> {
    let ticket = Ticket::find_by_id(id, pool)
        .await?
        .ok_or(DomainError::NotFound("Ticket"))?;
    ensure_can_view(&ticket, actor)?;
    Ok(Comment::find_for_ticket(ticket.id, pool).await?)
}
