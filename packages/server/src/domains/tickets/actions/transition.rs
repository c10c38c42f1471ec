//! Steps shared by every ticket-mutating action.
//!
//! All of them run on the caller's transaction connection.

use sqlx::PgConnection;

use crate::common::auth::{Actor, Capability, Role};
use crate::common::{DomainError, DomainResult, TicketId, UserId};
use crate::domains::tickets::machines::Transition;
use crate::domains::tickets::models::{Ticket, TicketHistory};
use crate::domains::users::models::User;

/// Load the ticket and hold its row lock until commit.
pub(crate) async fn lock_ticket(id: TicketId, conn: &mut PgConnection) -> DomainResult<Ticket> {
    Ticket::find_for_update(id, &mut *conn)
        .await?
        .ok_or(DomainError::NotFound("Ticket"))
}

/// Apply `transition`, persist the ticket and append its history row.
pub(crate) async fn record_transition(
    ticket: &mut Ticket,
    transition: &Transition,
    user_id: Option<UserId>,
    reason: Option<&str>,
    conn: &mut PgConnection,
) -> DomainResult<()> {
    ticket.apply(transition);
    ticket.save(&mut *conn).await?;
    TicketHistory::append(
        ticket.id,
        Some(transition.from),
        transition.to,
        user_id,
        reason,
        &mut *conn,
    )
    .await?;
    Ok(())
}

pub(crate) async fn find_user(id: UserId, conn: &mut PgConnection) -> DomainResult<Option<User>> {
    Ok(User::find_by_id(id, &mut *conn).await?)
}

/// The acting user's own record.
pub(crate) async fn load_actor(actor: &Actor, conn: &mut PgConnection) -> DomainResult<User> {
    find_user(actor.id, conn)
        .await?
        .ok_or(DomainError::NotFound("User"))
}

/// A user who can receive work in `role`: must exist, hold the role and be active.
///
/// An adjoint of the wrong role is reported as missing; a technician of the
/// wrong role is a bad request.
pub(crate) async fn load_assignee(
    id: UserId,
    role: Role,
    conn: &mut PgConnection,
) -> DomainResult<User> {
    let user = find_user(id, conn).await?;
    let user = match (user, role) {
        (Some(user), _) if user.role == role => user,
        (_, Role::AdjointDsi) => return Err(DomainError::NotFound("Adjoint")),
        (None, _) => return Err(DomainError::NotFound("Technician")),
        (Some(user), _) => {
            return Err(DomainError::validation(format!(
                "{} is not a technician",
                user.full_name
            )))
        }
    };
    if !user.actif {
        return Err(DomainError::validation(format!(
            "{}'s account is disabled",
            user.full_name
        )));
    }
    Ok(user)
}

pub(crate) async fn active_users(roles: &[Role], conn: &mut PgConnection) -> DomainResult<Vec<User>> {
    Ok(User::find_active_by_roles(roles, &mut *conn).await?)
}

/// Creator, assigned technician and agents may see a ticket.
pub(crate) fn ensure_can_view(ticket: &Ticket, actor: &Actor) -> DomainResult<()> {
    if ticket.is_creator(actor.id)
        || ticket.is_assigned_to(actor.id)
        || actor.can(Capability::ViewAllTickets).allowed()
    {
        Ok(())
    } else {
        Err(DomainError::forbidden("Access denied"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domains::tickets::models::{TicketPriority, TicketStatus, TicketType};
    use chrono::Utc;

    fn ticket(creator: UserId, technician: Option<UserId>) -> Ticket {
        Ticket {
            id: TicketId::new(),
            number: 3,
            title: "Mail".to_string(),
            description: "Outlook crashes".to_string(),
            ticket_type: TicketType::Applicatif,
            priority: TicketPriority::Moyenne,
            status: TicketStatus::EnCours,
            category: None,
            creator_id: creator,
            technician_id: technician,
            secretary_id: None,
            user_agency: None,
            attachments: None,
            created_at: Utc::now(),
            assigned_at: None,
            resolved_at: None,
            closed_at: None,
            auto_closed_at: None,
            feedback_score: None,
            feedback_comment: None,
        }
    }

    #[test]
    fn view_access() {
        let creator = Actor::new(UserId::new(), Role::Utilisateur);
        let technician = Actor::new(UserId::new(), Role::Technicien);
        let t = ticket(creator.id, Some(technician.id));

        assert!(ensure_can_view(&t, &creator).is_ok());
        assert!(ensure_can_view(&t, &technician).is_ok());
        assert!(ensure_can_view(&t, &Actor::new(UserId::new(), Role::SecretaireDsi)).is_ok());
        assert!(ensure_can_view(&t, &Actor::new(UserId::new(), Role::Utilisateur)).is_err());
        assert!(ensure_can_view(&t, &Actor::new(UserId::new(), Role::Technicien)).is_err());
    }
}
