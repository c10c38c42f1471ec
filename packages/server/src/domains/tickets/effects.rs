//! Notifications and emails produced by a ticket action.
//!
//! Actions collect their side effects here and flush them inside the same
//! transaction as the ticket update, so a rolled-back action leaves no
//! notification and no queued email behind.

use std::collections::HashSet;

use anyhow::Result;
use sqlx::PgConnection;

use super::emails::TicketEmail;
use super::models::Ticket;
use crate::domains::notifications::models::{NewNotification, Notification, NotificationType};
use crate::domains::users::models::User;
use crate::kernel::outbox::{NewOutboxEmail, OutboxEmail};

#[derive(Debug, Default)]
pub struct TicketEffects {
    notifications: Vec<NewNotification>,
    emails: Vec<NewOutboxEmail>,
    recipients: HashSet<String>,
}

impl TicketEffects {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn notify(
        &mut self,
        user: &User,
        kind: NotificationType,
        ticket: &Ticket,
        message: impl Into<String>,
    ) -> &mut Self {
        self.notifications.push(
            NewNotification::builder()
                .user_id(user.id)
                .kind(kind)
                .ticket_id(Some(ticket.id))
                .message(message)
                .build(),
        );
        self
    }

    /// Queue an email, skipping users without an address and addresses
    /// already queued by this action.
    pub fn email(&mut self, user: &User, ticket: &Ticket, email: TicketEmail<'_>) -> &mut Self {
        if !user.has_email() {
            return self;
        }
        let address = user.email.trim().to_lowercase();
        if !self.recipients.insert(address.clone()) {
            return self;
        }
        let content = email.render(ticket);
        self.emails.push(
            NewOutboxEmail::builder()
                .recipient(address)
                .subject(content.subject)
                .body(content.body)
                .ticket_id(Some(ticket.id))
                .build(),
        );
        self
    }

    pub fn notification_count(&self) -> usize {
        self.notifications.len()
    }

    pub fn email_count(&self) -> usize {
        self.emails.len()
    }

    pub async fn flush(self, conn: &mut PgConnection) -> Result<()> {
        for notification in &self.notifications {
            Notification::insert(notification, &mut *conn).await?;
        }
        for email in &self.emails {
            OutboxEmail::enqueue(email, &mut *conn).await?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::auth::Role;
    use crate::common::{RoleId, TicketId, UserId};
    use crate::domains::tickets::models::{TicketPriority, TicketStatus, TicketType};
    use chrono::Utc;

    fn user(email: &str) -> User {
        User {
            id: UserId::new(),
            full_name: "Awa Diop".to_string(),
            email: email.to_string(),
            username: format!("user-{}", UserId::new()),
            agency: None,
            phone: None,
            role_id: RoleId::new(),
            role: Role::SecretaireDsi,
            actif: true,
            specialization: None,
            max_tickets_capacity: None,
            notes: None,
            created_at: Utc::now(),
            last_login_at: None,
        }
    }

    fn ticket() -> Ticket {
        Ticket {
            id: TicketId::new(),
            number: 7,
            title: "Screen flickers".to_string(),
            description: "Since this morning".to_string(),
            ticket_type: TicketType::Materiel,
            priority: TicketPriority::Faible,
            status: TicketStatus::EnAttenteAnalyse,
            category: None,
            creator_id: UserId::new(),
            technician_id: None,
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
    fn duplicate_addresses_get_one_email() {
        let t = ticket();
        let mut effects = TicketEffects::new();
        let first = user("Agent@Example.com");
        let second = user("agent@example.com ");
        effects
            .email(&first, &t, TicketEmail::NewTicket { creator_name: "x" })
            .email(&second, &t, TicketEmail::NewTicket { creator_name: "x" });
        assert_eq!(effects.email_count(), 1);
    }

    #[test]
    fn users_without_address_are_skipped() {
        let t = ticket();
        let mut effects = TicketEffects::new();
        effects.email(&user("  "), &t, TicketEmail::Created);
        assert_eq!(effects.email_count(), 0);
    }

    #[test]
    fn notifications_are_not_deduplicated() {
        let t = ticket();
        let u = user("a@example.com");
        let mut effects = TicketEffects::new();
        effects
            .notify(&u, NotificationType::TicketCloture, &t, "closed")
            .notify(&u, NotificationType::TicketCloture, &t, "closed again");
        assert_eq!(effects.notification_count(), 2);
    }
}
