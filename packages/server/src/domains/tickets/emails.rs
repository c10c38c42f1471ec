//! Email bodies sent on ticket events.

use super::models::Ticket;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmailContent {
    pub subject: String,
    pub body: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TicketEmail<'a> {
    /// To agents when a ticket is opened
    NewTicket { creator_name: &'a str },
    /// Receipt to the requester
    Created,
    AssignedToTechnician { notes: Option<&'a str> },
    TechnicianAssigned { technician_name: &'a str },
    /// To the technician who lost the ticket
    Unassigned,
    TechnicianChanged { technician_name: &'a str },
    InProgress,
    Resolved { summary: Option<&'a str> },
    Closed,
    ResolutionRejected { reason: &'a str },
    Delegated { reason: &'a str, notes: Option<&'a str> },
    Reopened,
    CommentAdded { author_name: &'a str, content: &'a str },
    AutoClosed { reopen_window_days: i64 },
}

impl TicketEmail<'_> {
    pub fn render(&self, ticket: &Ticket) -> EmailContent {
        let label = ticket.label();
        let (subject, lead) = match self {
            TicketEmail::NewTicket { creator_name } => (
                format!("New ticket {}", label),
                format!("{} opened ticket {}. It is waiting for analysis.", creator_name, label),
            ),
            TicketEmail::Created => (
                format!("Ticket {} received", label),
                format!(
                    "Your ticket {} has been recorded. You will be notified as it progresses.",
                    label
                ),
            ),
            TicketEmail::AssignedToTechnician { notes } => (
                format!("Ticket {} assigned to you", label),
                match notes {
                    Some(notes) if !notes.trim().is_empty() => {
                        format!("Ticket {} is now assigned to you.\n\nInstructions: {}", label, notes)
                    }
                    _ => format!("Ticket {} is now assigned to you.", label),
                },
            ),
            TicketEmail::TechnicianAssigned { technician_name } => (
                format!("Ticket {} assigned", label),
                format!("{} will handle your ticket {}.", technician_name, label),
            ),
            TicketEmail::Unassigned => (
                format!("Ticket {} reassigned", label),
                format!("Ticket {} has been reassigned to another technician.", label),
            ),
            TicketEmail::TechnicianChanged { technician_name } => (
                format!("Ticket {}: technician changed", label),
                format!("{} now handles your ticket {}.", technician_name, label),
            ),
            TicketEmail::InProgress => (
                format!("Ticket {} in progress", label),
                format!("A technician has started working on your ticket {}.", label),
            ),
            TicketEmail::Resolved { summary } => (
                format!("Ticket {} resolved", label),
                match summary {
                    Some(summary) if !summary.trim().is_empty() => format!(
                        "Your ticket {} has been resolved.\n\nResolution: {}\n\nPlease confirm the fix or reject it with a reason.",
                        label, summary
                    ),
                    _ => format!(
                        "Your ticket {} has been resolved. Please confirm the fix or reject it with a reason.",
                        label
                    ),
                },
            ),
            TicketEmail::Closed => (
                format!("Ticket {} closed", label),
                format!(
                    "Your ticket {} is closed. You can rate the service from the ticket page.",
                    label
                ),
            ),
            TicketEmail::ResolutionRejected { reason } => (
                format!("Resolution of ticket {} rejected", label),
                format!("The requester rejected the resolution of {}.\n\nReason: {}", label, reason),
            ),
            TicketEmail::Delegated { reason, notes } => (
                format!("Ticket {} delegated to you", label),
                match notes {
                    Some(notes) if !notes.trim().is_empty() => format!(
                        "Ticket {} has been delegated to you for analysis.\n\n{}\n\nNotes: {}",
                        label, reason, notes
                    ),
                    _ => format!("Ticket {} has been delegated to you for analysis.\n\n{}", label, reason),
                },
            ),
            TicketEmail::Reopened => (
                format!("Ticket {} reopened", label),
                format!("Your ticket {} has been reopened.", label),
            ),
            TicketEmail::CommentAdded {
                author_name,
                content,
            } => (
                format!("New comment on ticket {}", label),
                format!("{} commented on {}:\n\n{}", author_name, label, content),
            ),
            TicketEmail::AutoClosed { reopen_window_days } => (
                format!("Ticket {} closed automatically", label),
                format!(
                    "Your ticket {} was closed automatically because its resolution was not validated. \
                     You can reopen it within {} days.",
                    label, reopen_window_days
                ),
            ),
        };

        EmailContent {
            subject: format!("[Helpdesk] {}", subject),
            body: format!("Hello,\n\n{}\n\nThe IT service desk", lead),
        }
    }
}
