//! Typed ids for every persisted entity.

pub use super::id::{Id, V4, V7};

// ============================================================================
// Entity marker types
// ============================================================================

/// Marker for helpdesk users (requesters, agents and technicians).
pub struct User;

/// Marker for rows of the `roles` reference table.
pub struct RoleEntry;

pub struct Ticket;

/// Marker for append-only ticket history rows.
pub struct TicketHistoryEntry;

pub struct Comment;

pub struct Notification;

/// Marker for queued outbound emails.
pub struct OutboxEmail;

/// Marker for rows of the `ticket_types` configuration table.
pub struct TicketTypeEntry;

pub struct TicketCategoryEntry;

// ============================================================================
// Id aliases
// ============================================================================

pub type UserId = Id<User>;
pub type RoleId = Id<RoleEntry>;
pub type TicketId = Id<Ticket>;
pub type TicketHistoryId = Id<TicketHistoryEntry>;
pub type CommentId = Id<Comment>;
pub type NotificationId = Id<Notification>;
pub type OutboxEmailId = Id<OutboxEmail>;
pub type TicketTypeId = Id<TicketTypeEntry>;
pub type TicketCategoryId = Id<TicketCategoryEntry>;
