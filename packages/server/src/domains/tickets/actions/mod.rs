//! Tickets domain actions - entry points called by the HTTP routes and the
//! scheduler.
//!
//! Every mutating action runs in one transaction: lock the ticket, decide the
//! transition, persist it with its history row, queue notifications and
//! emails, commit.

pub mod assignment;
pub mod auto_close;
pub mod comments;
pub mod feedback;
pub mod lifecycle;
pub mod progress;
pub mod queries;
pub mod reopen;
mod transition;

pub use assignment::*;
pub use auto_close::auto_close_resolved_tickets;
pub use comments::*;
pub use feedback::submit_feedback;
pub use lifecycle::*;
pub use progress::*;
pub use queries::*;
pub use reopen::reopen_by_user;
