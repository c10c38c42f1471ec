//! Reference data for the ticket creation form.

pub mod actions;
pub mod models;

pub use models::{TicketCategoryConfig, TicketTypeConfig};
