pub mod notifications;
pub mod ticket_config;
pub mod tickets;
pub mod users;
