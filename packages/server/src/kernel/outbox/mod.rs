//! Transactional email outbox.
//!
//! Domain actions enqueue `NewOutboxEmail` rows inside their own
//! transaction; `OutboxRunner` delivers them afterwards through a `Mailer`.

pub mod email;
pub mod mailer;
pub mod runner;

pub use email::{retry_delay, NewOutboxEmail, OutboxBacklog, OutboxEmail, OutboxStatus};
pub use mailer::{EmailMessage, LogMailer, Mailer};
pub use runner::{BatchReport, OutboxRunner, OutboxRunnerConfig};
