// Background infrastructure: email delivery and scheduled maintenance.

pub mod outbox;
pub mod scheduled_tasks;

pub use outbox::{LogMailer, Mailer, OutboxRunner, OutboxRunnerConfig};
pub use scheduled_tasks::start_scheduler;
