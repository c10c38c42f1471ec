//! Background delivery of queued emails.
//!
//! ```text
//! OutboxRunner
//!     │
//!     ├─► claim due rows (FOR UPDATE SKIP LOCKED, leased)
//!     ├─► Mailer::send
//!     └─► mark sent | reschedule with backoff | dead-letter
//! ```

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use sqlx::PgPool;
use tracing::{debug, error, info, warn};

use super::email::{OutboxEmail, OutboxStatus};
use super::mailer::{EmailMessage, Mailer};

#[derive(Debug, Clone)]
pub struct OutboxRunnerConfig {
    /// Maximum number of emails to claim at once
    pub batch_size: i64,
    /// How long to wait when nothing is due
    pub poll_interval: Duration,
    /// How long a claimed row stays reserved for this runner
    pub lease: Duration,
    /// Sender address
    pub from: String,
}

impl Default for OutboxRunnerConfig {
    fn default() -> Self {
        Self {
            batch_size: 20,
            poll_interval: Duration::from_secs(5),
            lease: Duration::from_secs(60),
            from: "helpdesk@localhost".to_string(),
        }
    }
}

/// Counts from one pass over the outbox.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct BatchReport {
    pub sent: usize,
    pub retried: usize,
    pub dead_lettered: usize,
}

impl BatchReport {
    pub fn processed(&self) -> usize {
        self.sent + self.retried + self.dead_lettered
    }
}

pub struct OutboxRunner {
    pool: PgPool,
    mailer: Arc<dyn Mailer>,
    config: OutboxRunnerConfig,
    shutdown: Arc<AtomicBool>,
}

impl OutboxRunner {
    pub fn new(pool: PgPool, mailer: Arc<dyn Mailer>, config: OutboxRunnerConfig) -> Self {
        Self {
            pool,
            mailer,
            config,
            shutdown: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Call `store(true, Ordering::SeqCst)` on the returned handle to stop.
    pub fn shutdown_handle(&self) -> Arc<AtomicBool> {
        self.shutdown.clone()
    }

    fn is_shutdown_requested(&self) -> bool {
        self.shutdown.load(Ordering::SeqCst)
    }

    pub async fn run(self) -> Result<()> {
        info!(
            batch_size = self.config.batch_size,
            poll_interval_ms = self.config.poll_interval.as_millis() as u64,
            "outbox runner starting"
        );

        while !self.is_shutdown_requested() {
            match self.process_batch().await {
                Ok(report) if report.processed() == 0 => {
                    tokio::time::sleep(self.config.poll_interval).await;
                }
                Ok(report) => {
                    debug!(
                        sent = report.sent,
                        retried = report.retried,
                        dead_lettered = report.dead_lettered,
                        "outbox batch processed"
                    );
                }
                Err(e) => {
                    error!(error = %e, "failed to claim outbox emails");
                    tokio::time::sleep(Duration::from_secs(1)).await;
                }
            }
        }

        info!("outbox runner stopped");
        Ok(())
    }

    /// Run until Ctrl+C.
    pub async fn run_until_shutdown(self) -> Result<()> {
        let shutdown = self.shutdown_handle();

        tokio::spawn(async move {
            let _ = tokio::signal::ctrl_c().await;
            info!("received shutdown signal");
            shutdown.store(true, Ordering::SeqCst);
        });

        self.run().await
    }

    /// Claim one batch and attempt each email once.
    pub async fn process_batch(&self) -> Result<BatchReport> {
        let lease = chrono::Duration::from_std(self.config.lease)?;
        let emails = OutboxEmail::claim_batch(self.config.batch_size, lease, &self.pool).await?;
        let mut report = BatchReport::default();

        for email in emails {
            if self.is_shutdown_requested() {
                // Unsent rows are reclaimed when their lease expires.
                break;
            }

            let message = EmailMessage {
                from: self.config.from.clone(),
                to: email.recipient.clone(),
                subject: email.subject.clone(),
                body: email.body.clone(),
            };

            match self.mailer.send(&message).await {
                Ok(()) => {
                    if let Err(e) = OutboxEmail::mark_sent(email.id, &self.pool).await {
                        error!(email_id = %email.id, error = %e, "failed to mark email as sent");
                        continue;
                    }
                    report.sent += 1;
                }
                Err(send_err) => {
                    let message = send_err.to_string();
                    match email.mark_failed(&message, &self.pool).await {
                        Ok(OutboxStatus::DeadLetter) => {
                            error!(
                                email_id = %email.id,
                                attempts = email.attempts,
                                error = %message,
                                "email dead-lettered"
                            );
                            report.dead_lettered += 1;
                        }
                        Ok(_) => {
                            warn!(
                                email_id = %email.id,
                                attempts = email.attempts,
                                error = %message,
                                "email delivery failed, will retry"
                            );
                            report.retried += 1;
                        }
                        Err(e) => {
                            error!(email_id = %email.id, error = %e, "failed to record email failure");
                        }
                    }
                }
            }
        }

        Ok(report)
    }
}
