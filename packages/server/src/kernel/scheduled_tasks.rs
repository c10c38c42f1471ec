//! Scheduled background tasks using tokio-cron-scheduler.
//!
//! ```text
//! Scheduler (AUTO_CLOSE_CRON, hourly by default)
//!     │
//!     └─► auto_close_resolved_tickets(after_days)
//!             └─► For each stale resolved ticket → close, history, notify, queue email
//! ```

use anyhow::Result;
use sqlx::PgPool;
use tokio_cron_scheduler::{Job, JobScheduler};

use crate::domains::tickets::actions::auto_close_resolved_tickets;

/// Start all scheduled tasks
pub async fn start_scheduler(pool: PgPool, auto_close_after_days: i64, cron: &str) -> Result<JobScheduler> {
    let scheduler = JobScheduler::new().await?;

    let auto_close_pool = pool.clone();
    let auto_close_job = Job::new_async(cron, move |_uuid, _lock| {
        let pool = auto_close_pool.clone();
        Box::pin(async move {
            if let Err(e) = run_auto_close(&pool, auto_close_after_days).await {
                tracing::error!("Auto-close task failed: {}", e);
            }
        })
    })?;

    scheduler.add(auto_close_job).await?;
    scheduler.start().await?;

    tracing::info!(
        cron,
        after_days = auto_close_after_days,
        "Scheduled tasks started (auto-close of unvalidated resolutions)"
    );
    Ok(scheduler)
}

async fn run_auto_close(pool: &PgPool, after_days: i64) -> Result<()> {
    tracing::info!("Running auto-close task");
    let closed = auto_close_resolved_tickets(after_days, pool).await?;
    if closed > 0 {
        tracing::info!("Auto-close complete: closed {} tickets", closed);
    }
    Ok(())
}
