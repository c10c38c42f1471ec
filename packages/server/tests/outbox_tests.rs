//! Email outbox delivery: success, retry with backoff, dead-lettering.
//!
//! Runners in this binary may claim each other's rows, so every test uses the
//! same mailer behavior (addresses starting with `bounce-` always fail) and
//! waits for the state it expects instead of counting batch results.

mod common;

use std::sync::Arc;
use std::time::Duration;

use anyhow::{bail, Result};
use async_trait::async_trait;
use chrono::Utc;
use helpdesk_core::common::OutboxEmailId;
use helpdesk_core::kernel::outbox::{
    EmailMessage, Mailer, NewOutboxEmail, OutboxEmail, OutboxRunner, OutboxRunnerConfig,
    OutboxStatus,
};
use sqlx::PgPool;
use test_context::test_context;
use uuid::Uuid;

use crate::common::TestHarness;

struct BouncingMailer;

#[async_trait]
impl Mailer for BouncingMailer {
    async fn send(&self, message: &EmailMessage) -> Result<()> {
        if message.to.starts_with("bounce-") {
            bail!("550 mailbox unavailable");
        }
        Ok(())
    }
}

fn runner(pool: &PgPool) -> OutboxRunner {
    OutboxRunner::new(
        pool.clone(),
        Arc::new(BouncingMailer),
        OutboxRunnerConfig {
            batch_size: 500,
            poll_interval: Duration::from_millis(50),
            lease: Duration::from_secs(60),
            from: "helpdesk@test".to_string(),
        },
    )
}

async fn enqueue(pool: &PgPool, recipient: String) -> OutboxEmailId {
    OutboxEmail::enqueue(
        &NewOutboxEmail::builder()
            .recipient(recipient)
            .subject("[Helpdesk] Test")
            .body("Hello")
            .build(),
        pool,
    )
    .await
    .unwrap()
}

/// Run batches until `done` holds for the row, or give up.
async fn process_until(
    pool: &PgPool,
    id: OutboxEmailId,
    done: impl Fn(&OutboxEmail) -> bool,
) -> OutboxEmail {
    let runner = runner(pool);
    for _ in 0..50 {
        runner.process_batch().await.unwrap();
        let email = OutboxEmail::find_by_id(id, pool).await.unwrap().unwrap();
        if done(&email) {
            return email;
        }
        tokio::time::sleep(Duration::from_millis(50)).await;
    }
    panic!("outbox row {} never reached the expected state", id);
}

async fn make_due(pool: &PgPool, id: OutboxEmailId) {
    sqlx::query("UPDATE email_outbox SET next_attempt_at = NOW() WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await
        .unwrap();
}

#[test_context(TestHarness)]
#[tokio::test]
async fn delivered_emails_are_marked_sent(ctx: &TestHarness) {
    let pool = &ctx.db_pool;
    let id = enqueue(pool, format!("{}@helpdesk.test", Uuid::new_v4())).await;

    let email = process_until(pool, id, |e| e.status == OutboxStatus::Sent).await;

    assert_eq!(email.attempts, 1);
    assert!(email.sent_at.is_some());
    assert!(email.last_error.is_none());
    assert!(email.lease_expires_at.is_none());
}

#[test_context(TestHarness)]
#[tokio::test]
async fn failures_back_off_then_dead_letter(ctx: &TestHarness) {
    let pool = &ctx.db_pool;
    let id = enqueue(pool, format!("bounce-{}@helpdesk.test", Uuid::new_v4())).await;
    sqlx::query("UPDATE email_outbox SET max_attempts = 2 WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await
        .unwrap();

    let before = Utc::now();
    let email = process_until(pool, id, |e| e.attempts >= 1 && e.status == OutboxStatus::Pending).await;
    assert_eq!(email.attempts, 1);
    assert_eq!(email.last_error.as_deref(), Some("550 mailbox unavailable"));
    assert!(email.next_attempt_at > before);

    // Not due yet: another pass leaves it alone
    runner(pool).process_batch().await.unwrap();
    let untouched = OutboxEmail::find_by_id(id, pool).await.unwrap().unwrap();
    assert_eq!(untouched.attempts, 1);

    make_due(pool, id).await;
    let email = process_until(pool, id, |e| e.status == OutboxStatus::DeadLetter).await;
    assert_eq!(email.attempts, 2);
    assert!(email.sent_at.is_none());

    // Dead letters are never claimed again
    runner(pool).process_batch().await.unwrap();
    let still_dead = OutboxEmail::find_by_id(id, pool).await.unwrap().unwrap();
    assert_eq!(still_dead.status, OutboxStatus::DeadLetter);
    assert_eq!(still_dead.attempts, 2);

    let backlog = OutboxEmail::backlog(pool).await.unwrap();
    assert!(backlog.dead_letter >= 1);
}

#[test_context(TestHarness)]
#[tokio::test]
async fn expired_leases_are_reclaimed(ctx: &TestHarness) {
    let pool = &ctx.db_pool;
    let id = enqueue(pool, format!("{}@helpdesk.test", Uuid::new_v4())).await;

    // A runner that died mid-send
    sqlx::query(
        "UPDATE email_outbox SET status = 'sending', attempts = 1, lease_expires_at = NOW() - INTERVAL '1 minute' WHERE id = $1",
    )
    .bind(id)
    .execute(pool)
    .await
    .unwrap();

    let email = process_until(pool, id, |e| e.status == OutboxStatus::Sent).await;
    assert_eq!(email.attempts, 2);
}

#[test_context(TestHarness)]
#[tokio::test]
async fn rolled_back_emails_are_never_queued(ctx: &TestHarness) {
    let pool = &ctx.db_pool;

    let mut tx = pool.begin().await.unwrap();
    let id = OutboxEmail::enqueue(
        &NewOutboxEmail::builder()
            .recipient("ghost@helpdesk.test")
            .subject("[Helpdesk] Never")
            .body("Hello")
            .build(),
        &mut *tx,
    )
    .await
    .unwrap();
    tx.rollback().await.unwrap();

    assert!(OutboxEmail::find_by_id(id, pool).await.unwrap().is_none());
}
