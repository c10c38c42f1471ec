//! Outbox rows for deferred email delivery.

use anyhow::Result;
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgExecutor, PgPool};
use typed_builder::TypedBuilder;

use crate::common::{OutboxEmailId, TicketId};

/// Longest wait between two delivery attempts.
const MAX_RETRY_DELAY_SECS: i64 = 3600;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, Default)]
#[sqlx(type_name = "outbox_status", rename_all = "snake_case")]
pub enum OutboxStatus {
    #[default]
    Pending,
    Sending,
    Sent,
    DeadLetter,
}

#[derive(FromRow, Debug, Clone, Serialize)]
pub struct OutboxEmail {
    pub id: OutboxEmailId,
    pub recipient: String,
    pub subject: String,
    pub body: String,
    pub ticket_id: Option<TicketId>,
    pub status: OutboxStatus,
    /// Attempts started so far, incremented on claim.
    pub attempts: i32,
    pub max_attempts: i32,
    pub next_attempt_at: DateTime<Utc>,
    pub lease_expires_at: Option<DateTime<Utc>>,
    pub last_error: Option<String>,
    pub created_at: DateTime<Utc>,
    pub sent_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Eq, TypedBuilder)]
#[builder(field_defaults(setter(into)))]
pub struct NewOutboxEmail {
    pub recipient: String,
    pub subject: String,
    pub body: String,
    #[builder(default)]
    pub ticket_id: Option<TicketId>,
}

/// Emails waiting for delivery and emails given up on.
#[derive(FromRow, Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct OutboxBacklog {
    pub pending: i64,
    pub dead_letter: i64,
}

/// Delay before retrying after `attempts` failed attempts.
pub fn retry_delay(attempts: i32) -> Duration {
    let exponent = attempts.clamp(0, 30) as u32;
    Duration::seconds(2i64.pow(exponent).min(MAX_RETRY_DELAY_SECS))
}

impl OutboxEmail {
    /// Queue an email. Call inside the transaction whose commit should send it.
    pub async fn enqueue<'e>(
        email: &NewOutboxEmail,
        executor: impl PgExecutor<'e>,
    ) -> Result<OutboxEmailId> {
        let id = OutboxEmailId::new();
        sqlx::query(
            r#"
            INSERT INTO email_outbox (id, recipient, subject, body, ticket_id)
            VALUES ($1, $2, $3, $4, $5)
            "#,
        )
        .bind(id)
        .bind(&email.recipient)
        .bind(&email.subject)
        .bind(&email.body)
        .bind(email.ticket_id)
        .execute(executor)
        .await?;
        Ok(id)
    }

    /// Claim up to `limit` due emails, leasing them for `lease`.
    ///
    /// Rows whose lease expired (a runner died mid-send) are reclaimed.
    pub async fn claim_batch(limit: i64, lease: Duration, pool: &PgPool) -> Result<Vec<Self>> {
        sqlx::query_as::<_, Self>(
            r#"
            WITH next_emails AS (
                SELECT id
                FROM email_outbox
                WHERE
                    (status = 'pending' AND next_attempt_at <= NOW())
                    OR (status = 'sending' AND lease_expires_at < NOW())
                ORDER BY next_attempt_at, created_at
                LIMIT $1
                FOR UPDATE SKIP LOCKED
            )
            UPDATE email_outbox
            SET status = 'sending',
                attempts = attempts + 1,
                lease_expires_at = NOW() + ($2 || ' milliseconds')::INTERVAL
            WHERE id IN (SELECT id FROM next_emails)
            RETURNING *
            "#,
        )
        .bind(limit)
        .bind(lease.num_milliseconds().to_string())
        .fetch_all(pool)
        .await
        .map_err(Into::into)
    }

    pub async fn mark_sent(id: OutboxEmailId, pool: &PgPool) -> Result<()> {
        sqlx::query(
            r#"
            UPDATE email_outbox
            SET status = 'sent',
                sent_at = NOW(),
                lease_expires_at = NULL,
                last_error = NULL
            WHERE id = $1
            "#,
        )
        .bind(id)
        .execute(pool)
        .await?;
        Ok(())
    }

    /// Record a failed attempt: reschedule with backoff, or dead-letter once
    /// `max_attempts` is spent. Returns the resulting status.
    pub async fn mark_failed(&self, error: &str, pool: &PgPool) -> Result<OutboxStatus> {
        if self.attempts >= self.max_attempts {
            sqlx::query(
                r#"
                UPDATE email_outbox
                SET status = 'dead_letter',
                    last_error = $2,
                    lease_expires_at = NULL
                WHERE id = $1
                "#,
            )
            .bind(self.id)
            .bind(error)
            .execute(pool)
            .await?;
            return Ok(OutboxStatus::DeadLetter);
        }

        let retry_at = Utc::now() + retry_delay(self.attempts);
        sqlx::query(
            r#"
            UPDATE email_outbox
            SET status = 'pending',
                last_error = $2,
                next_attempt_at = $3,
                lease_expires_at = NULL
            WHERE id = $1
            "#,
        )
        .bind(self.id)
        .bind(error)
        .bind(retry_at)
        .execute(pool)
        .await?;
        Ok(OutboxStatus::Pending)
    }

    pub async fn backlog(pool: &PgPool) -> Result<OutboxBacklog> {
        sqlx::query_as::<_, OutboxBacklog>(
            r#"
            SELECT
                COUNT(*) FILTER (WHERE status IN ('pending', 'sending')) AS pending,
                COUNT(*) FILTER (WHERE status = 'dead_letter') AS dead_letter
            FROM email_outbox
            "#,
        )
        .fetch_one(pool)
        .await
        .map_err(Into::into)
    }

    pub async fn find_by_id(id: OutboxEmailId, pool: &PgPool) -> Result<Option<Self>> {
        sqlx::query_as::<_, Self>("SELECT * FROM email_outbox WHERE id = $1")
            .bind(id)
            .fetch_optional(pool)
            .await
            .map_err(Into::into)
    }

    pub async fn find_for_ticket(ticket_id: TicketId, pool: &PgPool) -> Result<Vec<Self>> {
        sqlx::query_as::<_, Self>(
            "SELECT * FROM email_outbox WHERE ticket_id = $1 ORDER BY created_at, id",
        )
        .bind(ticket_id)
        .fetch_all(pool)
        .await
        .map_err(Into::into)
    }
}
