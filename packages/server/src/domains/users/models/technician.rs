use anyhow::Result;
use serde::Serialize;
use sqlx::PgPool;

use super::user::Specialization;
use crate::common::UserId;

/// An active technician and how loaded they are.
#[derive(sqlx::FromRow, Debug, Clone, Serialize)]
pub struct TechnicianWorkload {
    pub id: UserId,
    pub full_name: String,
    pub email: String,
    pub agency: Option<String>,
    pub phone: Option<String>,
    pub specialization: Option<Specialization>,
    pub max_tickets_capacity: Option<i32>,
    /// Assigned or in progress
    pub assigned_tickets_count: i64,
    pub in_progress_tickets_count: i64,
}

impl TechnicianWorkload {
    pub async fn find_active(pool: &PgPool) -> Result<Vec<Self>> {
        sqlx::query_as::<_, Self>(
            r#"
            SELECT u.id, u.full_name, u.email, u.agency, u.phone, u.specialization,
                   u.max_tickets_capacity,
                   COUNT(t.id) FILTER (WHERE t.status IN ('assigne_technicien', 'en_cours'))
                       AS assigned_tickets_count,
                   COUNT(t.id) FILTER (WHERE t.status = 'en_cours') AS in_progress_tickets_count
            FROM users u
            JOIN roles r ON r.id = u.role_id
            LEFT JOIN tickets t ON t.technician_id = u.id
            WHERE u.actif AND r.name = 'Technicien'
            GROUP BY u.id
            ORDER BY u.full_name, u.id
            "#,
        )
        .fetch_all(pool)
        .await
        .map_err(Into::into)
    }
}

/// Per-status ticket counts for one technician.
#[derive(sqlx::FromRow, Debug, Clone, Copy, PartialEq, Default)]
pub struct TechnicianTicketCounts {
    pub total: i64,
    pub in_progress: i64,
    pub resolved: i64,
    pub closed: i64,
    pub rejected: i64,
    pub resolved_this_month: i64,
    pub resolved_today: i64,
    pub average_resolution_hours: Option<f64>,
    /// Assignment to the first `en_cours` history row, or to resolution when
    /// the ticket never went through `en_cours`
    pub average_response_minutes: Option<f64>,
}

impl TechnicianTicketCounts {
    pub async fn for_technician(technician_id: UserId, pool: &PgPool) -> Result<Self> {
        sqlx::query_as::<_, Self>(
            r#"
            SELECT
                COUNT(*) AS total,
                COUNT(*) FILTER (WHERE t.status = 'en_cours') AS in_progress,
                COUNT(*) FILTER (WHERE t.status = 'resolu') AS resolved,
                COUNT(*) FILTER (WHERE t.status = 'cloture') AS closed,
                COUNT(*) FILTER (WHERE t.status = 'rejete') AS rejected,
                COUNT(*) FILTER (
                    WHERE t.status IN ('resolu', 'cloture')
                      AND t.resolved_at >= date_trunc('month', NOW())
                ) AS resolved_this_month,
                COUNT(*) FILTER (
                    WHERE t.status IN ('resolu', 'cloture')
                      AND t.resolved_at >= date_trunc('day', NOW())
                ) AS resolved_today,
                (AVG(EXTRACT(EPOCH FROM (t.resolved_at - t.assigned_at))) FILTER (
                    WHERE t.status IN ('resolu', 'cloture')
                      AND t.resolved_at IS NOT NULL
                      AND t.assigned_at IS NOT NULL
                ) / 3600.0)::FLOAT8 AS average_resolution_hours,
                (AVG(response.minutes) FILTER (
                    WHERE t.status IN ('resolu', 'cloture')
                      AND response.minutes >= 0
                ))::FLOAT8 AS average_response_minutes
            FROM tickets t
            LEFT JOIN LATERAL (
                SELECT EXTRACT(EPOCH FROM (
                    COALESCE(
                        (SELECT MIN(h.changed_at)
                         FROM ticket_history h
                         WHERE h.ticket_id = t.id AND h.new_status = 'en_cours'),
                        t.resolved_at
                    ) - t.assigned_at
                )) / 60.0 AS minutes
            ) response ON TRUE
            WHERE t.technician_id = $1
            "#,
        )
        .bind(technician_id)
        .fetch_one(pool)
        .await
        .map_err(Into::into)
    }
}
