use sqlx::PgPool;

use crate::common::auth::{Actor, Capability, Role};
use crate::common::{DomainError, DomainResult, UserId};
use crate::domains::users::data::{success_rate, workload_label, TechnicianStats};
use crate::domains::users::models::{TechnicianTicketCounts, TechnicianWorkload, User};

/// Active technicians with their current load, for the assignment screen.
pub async fn list_technicians(actor: &Actor, pool: &PgPool) -> DomainResult<Vec<TechnicianWorkload>> {
    actor.can(Capability::ViewTechnicians).check()?;
    Ok(TechnicianWorkload::find_active(pool).await?)
}

pub async fn technician_stats(
    technician_id: UserId,
    actor: &Actor,
    pool: &PgPool,
) -> DomainResult<TechnicianStats> {
    actor.can(Capability::ViewTechnicians).check()?;

    let technician = User::find_by_id(technician_id, pool)
        .await?
        .filter(|user| user.role == Role::Technicien)
        .ok_or(DomainError::NotFound("Technician"))?;
    let counts = TechnicianTicketCounts::for_technician(technician.id, pool).await?;

    Ok(TechnicianStats {
        technician_id: technician.id,
        full_name: technician.full_name,
        email: technician.email,
        actif: technician.actif,
        is_available: technician.actif,
        last_login_at: technician.last_login_at,
        assigned_count: counts.total,
        in_progress_count: counts.in_progress,
        resolved_count: counts.resolved,
        closed_count: counts.closed,
        rejected_count: counts.rejected,
        resolved_this_month: counts.resolved_this_month,
        resolved_today: counts.resolved_today,
        average_resolution_hours: counts
            .average_resolution_hours
            .map(|hours| (hours * 10.0).round() / 10.0),
        average_response_minutes: counts.average_response_minutes.map(f64::round),
        success_rate: success_rate(counts.closed, counts.total),
        workload: workload_label(counts.in_progress, technician.max_tickets_capacity),
    })
}
