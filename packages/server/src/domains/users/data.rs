use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::models::{Specialization, User};
use crate::common::auth::Role;
use crate::common::{RoleId, UserId};

/// The part of a user embedded in ticket payloads.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserSummary {
    pub id: UserId,
    pub full_name: String,
    pub email: String,
    pub role: Role,
    pub agency: Option<String>,
}

impl From<&User> for UserSummary {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            full_name: user.full_name.clone(),
            email: user.email.clone(),
            role: user.role,
            agency: user.agency.clone(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreateUserInput {
    pub full_name: String,
    pub email: String,
    pub username: String,
    pub role_id: RoleId,
    pub agency: Option<String>,
    pub phone: Option<String>,
    pub specialization: Option<Specialization>,
    pub max_tickets_capacity: Option<i32>,
    pub notes: Option<String>,
}

/// Partial profile update; absent fields are left untouched.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateUserInput {
    pub full_name: Option<String>,
    pub email: Option<String>,
    pub role_id: Option<RoleId>,
    pub agency: Option<String>,
    pub phone: Option<String>,
    pub actif: Option<bool>,
    pub specialization: Option<Specialization>,
    pub max_tickets_capacity: Option<i32>,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TechnicianStats {
    pub technician_id: UserId,
    pub full_name: String,
    pub email: String,
    pub actif: bool,
    /// Active accounts can take new work
    pub is_available: bool,
    pub last_login_at: Option<DateTime<Utc>>,
    /// Every ticket ever assigned, whatever its status
    pub assigned_count: i64,
    pub in_progress_count: i64,
    pub resolved_count: i64,
    pub closed_count: i64,
    pub rejected_count: i64,
    pub resolved_this_month: i64,
    pub resolved_today: i64,
    /// Mean hours from assignment to resolution, `None` when nothing was resolved
    pub average_resolution_hours: Option<f64>,
    /// Mean minutes from assignment to the technician starting work
    pub average_response_minutes: Option<f64>,
    /// Closed over assigned, in percent
    pub success_rate: f64,
    /// "in progress/capacity"
    pub workload: String,
}

/// Workload denominator when a technician has no configured capacity.
pub const DEFAULT_CAPACITY: i32 = 5;

/// Percentage of assigned tickets that ended up closed, one decimal.
pub fn success_rate(closed: i64, total_assigned: i64) -> f64 {
    if total_assigned == 0 {
        return 0.0;
    }
    (closed as f64 * 1000.0 / total_assigned as f64).round() / 10.0
}

pub fn workload_label(in_progress: i64, capacity: Option<i32>) -> String {
    format!("{}/{}", in_progress, capacity.unwrap_or(DEFAULT_CAPACITY))
}
