use sqlx::PgPool;

use super::models::{TicketCategoryConfig, TicketTypeConfig};
use crate::common::DomainResult;

pub async fn list_ticket_types(pool: &PgPool) -> DomainResult<Vec<TicketTypeConfig>> {
    Ok(TicketTypeConfig::find_active(pool).await?)
}

/// Blank `type_code` means every type.
pub async fn list_ticket_categories(
    type_code: Option<&str>,
    pool: &PgPool,
) -> DomainResult<Vec<TicketCategoryConfig>> {
    let type_code = type_code.map(str::trim).filter(|code| !code.is_empty());
    Ok(TicketCategoryConfig::find_active(type_code, pool).await?)
}
