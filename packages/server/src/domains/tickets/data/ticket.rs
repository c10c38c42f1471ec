use std::collections::{HashMap, HashSet};

use serde::Serialize;
use sqlx::PgPool;

use crate::common::{DomainResult, UserId};
use crate::domains::tickets::models::Ticket;
use crate::domains::users::data::UserSummary;
use crate::domains::users::models::User;

/// API representation of a ticket with its people resolved.
#[derive(Debug, Clone, Serialize)]
pub struct TicketData {
    #[serde(flatten)]
    pub ticket: Ticket,
    pub creator: Option<UserSummary>,
    pub technician: Option<UserSummary>,
}

impl TicketData {
    pub async fn load(ticket: Ticket, pool: &PgPool) -> DomainResult<Self> {
        let creator = User::find_by_id(ticket.creator_id, pool).await?;
        let technician = match ticket.technician_id {
            Some(id) => User::find_by_id(id, pool).await?,
            None => None,
        };
        Ok(Self {
            creator: creator.as_ref().map(UserSummary::from),
            technician: technician.as_ref().map(UserSummary::from),
            ticket,
        })
    }

    /// Resolve the people of a whole listing with one user query.
    pub async fn load_all(tickets: Vec<Ticket>, pool: &PgPool) -> DomainResult<Vec<Self>> {
        let ids: Vec<UserId> = tickets
            .iter()
            .flat_map(|t| std::iter::once(t.creator_id).chain(t.technician_id))
            .collect::<HashSet<_>>()
            .into_iter()
            .collect();
        let people: HashMap<UserId, UserSummary> = if ids.is_empty() {
            HashMap::new()
        } else {
            User::find_by_ids(&ids, pool)
                .await?
                .iter()
                .map(|user| (user.id, UserSummary::from(user)))
                .collect()
        };

        Ok(tickets
            .into_iter()
            .map(|ticket| Self {
                creator: people.get(&ticket.creator_id).cloned(),
                technician: ticket.technician_id.and_then(|id| people.get(&id).cloned()),
                ticket,
            })
            .collect())
    }
}
