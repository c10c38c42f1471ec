use super::{AuthError, Capability, Role};
use crate::common::entity_ids::UserId;

/// Entry point for role checks
///
/// Usage:
/// ```
/// # use helpdesk_core::common::{auth::{Actor, Capability, Role}, UserId};
/// let actor = Actor::new(UserId::new(), Role::Dsi);
/// assert!(actor.can(Capability::EscalateTickets).check().is_ok());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Actor {
    pub id: UserId,
    pub role: Role,
}

impl Actor {
    pub fn new(id: UserId, role: Role) -> Self {
        Self { id, role }
    }

    /// Specify what capability the actor needs
    pub fn can(&self, capability: Capability) -> CapabilityBuilder {
        CapabilityBuilder {
            actor: *self,
            capability,
        }
    }

    pub fn is_agent(&self) -> bool {
        self.role.is_agent()
    }
}

/// Builder after specifying capability
pub struct CapabilityBuilder {
    actor: Actor,
    capability: Capability,
}

impl CapabilityBuilder {
    pub fn check(self) -> Result<(), AuthError> {
        if self.capability.granted_to(self.actor.role) {
            Ok(())
        } else {
            tracing::debug!(
                user_id = %self.actor.id,
                role = %self.actor.role,
                capability = ?self.capability,
                "capability check denied"
            );
            Err(AuthError::PermissionDenied)
        }
    }

    pub fn allowed(self) -> bool {
        self.check().is_ok()
    }
}
