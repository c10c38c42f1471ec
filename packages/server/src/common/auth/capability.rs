use super::Role;

/// Role-gated operations.
///
/// Operations gated on the relationship to a ticket (creator, assigned
/// technician) are checked by the ticket state machine, not here.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Capability {
    /// Open new tickets
    CreateTickets,

    /// List and read every ticket
    ViewAllTickets,

    /// Assign and reassign technicians
    AssignTickets,

    /// Raise a ticket's priority
    EscalateTickets,

    /// Close resolved or rejected tickets
    CloseTickets,

    /// Reopen rejected tickets
    ReopenTickets,

    /// Hand a ticket over to an Adjoint DSI
    DelegateToAdjoint,

    /// Browse technicians and their workload
    ViewTechnicians,

    /// Create, edit and deactivate users
    ManageUsers,
}

impl Capability {
    /// Roles holding this capability.
    pub fn roles(&self) -> &'static [Role] {
        use Role::*;
        match self {
            Capability::CreateTickets => &[Utilisateur],
            Capability::ViewAllTickets
            | Capability::AssignTickets
            | Capability::CloseTickets
            | Capability::ReopenTickets
            | Capability::ViewTechnicians => &Role::AGENTS,
            Capability::EscalateTickets => &[AdjointDsi, Dsi, Admin],
            Capability::DelegateToAdjoint => &[Dsi],
            Capability::ManageUsers => &[Dsi, Admin],
        }
    }

    pub fn granted_to(&self, role: Role) -> bool {
        self.roles().contains(&role)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_requesters_create_tickets() {
        for role in Role::ALL {
            assert_eq!(
                Capability::CreateTickets.granted_to(role),
                role == Role::Utilisateur,
                "{}",
                role
            );
        }
    }

    #[test]
    fn closing_requires_an_agent_role() {
        assert!(Capability::CloseTickets.granted_to(Role::SecretaireDsi));
        assert!(Capability::CloseTickets.granted_to(Role::Admin));
        assert!(!Capability::CloseTickets.granted_to(Role::Technicien));
        assert!(!Capability::CloseTickets.granted_to(Role::Utilisateur));
    }

    #[test]
    fn secretary_cannot_escalate() {
        assert!(!Capability::EscalateTickets.granted_to(Role::SecretaireDsi));
        assert!(Capability::EscalateTickets.granted_to(Role::AdjointDsi));
    }

    #[test]
    fn delegation_is_reserved_to_dsi() {
        let holders: Vec<Role> = Role::ALL
            .into_iter()
            .filter(|r| Capability::DelegateToAdjoint.granted_to(*r))
            .collect();
        assert_eq!(holders, vec![Role::Dsi]);
    }
}
