use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Helpdesk roles.
///
/// Stored by name in the `roles` table. The names are part of the public API
/// (they appear in user payloads) and must match the seeded rows exactly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Role {
    #[serde(rename = "Utilisateur")]
    Utilisateur,
    #[serde(rename = "Secrétaire DSI")]
    SecretaireDsi,
    #[serde(rename = "Adjoint DSI")]
    AdjointDsi,
    #[serde(rename = "Technicien")]
    Technicien,
    #[serde(rename = "DSI")]
    Dsi,
    #[serde(rename = "Admin")]
    Admin,
}

impl Role {
    pub const ALL: [Role; 6] = [
        Role::Utilisateur,
        Role::SecretaireDsi,
        Role::AdjointDsi,
        Role::Technicien,
        Role::Dsi,
        Role::Admin,
    ];

    /// Roles that triage and supervise tickets.
    pub const AGENTS: [Role; 4] = [Role::SecretaireDsi, Role::AdjointDsi, Role::Dsi, Role::Admin];

    pub fn name(&self) -> &'static str {
        match self {
            Role::Utilisateur => "Utilisateur",
            Role::SecretaireDsi => "Secrétaire DSI",
            Role::AdjointDsi => "Adjoint DSI",
            Role::Technicien => "Technicien",
            Role::Dsi => "DSI",
            Role::Admin => "Admin",
        }
    }

    pub fn is_agent(&self) -> bool {
        Self::AGENTS.contains(self)
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Error)]
#[error("Unknown role: {0}")]
pub struct UnknownRole(pub String);

impl FromStr for Role {
    type Err = UnknownRole;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Role::ALL
            .into_iter()
            .find(|role| role.name() == s)
            .ok_or_else(|| UnknownRole(s.to_string()))
    }
}

// Lets `#[sqlx(try_from = "String")]` decode the joined role name.
impl TryFrom<String> for Role {
    type Error = UnknownRole;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}
