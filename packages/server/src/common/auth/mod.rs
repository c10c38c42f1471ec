//! Authentication and role-based authorization.
//!
//! ```rust
//! use helpdesk_core::common::auth::{Actor, Capability, Role};
//! # use helpdesk_core::common::UserId;
//! # let user_id = UserId::new();
//!
//! Actor::new(user_id, Role::SecretaireDsi)
//!     .can(Capability::AssignTickets)
//!     .check()
//!     .unwrap();
//! ```

mod builder;
mod capability;
mod errors;
mod jwt;
mod role;

pub use builder::{Actor, CapabilityBuilder};
pub use capability::Capability;
pub use errors::AuthError;
pub use jwt::{Claims, JwtService};
pub use role::{Role, UnknownRole};
