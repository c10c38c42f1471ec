// Common types and utilities shared across the application

pub mod auth;
pub mod entity_ids;
pub mod errors;
pub mod id;

pub use auth::{Actor, AuthError, Capability, Role};
pub use entity_ids::*;
pub use errors::{DomainError, DomainResult};
pub use id::{Id, V4, V7};
