//! Users domain actions.

pub mod manage;
pub mod technicians;

pub use manage::*;
pub use technicians::*;
