pub mod role;
pub mod technician;
pub mod user;

pub use role::RoleRecord;
pub use technician::{TechnicianTicketCounts, TechnicianWorkload};
pub use user::{NewUser, Specialization, User};
