pub mod inputs;
pub mod ticket;

pub use inputs::*;
pub use ticket::TicketData;
