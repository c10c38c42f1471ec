pub mod comment;
pub mod history;
pub mod ticket;

pub use comment::{Comment, CommentType};
pub use history::TicketHistory;
pub use ticket::{NewTicket, Ticket, TicketPriority, TicketStatus, TicketType};
