// DSI Helpdesk - API Core
//
// Ticket lifecycle, assignment and validation workflow for the IT helpdesk.
// Domain logic lives in domains/*; HTTP and background infrastructure in
// server/ and kernel/.

pub mod common;
pub mod config;
pub mod domains;
pub mod kernel;
pub mod server;

pub use config::Config;
