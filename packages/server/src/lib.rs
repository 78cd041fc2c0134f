//! Hiroba: a real-time WebSocket chat gateway.
//!
//! Clients connect to `/ws`, pick a display name and exchange messages that are
//! appended to a message log and broadcast to every connected participant.

pub mod config;
pub mod domain;
pub mod error;
pub mod infrastructure;
pub mod ui;
pub mod usecase;

// Re-export entry points
pub use config::{ServerArgs, ServerConfig};
pub use error::ServerError;
pub use ui::run as run_server;
