//! WebSocket chat gateway: routing, connection handling and server lifecycle.

mod handler;
mod runner;
mod signal;
pub mod state;

pub use runner::{build_router, build_state, run, serve};
