//! インメモリ実装

pub mod message_log;
pub mod registry;

pub use message_log::InMemoryMessageLog;
pub use registry::InMemoryParticipantRegistry;
