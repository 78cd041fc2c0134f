//! SQLite 実装

pub mod message_log;

pub use message_log::SqliteMessageLog;
