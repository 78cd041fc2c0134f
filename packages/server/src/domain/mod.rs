//! Domain layer for the chat gateway.
//!
//! This module contains business logic that is independent of
//! data transfer objects (DTOs) and infrastructure concerns.

pub mod entity;
pub mod error;
pub mod repository;
pub mod value_object;

pub use entity::{ChatMessage, DEFAULT_HISTORY_LIMIT, Participant};
pub use error::{RegistryError, StorageError, ValueObjectError};
pub use repository::{MessageLog, OutboundSender, ParticipantRegistry};
#[cfg(test)]
pub use repository::MockMessageLog;
pub use value_object::{DisplayName, MessageText, ParticipantId, Timestamp};
