//! Domain layer error definitions.

use thiserror::Error;

use super::value_object::ParticipantId;

/// Errors related to Value Objects validation
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValueObjectError {
    /// DisplayName validation error
    #[error("DisplayName cannot be empty")]
    DisplayNameEmpty,

    /// DisplayName too long error
    #[error("DisplayName cannot exceed {max} characters (got {actual})")]
    DisplayNameTooLong { max: usize, actual: usize },

    /// MessageText validation error
    #[error("MessageText cannot be empty")]
    MessageTextEmpty,

    /// MessageText too long error
    #[error("MessageText cannot exceed {max} characters (got {actual})")]
    MessageTextTooLong { max: usize, actual: usize },
}

/// Errors related to the participant registry
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RegistryError {
    /// Registry capacity exceeded error
    #[error("Registry capacity exceeded: maximum {capacity} participants allowed (current: {current})")]
    CapacityExceeded { capacity: usize, current: usize },

    /// Participant is not (or no longer) registered
    #[error("Participant {0} is not registered")]
    ParticipantNotFound(ParticipantId),
}

/// Failure reported by the message log.
///
/// The backend error is flattened into a message so that the domain layer does
/// not depend on any storage driver.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("Message log failure: {0}")]
pub struct StorageError(String);

impl StorageError {
    pub fn new(message: impl Into<String>) -> Self {
        Self(message.into())
    }

    pub fn message(&self) -> &str {
        &self.0
    }
}
