//! Core domain models for the chat gateway.

use super::value_object::{DisplayName, MessageText, ParticipantId, Timestamp};

/// Default number of most recent messages sent to a newly connected participant
pub const DEFAULT_HISTORY_LIMIT: usize = 10;

/// Represents one live chat connection
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Participant {
    /// Registry-assigned identifier
    pub id: ParticipantId,
    /// Name chosen by the participant, absent until "set name"
    pub display_name: Option<DisplayName>,
    /// Subject of the verified access token, if the connection was authorized
    pub user_id: Option<String>,
    /// Timestamp when the participant connected
    pub connected_at: Timestamp,
}

impl Participant {
    /// Create a new, unnamed participant
    pub fn new(id: ParticipantId, user_id: Option<String>, connected_at: Timestamp) -> Self {
        Self {
            id,
            display_name: None,
            user_id,
            connected_at,
        }
    }

    /// Whether the participant has set a display name
    pub fn is_named(&self) -> bool {
        self.display_name.is_some()
    }

    /// Replace the display name, returning the previous one
    pub fn rename(&mut self, name: DisplayName) -> Option<DisplayName> {
        self.display_name.replace(name)
    }

    /// Whole seconds between connecting and `now`
    pub fn connected_seconds(&self, now: &Timestamp) -> i64 {
        (now.value() - self.connected_at.value()).num_seconds()
    }
}

/// Represents a persisted chat message
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatMessage {
    /// Sender's display name at the time of sending
    pub sender_name: DisplayName,
    /// Trimmed, non-empty message text
    pub text: MessageText,
    /// Timestamp assigned by the message log at write time
    pub created_at: Timestamp,
}

impl ChatMessage {
    /// Create a new chat message
    pub fn new(sender_name: DisplayName, text: MessageText, created_at: Timestamp) -> Self {
        Self {
            sender_name,
            text,
            created_at,
        }
    }
}
