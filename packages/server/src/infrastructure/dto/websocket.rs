//! WebSocket message DTOs for the chat gateway.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::{ChatMessage, DisplayName};

/// Error text sent when a participant messages before setting a name
pub const NAME_REQUIRED: &str = "name required";

/// Outbound message type enum
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MessageType {
    History,
    System,
    Message,
    Users,
    Error,
}

/// Inbound frame sent by a client
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientFrame {
    SetName { name: String },
    Message { text: String },
}

/// Inbound frame could not be parsed
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("Malformed frame: {0}")]
pub struct ProtocolError(String);

impl ClientFrame {
    /// Parse a raw text frame.
    pub fn parse(raw: &str) -> Result<Self, ProtocolError> {
        serde_json::from_str(raw).map_err(|e| ProtocolError(e.to_string()))
    }
}

/// One past message inside a history event
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub sender_name: String,
    pub message_text: String,
    /// ISO 8601
    pub created_at: String,
}

impl From<&ChatMessage> for HistoryEntry {
    fn from(message: &ChatMessage) -> Self {
        Self {
            sender_name: message.sender_name.as_str().to_string(),
            message_text: message.text.as_str().to_string(),
            created_at: message.created_at.to_iso8601(),
        }
    }
}

/// Recent history sent to a newly connected client only
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoryMessage {
    pub r#type: MessageType,
    pub messages: Vec<HistoryEntry>,
}

impl HistoryMessage {
    pub fn new(messages: &[ChatMessage]) -> Self {
        Self {
            r#type: MessageType::History,
            messages: messages.iter().map(HistoryEntry::from).collect(),
        }
    }
}

/// Join/leave announcement
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SystemMessage {
    pub r#type: MessageType,
    pub message: String,
}

impl SystemMessage {
    pub fn joined(name: &DisplayName) -> Self {
        Self {
            r#type: MessageType::System,
            message: format!("{name} joined the chat"),
        }
    }

    pub fn left(name: &DisplayName) -> Self {
        Self {
            r#type: MessageType::System,
            message: format!("{name} left the chat"),
        }
    }
}

/// New chat message broadcast to every participant
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatBroadcastMessage {
    pub r#type: MessageType,
    pub from: String,
    pub text: String,
    /// ISO 8601
    pub ts: String,
}

impl From<&ChatMessage> for ChatBroadcastMessage {
    fn from(message: &ChatMessage) -> Self {
        Self {
            r#type: MessageType::Message,
            from: message.sender_name.as_str().to_string(),
            text: message.text.as_str().to_string(),
            ts: message.created_at.to_iso8601(),
        }
    }
}

/// Participant entry inside a users event
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserInfo {
    pub name: String,
}

/// Snapshot of every named participant
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UsersMessage {
    pub r#type: MessageType,
    pub users: Vec<UserInfo>,
}

impl UsersMessage {
    pub fn new(names: &[DisplayName]) -> Self {
        Self {
            r#type: MessageType::Users,
            users: names
                .iter()
                .map(|name| UserInfo {
                    name: name.as_str().to_string(),
                })
                .collect(),
        }
    }
}

/// Diagnostic sent to the originating client only
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorMessage {
    pub r#type: MessageType,
    pub message: String,
}

impl ErrorMessage {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            r#type: MessageType::Error,
            message: message.into(),
        }
    }

    pub fn name_required() -> Self {
        Self::new(NAME_REQUIRED)
    }
}
