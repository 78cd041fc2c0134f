//! HTTP API response DTOs for the chat gateway.

use serde::{Deserialize, Serialize};

use super::websocket::{HistoryEntry, UserInfo};

/// Health check response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthDto {
    pub status: String,
}

/// Current registry snapshot
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParticipantsDto {
    /// Number of open connections, named or not
    pub count: usize,
    /// Named participants in registry order
    pub users: Vec<UserInfo>,
}

/// Recent message history, oldest first
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessagesDto {
    pub messages: Vec<HistoryEntry>,
}

/// Query parameters for the message history endpoint
#[derive(Debug, Clone, Default, Deserialize)]
pub struct MessagesQuery {
    pub limit: Option<usize>,
}
