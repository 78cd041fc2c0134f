//! Repository traits
//!
//! ドメイン層が必要とするデータアクセスの抽象。
//! 具体的な実装は infrastructure 層が提供します（依存性の逆転）。

use async_trait::async_trait;
use tokio::sync::mpsc::UnboundedSender;

use super::{
    entity::{ChatMessage, Participant},
    error::{RegistryError, StorageError},
    value_object::{DisplayName, MessageText, ParticipantId},
};

/// Outbound side of a participant connection.
///
/// Each item is one serialized frame; the connection's writer task drains it
/// into the socket.
pub type OutboundSender = UnboundedSender<String>;

/// Set of live participant connections.
///
/// Implementations must serialize every operation so that concurrent
/// add/remove/snapshot calls from independent connection tasks never race.
#[async_trait]
pub trait ParticipantRegistry: Send + Sync {
    /// Register a new, unnamed participant and return its id.
    async fn add(
        &self,
        sender: OutboundSender,
        user_id: Option<String>,
    ) -> Result<ParticipantId, RegistryError>;

    /// Set the display name of a registered participant, returning the previous one.
    async fn set_display_name(
        &self,
        id: ParticipantId,
        name: DisplayName,
    ) -> Result<Option<DisplayName>, RegistryError>;

    /// Remove a participant. Removing an absent participant is a no-op returning `None`.
    async fn remove(&self, id: ParticipantId) -> Option<Participant>;

    /// Display names of all named participants, in registry order.
    async fn snapshot(&self) -> Vec<DisplayName>;

    /// Outbound senders of every registered participant, in registry order.
    async fn recipients(&self) -> Vec<(ParticipantId, OutboundSender)>;

    /// Number of registered participants, named or not.
    async fn count(&self) -> usize;

    /// Maximum number of participants, if bounded.
    fn capacity(&self) -> Option<usize>;
}

/// Durable, append-only chat message log.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MessageLog: Send + Sync {
    /// Append a message. The log assigns the creation timestamp.
    async fn append(
        &self,
        sender_name: DisplayName,
        text: MessageText,
    ) -> Result<ChatMessage, StorageError>;

    /// The newest `limit` messages, oldest first.
    async fn recent_history(&self, limit: usize) -> Result<Vec<ChatMessage>, StorageError>;
}
