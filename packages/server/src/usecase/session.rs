//! Per-connection chat session.
//!
//! A session is a small state machine driven by the connection task:
//!
//! ```text
//! Connected --set_name--> Named --set_name--> Named (rename)
//!     |                     |
//!     +------- close -------+--> Closed
//! ```
//!
//! Frames are handled one at a time in arrival order. Every failure other than
//! the transport closing is handled here and never ends the session.

use crate::{
    domain::{DisplayName, OutboundSender, Participant, ParticipantId, Timestamp},
    infrastructure::{
        Broadcaster,
        dto::websocket::{ClientFrame, ErrorMessage, HistoryMessage},
    },
};

use super::{
    ChatServices, ConnectError, ConnectParticipantUseCase, DisconnectParticipantUseCase,
    SendMessageError, SendMessageUseCase, SetNameError, SetNameUseCase,
};

/// Session state
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionState {
    /// Connected, no name yet
    Connected,
    /// Name set, may send messages
    Named(DisplayName),
    /// Torn down; terminal
    Closed,
}

/// One participant's session
pub struct ChatSession {
    id: ParticipantId,
    state: SessionState,
    outbound: OutboundSender,
    services: ChatServices,
}

impl ChatSession {
    /// Open a session: send recent history to this connection, then register it.
    ///
    /// History is enqueued before registration so that it is the first frame
    /// the client sees. Sends are held off until registration completes, so a
    /// message is either part of the history or broadcast to this connection,
    /// never both and never neither. A history read failure is logged and the
    /// session opens without history.
    pub async fn open(
        services: ChatServices,
        outbound: OutboundSender,
        user_id: Option<String>,
    ) -> Result<Self, ConnectError> {
        let connect_usecase =
            ConnectParticipantUseCase::new(services.registry.clone(), services.message_log.clone());

        // No message may be appended between reading history and registering
        let history_gate = services.history_gate.clone();
        let _gate = history_gate.write().await;

        match connect_usecase.load_history(services.history_limit).await {
            Ok(messages) => {
                if let Err(e) = Broadcaster::deliver(&outbound, &HistoryMessage::new(&messages)) {
                    tracing::warn!("Failed to send history: {}", e);
                }
            }
            Err(e) => tracing::error!("Failed to load history, continuing without it: {}", e),
        }

        let id = match connect_usecase.execute(outbound.clone(), user_id).await {
            Ok(id) => id,
            Err(e) => {
                let _ = Broadcaster::deliver(&outbound, &ErrorMessage::new(e.to_string()));
                return Err(e);
            }
        };
        tracing::info!("Participant {} connected", id);

        Ok(Self {
            id,
            state: SessionState::Connected,
            outbound,
            services,
        })
    }

    pub fn id(&self) -> ParticipantId {
        self.id
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    /// Handle one raw text frame. Malformed frames are logged and ignored.
    pub async fn handle_text(&mut self, raw: &str) {
        match ClientFrame::parse(raw) {
            Ok(frame) => self.handle_frame(frame).await,
            Err(e) => tracing::warn!("Ignoring frame from participant {}: {}", self.id, e),
        }
    }

    /// Handle one parsed frame.
    pub async fn handle_frame(&mut self, frame: ClientFrame) {
        match frame {
            ClientFrame::SetName { name } => self.set_name(&name).await,
            ClientFrame::Message { text } => self.send_message(&text).await,
        }
    }

    async fn set_name(&mut self, raw_name: &str) {
        if self.state == SessionState::Closed {
            return;
        }

        let usecase = SetNameUseCase::new(
            self.services.registry.clone(),
            self.services.broadcaster.clone(),
        );
        match usecase.execute(self.id, raw_name).await {
            Ok(change) => {
                tracing::info!("Participant {} is now named '{}'", self.id, change.current());
                self.state = SessionState::Named(change.current().clone());
            }
            Err(SetNameError::InvalidName(e)) => {
                tracing::debug!("Rejected name from participant {}: {}", self.id, e);
                self.reply_error(e.to_string());
            }
            Err(SetNameError::NotRegistered) => {
                tracing::warn!("Participant {} set a name after removal", self.id);
            }
        }
    }

    async fn send_message(&mut self, raw_text: &str) {
        let sender_name = match &self.state {
            SessionState::Named(name) => name.clone(),
            SessionState::Connected => {
                self.reply_error(ErrorMessage::name_required().message);
                return;
            }
            SessionState::Closed => return,
        };

        let usecase = SendMessageUseCase::new(
            self.services.message_log.clone(),
            self.services.broadcaster.clone(),
        );
        let result = {
            let _gate = self.services.history_gate.read().await;
            usecase.execute(&sender_name, raw_text).await
        };
        match result {
            Ok(message) => tracing::debug!(
                "Participant {} ('{}') sent a message",
                self.id,
                message.sender_name
            ),
            Err(SendMessageError::EmptyMessage) => {}
            Err(SendMessageError::InvalidText(e)) => self.reply_error(e.to_string()),
            Err(SendMessageError::Storage(e)) => {
                tracing::error!("Dropping message from participant {}: {}", self.id, e)
            }
        }
    }

    /// Tear the session down. Only the first call has any effect.
    ///
    /// Returns the participant removed from the registry by this call.
    pub async fn close(&mut self) -> Option<Participant> {
        if self.state == SessionState::Closed {
            return None;
        }
        self.state = SessionState::Closed;

        let usecase = DisconnectParticipantUseCase::new(
            self.services.registry.clone(),
            self.services.broadcaster.clone(),
        );
        let removed = usecase.execute(self.id).await;
        match &removed {
            Some(participant) => tracing::info!(
                "Participant {} (user: {}) disconnected after {}s ({} remaining)",
                participant.id,
                participant.user_id.as_deref().unwrap_or("anonymous"),
                participant.connected_seconds(&Timestamp::now()),
                usecase.count_remaining_participants().await
            ),
            None => tracing::debug!("Participant {} was already removed", self.id),
        }
        removed
    }

    fn reply_error(&self, message: impl Into<String>) {
        if let Err(e) = Broadcaster::deliver(&self.outbound, &ErrorMessage::new(message)) {
            tracing::warn!("Failed to send error to participant {}: {}", self.id, e);
        }
    }
}
