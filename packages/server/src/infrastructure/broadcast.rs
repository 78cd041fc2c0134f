//! Fan-out of serialized events to registered participants.
//!
//! Delivery is best effort and at most once. A failed delivery to one
//! participant is logged and skipped; it never aborts the fan-out and never
//! removes the participant from the registry. Removal is left to the
//! connection task that owns the socket.

use std::sync::Arc;

use serde::Serialize;
use thiserror::Error;

use crate::domain::{OutboundSender, ParticipantRegistry};

/// Delivery to a single connection failed
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TransportError {
    /// The connection's writer task has already gone away
    #[error("Connection is closed")]
    Closed,

    /// The event could not be serialized
    #[error("Failed to serialize event: {0}")]
    Serialize(String),
}

/// Broadcast engine over a participant registry
#[derive(Clone)]
pub struct Broadcaster {
    registry: Arc<dyn ParticipantRegistry>,
}

impl Broadcaster {
    pub fn new(registry: Arc<dyn ParticipantRegistry>) -> Self {
        Self { registry }
    }

    /// Serialize `event` once and deliver it to every registered participant.
    ///
    /// Returns the number of participants the event was handed to.
    pub async fn broadcast<T: Serialize + ?Sized>(&self, event: &T) -> usize {
        let payload = match serde_json::to_string(event) {
            Ok(payload) => payload,
            Err(e) => {
                tracing::error!("Failed to serialize broadcast event: {}", e);
                return 0;
            }
        };

        // snapshot first so the registry lock is not held while delivering
        let recipients = self.registry.recipients().await;

        let mut delivered = 0;
        for (id, sender) in recipients {
            match Self::deliver_raw(&sender, payload.clone()) {
                Ok(()) => delivered += 1,
                Err(e) => tracing::warn!("Failed to deliver broadcast to participant {}: {}", id, e),
            }
        }

        tracing::debug!("Broadcasted event to {} participant(s): {}", delivered, payload);
        delivered
    }

    /// Deliver `event` to one connection only.
    pub fn deliver<T: Serialize + ?Sized>(
        sender: &OutboundSender,
        event: &T,
    ) -> Result<(), TransportError> {
        let payload =
            serde_json::to_string(event).map_err(|e| TransportError::Serialize(e.to_string()))?;
        Self::deliver_raw(sender, payload)
    }

    fn deliver_raw(sender: &OutboundSender, payload: String) -> Result<(), TransportError> {
        sender.send(payload).map_err(|_| TransportError::Closed)
    }
}
