//! HTTP API endpoint handlers.

use std::sync::Arc;

use axum::{
    Json,
    extract::{Query, State},
    http::StatusCode,
};

use crate::{
    infrastructure::dto::{
        http::{HealthDto, MessagesDto, MessagesQuery, ParticipantsDto},
        websocket::{HistoryEntry, UsersMessage},
    },
    ui::state::AppState,
};

/// Upper bound for `GET /api/messages?limit=N`
pub const MAX_MESSAGES_LIMIT: usize = 100;

/// Health check endpoint
pub async fn health_check() -> Json<HealthDto> {
    Json(HealthDto {
        status: "ok".to_string(),
    })
}

/// Current registry snapshot
pub async fn list_participants(State(state): State<Arc<AppState>>) -> Json<ParticipantsDto> {
    let registry = &state.services.registry;
    let count = registry.count().await;
    let names = registry.snapshot().await;

    Json(ParticipantsDto {
        count,
        users: UsersMessage::new(&names).users,
    })
}

/// Recent message history, oldest first
pub async fn recent_messages(
    State(state): State<Arc<AppState>>,
    Query(query): Query<MessagesQuery>,
) -> Result<Json<MessagesDto>, StatusCode> {
    let limit = query
        .limit
        .unwrap_or(state.services.history_limit)
        .min(MAX_MESSAGES_LIMIT);

    match state.services.message_log.recent_history(limit).await {
        Ok(messages) => Ok(Json(MessagesDto {
            messages: messages.iter().map(HistoryEntry::from).collect(),
        })),
        Err(e) => {
            tracing::error!("Failed to read message history: {}", e);
            Err(StatusCode::SERVICE_UNAVAILABLE)
        }
    }
}
