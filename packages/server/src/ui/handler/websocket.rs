//! WebSocket connection handlers.

use std::{fmt::Display, sync::Arc};

use axum::{
    extract::{
        Query, State,
        ws::{Message, WebSocket, WebSocketUpgrade},
    },
    http::StatusCode,
    response::IntoResponse,
};
use futures_util::{
    sink::{Sink, SinkExt},
    stream::{Stream, StreamExt},
};
use tokio::{
    sync::mpsc::{self, UnboundedReceiver},
    task::JoinHandle,
};

use crate::{
    ui::state::{AppState, ConnectQuery},
    usecase::ChatSession,
};

pub async fn websocket_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
    Query(query): Query<ConnectQuery>,
) -> Result<impl IntoResponse, StatusCode> {
    let user_id = match &state.token_verifier {
        Some(verifier) => match verifier.verify(query.token.as_deref()) {
            Ok(claims) => Some(claims.sub),
            Err(e) => {
                tracing::warn!("Rejecting connection: {}", e);
                return Err(StatusCode::UNAUTHORIZED);
            }
        },
        None => None,
    };

    // Fast path; the registry re-checks its capacity when the session registers
    let registry = &state.services.registry;
    if let Some(capacity) = registry.capacity()
        && registry.count().await >= capacity
    {
        tracing::warn!(
            "Registry is full ({} participants). Rejecting connection.",
            capacity
        );
        return Err(StatusCode::SERVICE_UNAVAILABLE);
    }

    Ok(ws.on_upgrade(move |socket| handle_socket(socket, state, user_id)))
}

async fn handle_socket(socket: WebSocket, state: Arc<AppState>, user_id: Option<String>) {
    let (sender, receiver) = socket.split();

    // Create a channel for this client to receive messages
    let (tx, rx) = mpsc::unbounded_channel::<String>();
    let mut send_task = spawn_writer(sender, rx);

    let mut session = match ChatSession::open(state.services.clone(), tx, user_id).await {
        Ok(session) => session,
        Err(e) => {
            tracing::warn!("Closing connection: {}", e);
            // the session's sender is gone, so the writer flushes the error and exits
            let _ = send_task.await;
            return;
        }
    };

    drive_session(&mut session, receiver, &mut send_task).await;

    session.close().await;
    send_task.abort();
}

/// Forward queued frames to the client until the queue closes or a write fails
fn spawn_writer<S>(mut sink: S, mut rx: UnboundedReceiver<String>) -> JoinHandle<()>
where
    S: Sink<Message> + Unpin + Send + 'static,
    S::Error: Display + Send,
{
    tokio::spawn(async move {
        while let Some(payload) = rx.recv().await {
            if let Err(e) = sink.send(Message::Text(payload.into())).await {
                tracing::debug!("WebSocket write failed: {}", e);
                break;
            }
        }
        let _ = sink.close().await;
    })
}

/// Feed incoming frames to the session until the client leaves or the writer stops
async fn drive_session<St, E>(
    session: &mut ChatSession,
    mut frames: St,
    send_task: &mut JoinHandle<()>,
) where
    St: Stream<Item = Result<Message, E>> + Unpin,
    E: Display,
{
    let id = session.id();

    loop {
        tokio::select! {
            frame = frames.next() => match frame {
                Some(Ok(Message::Text(text))) => {
                    tracing::debug!("Received text from participant {}: {}", id, text.as_str());
                    session.handle_text(text.as_str()).await;
                }
                Some(Ok(Message::Binary(bytes))) => match std::str::from_utf8(&bytes) {
                    Ok(text) => session.handle_text(text).await,
                    Err(_) => tracing::warn!("Ignoring non UTF-8 binary frame from participant {}", id),
                },
                Some(Ok(Message::Close(_))) => {
                    tracing::info!("Participant {} requested close", id);
                    break;
                }
                // Ping/pong is handled automatically by the WebSocket protocol
                Some(Ok(_)) => {}
                Some(Err(e)) => {
                    tracing::warn!("WebSocket error from participant {}: {}", id, e);
                    break;
                }
                None => break,
            },
            _ = &mut *send_task => {
                tracing::info!("Connection to participant {} is no longer writable", id);
                break;
            }
        }
    }
}
