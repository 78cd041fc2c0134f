//! Server wiring and lifecycle.

use std::{future::Future, sync::Arc};

use axum::{Router, routing::get};
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;

use crate::{
    config::ServerConfig,
    domain::MessageLog,
    error::ServerError,
    infrastructure::{
        TokenVerifier,
        repository::{InMemoryMessageLog, InMemoryParticipantRegistry, SqliteMessageLog},
    },
    ui::{
        handler::{health_check, list_participants, recent_messages, websocket_handler},
        signal::shutdown_signal,
        state::AppState,
    },
    usecase::ChatServices,
};

/// Build the registry, message log and verifier described by `config`
pub async fn build_state(config: &ServerConfig) -> Result<Arc<AppState>, ServerError> {
    let registry = match config.max_participants {
        Some(capacity) => InMemoryParticipantRegistry::with_capacity(capacity),
        None => InMemoryParticipantRegistry::new(),
    };

    let message_log: Arc<dyn MessageLog> = match &config.database_url {
        Some(url) => {
            tracing::info!("Persisting messages to {}", url);
            Arc::new(SqliteMessageLog::connect(url).await?)
        }
        None => {
            tracing::info!("No database configured, keeping messages in memory");
            Arc::new(InMemoryMessageLog::new())
        }
    };

    let services = ChatServices::new(Arc::new(registry), message_log, config.history_limit);
    let token_verifier = config.jwt_secret.as_deref().map(TokenVerifier::new);

    Ok(Arc::new(AppState::new(services, token_verifier)))
}

/// Routes of the chat gateway
pub fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/ws", get(websocket_handler))
        .route("/api/health", get(health_check))
        .route("/api/participants", get(list_participants))
        .route("/api/messages", get(recent_messages))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Serve on an already bound listener until `shutdown` resolves
pub async fn serve<F>(listener: TcpListener, state: Arc<AppState>, shutdown: F) -> Result<(), ServerError>
where
    F: Future<Output = ()> + Send + 'static,
{
    let app = build_router(state);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown)
        .await?;

    Ok(())
}

pub async fn run(config: ServerConfig) -> Result<(), ServerError> {
    let state = build_state(&config).await?;

    let addr = config.socket_addr();
    let listener = TcpListener::bind(&addr)
        .await
        .map_err(|source| ServerError::Bind {
            addr: addr.clone(),
            source,
        })?;

    tracing::info!("WebSocket chat gateway listening on ws://{}/ws", listener.local_addr()?);
    if let Some(capacity) = config.max_participants {
        tracing::info!("Accepting at most {} participants", capacity);
    }

    serve(listener, state, shutdown_signal()).await?;

    tracing::info!("Server shut down");
    Ok(())
}
