//! Server state and connection management.

use serde::Deserialize;

use crate::{infrastructure::TokenVerifier, usecase::ChatServices};

/// Query parameters for WebSocket connection
#[derive(Debug, Default, Deserialize)]
pub struct ConnectQuery {
    /// Access token, required only when token verification is configured
    pub token: Option<String>,
}

/// Shared application state
pub struct AppState {
    /// Registry, message log and broadcaster shared by every session
    pub services: ChatServices,
    /// Access token verifier; `None` accepts every connection
    pub token_verifier: Option<TokenVerifier>,
}

impl AppState {
    pub fn new(services: ChatServices, token_verifier: Option<TokenVerifier>) -> Self {
        Self {
            services,
            token_verifier,
        }
    }
}
