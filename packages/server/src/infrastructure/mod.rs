//! Infrastructure layer: DTOs, storage backends, fan-out and token verification.

pub mod auth;
pub mod broadcast;
pub mod dto;
pub mod repository;

pub use auth::{AuthError, Claims, TokenVerifier};
pub use broadcast::{Broadcaster, TransportError};
