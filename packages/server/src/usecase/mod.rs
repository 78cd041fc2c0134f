//! UseCase 層
//!
//! ビジネスロジックを実装するレイヤー。
//! UI 層から呼び出され、Domain 層を操作します。

pub mod connect_participant;
pub mod disconnect_participant;
pub mod error;
pub mod send_message;
pub mod services;
pub mod session;
pub mod set_name;

pub use connect_participant::ConnectParticipantUseCase;
pub use disconnect_participant::DisconnectParticipantUseCase;
pub use error::{ConnectError, SendMessageError, SetNameError};
pub use send_message::SendMessageUseCase;
pub use services::ChatServices;
pub use session::{ChatSession, SessionState};
pub use set_name::{NameChange, SetNameUseCase};
