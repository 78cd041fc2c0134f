//! UseCase: メッセージ送信処理
//!
//! ## テスト実装の作業記録
//!
//! ### 何をテストしているか
//! - SendMessageUseCase::execute() メソッド
//! - メッセージ送信処理（トリム、メッセージログへの追記、全員へのブロードキャスト）
//!
//! ### なぜこのテストが必要か
//! - 有効なメッセージ 1 件につき、ログへの追記 1 件・各参加者へのイベント 1 件であることを保証
//! - 空白のみのメッセージがログにもブロードキャストにも影響しないことを確認
//! - ログへの書き込み失敗時にブロードキャストされないことを確認
//!
//! ### どのような状況を想定しているか
//! - 正常系：メッセージ送信とブロードキャスト（送信者自身も受信する）
//! - 異常系：空メッセージ、長すぎるメッセージ、ログ書き込み失敗

use std::sync::Arc;

use crate::{
    domain::{ChatMessage, DisplayName, MessageLog, MessageText, ValueObjectError},
    infrastructure::{Broadcaster, dto::websocket::ChatBroadcastMessage},
};

use super::error::SendMessageError;

/// メッセージ送信のユースケース
pub struct SendMessageUseCase {
    /// メッセージログ
    message_log: Arc<dyn MessageLog>,
    /// ブロードキャストエンジン
    broadcaster: Broadcaster,
}

impl SendMessageUseCase {
    /// 新しい SendMessageUseCase を作成
    pub fn new(message_log: Arc<dyn MessageLog>, broadcaster: Broadcaster) -> Self {
        Self {
            message_log,
            broadcaster,
        }
    }

    /// メッセージ送信を実行
    ///
    /// # Arguments
    ///
    /// * `sender_name` - 送信者の表示名（Domain Model）
    /// * `raw_text` - クライアントから受け取った本文（未トリム）
    ///
    /// # Returns
    ///
    /// * `Ok(ChatMessage)` - 保存・ブロードキャストされたメッセージ
    /// * `Err(SendMessageError)` - 送信失敗
    pub async fn execute(
        &self,
        sender_name: &DisplayName,
        raw_text: &str,
    ) -> Result<ChatMessage, SendMessageError> {
        let text = MessageText::new(raw_text).map_err(|e| match e {
            ValueObjectError::MessageTextEmpty => SendMessageError::EmptyMessage,
            other => SendMessageError::InvalidText(other),
        })?;

        // 1. メッセージログに追記（タイムスタンプはログが割り当てる）
        let message = self.message_log.append(sender_name.clone(), text).await?;

        // 2. 送信者を含む全員にブロードキャスト
        self.broadcaster
            .broadcast(&ChatBroadcastMessage::from(&message))
            .await;

        Ok(message)
    }
}
