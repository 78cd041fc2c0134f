//! InMemory Message Log 実装
//!
//! データベースを指定せずに起動した場合、およびテストで使用するメッセージログ。
//! プロセス終了とともに履歴は失われます。

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::domain::{ChatMessage, DisplayName, MessageLog, MessageText, StorageError, Timestamp};

/// インメモリ Message Log 実装
#[derive(Default)]
pub struct InMemoryMessageLog {
    messages: Mutex<Vec<ChatMessage>>,
}

impl InMemoryMessageLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// 保存済みメッセージ数
    pub async fn len(&self) -> usize {
        self.messages.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.messages.lock().await.is_empty()
    }
}

#[async_trait]
impl MessageLog for InMemoryMessageLog {
    async fn append(
        &self,
        sender_name: DisplayName,
        text: MessageText,
    ) -> Result<ChatMessage, StorageError> {
        let mut messages = self.messages.lock().await;
        let message = ChatMessage::new(sender_name, text, Timestamp::now());
        messages.push(message.clone());
        Ok(message)
    }

    async fn recent_history(&self, limit: usize) -> Result<Vec<ChatMessage>, StorageError> {
        let messages = self.messages.lock().await;
        let start = messages.len().saturating_sub(limit);
        Ok(messages[start..].to_vec())
    }
}
