//! UseCase: 参加者接続処理
//!
//! ## テスト実装の作業記録
//!
//! ### 何をテストしているか
//! - ConnectParticipantUseCase::execute() / load_history() メソッド
//! - 参加者の登録処理（上限チェック）と直近履歴の取得
//!
//! ### なぜこのテストが必要か
//! - 接続直後に送られる履歴が古い順・件数上限どおりであることを保証
//! - レジストリ上限を超えた接続が登録されないことを確認
//!
//! ### どのような状況を想定しているか
//! - 正常系：新規参加者の登録、履歴の取得
//! - 異常系：レジストリ上限超過、メッセージログの読み込み失敗

use std::sync::Arc;

use crate::domain::{
    ChatMessage, MessageLog, OutboundSender, ParticipantId, ParticipantRegistry, RegistryError,
    StorageError,
};

use super::error::ConnectError;

/// 参加者接続のユースケース
pub struct ConnectParticipantUseCase {
    /// 接続中の参加者のレジストリ
    registry: Arc<dyn ParticipantRegistry>,
    /// メッセージログ
    message_log: Arc<dyn MessageLog>,
}

impl ConnectParticipantUseCase {
    /// 新しい ConnectParticipantUseCase を作成
    pub fn new(registry: Arc<dyn ParticipantRegistry>, message_log: Arc<dyn MessageLog>) -> Self {
        Self {
            registry,
            message_log,
        }
    }

    /// 参加者をレジストリに登録
    ///
    /// # Arguments
    ///
    /// * `sender` - この接続へのメッセージ送信チャンネル
    /// * `user_id` - 検証済みアクセストークンのサブジェクト（認可していない場合は None）
    ///
    /// # Returns
    ///
    /// * `Ok(ParticipantId)` - 登録成功
    /// * `Err(ConnectError)` - 登録失敗
    pub async fn execute(
        &self,
        sender: OutboundSender,
        user_id: Option<String>,
    ) -> Result<ParticipantId, ConnectError> {
        self.registry
            .add(sender, user_id)
            .await
            .map_err(|e| match e {
                RegistryError::CapacityExceeded { capacity, .. } => {
                    ConnectError::RegistryFull { capacity }
                }
                other => ConnectError::Registry(other),
            })
    }

    /// 直近の履歴を古い順に取得
    pub async fn load_history(&self, limit: usize) -> Result<Vec<ChatMessage>, StorageError> {
        self.message_log.recent_history(limit).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        domain::{DisplayName, MessageText, MockMessageLog},
        infrastructure::repository::{InMemoryMessageLog, InMemoryParticipantRegistry},
    };
    use tokio::sync::mpsc;

    #[tokio::test]
    async fn test_connect_participant_success() {
        // テスト項目: 新規参加者が正常に登録できる
        // given (前提条件):
        let registry = Arc::new(InMemoryParticipantRegistry::new());
        let usecase =
            ConnectParticipantUseCase::new(registry.clone(), Arc::new(InMemoryMessageLog::new()));
        let (tx, _rx) = mpsc::unbounded_channel();

        // when (操作):
        let result = usecase.execute(tx, Some("user-1".to_string())).await;

        // then (期待する結果):
        let id = result.unwrap();
        assert_eq!(registry.count().await, 1);
        let participant = registry.remove(id).await.unwrap();
        assert_eq!(participant.display_name, None);
        assert_eq!(participant.user_id.as_deref(), Some("user-1"));
    }

    #[tokio::test]
    async fn test_connect_participant_registry_full() {
        // テスト項目: レジストリの上限超過時にエラーが返される
        // given (前提条件):
        let registry = Arc::new(InMemoryParticipantRegistry::with_capacity(1));
        let usecase =
            ConnectParticipantUseCase::new(registry.clone(), Arc::new(InMemoryMessageLog::new()));
        let (tx1, _rx1) = mpsc::unbounded_channel();
        let (tx2, _rx2) = mpsc::unbounded_channel();
        usecase.execute(tx1, None).await.unwrap();

        // when (操作):
        let result = usecase.execute(tx2, None).await;

        // then (期待する結果):
        assert_eq!(result, Err(ConnectError::RegistryFull { capacity: 1 }));
        assert_eq!(registry.count().await, 1);
    }

    #[tokio::test]
    async fn test_load_history_oldest_first() {
        // テスト項目: 履歴が挿入順（古い順）で返される
        // given (前提条件):
        let message_log = Arc::new(InMemoryMessageLog::new());
        for text in ["first", "second", "third"] {
            message_log
                .append(
                    DisplayName::new("Alice").unwrap(),
                    MessageText::new(text).unwrap(),
                )
                .await
                .unwrap();
        }
        let usecase =
            ConnectParticipantUseCase::new(Arc::new(InMemoryParticipantRegistry::new()), message_log);

        // when (操作):
        let history = usecase.load_history(10).await.unwrap();

        // then (期待する結果):
        let texts: Vec<&str> = history.iter().map(|m| m.text.as_str()).collect();
        assert_eq!(texts, vec!["first", "second", "third"]);
    }

    #[tokio::test]
    async fn test_load_history_storage_error() {
        // テスト項目: メッセージログの読み込み失敗がそのまま返される
        // given (前提条件):
        let mut message_log = MockMessageLog::new();
        message_log
            .expect_recent_history()
            .returning(|_| Err(StorageError::new("database is locked")));
        let usecase = ConnectParticipantUseCase::new(
            Arc::new(InMemoryParticipantRegistry::new()),
            Arc::new(message_log),
        );

        // when (操作):
        let result = usecase.load_history(10).await;

        // then (期待する結果):
        assert_eq!(result, Err(StorageError::new("database is locked")));
    }
}
