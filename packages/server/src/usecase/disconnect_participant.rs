//! UseCase: 参加者切断処理
//!
//! ## テスト実装の作業記録
//!
//! ### 何をテストしているか
//! - DisconnectParticipantUseCase::execute() メソッド
//! - 参加者の切断処理（レジストリからの削除、退室通知）
//!
//! ### なぜこのテストが必要か
//! - 名前を設定済みの参加者の切断時に退室通知と参加者一覧が 1 回ずつ送られることを保証
//! - 名前未設定の参加者の切断時には何も通知されないことを確認
//! - 削除処理が冪等であること（二度目の切断は何もしない）を確認

use std::sync::Arc;

use crate::{
    domain::{Participant, ParticipantId, ParticipantRegistry},
    infrastructure::{
        Broadcaster,
        dto::websocket::{SystemMessage, UsersMessage},
    },
};

/// 参加者切断のユースケース
pub struct DisconnectParticipantUseCase {
    /// 接続中の参加者のレジストリ
    registry: Arc<dyn ParticipantRegistry>,
    /// ブロードキャストエンジン
    broadcaster: Broadcaster,
}

impl DisconnectParticipantUseCase {
    /// 新しい DisconnectParticipantUseCase を作成
    pub fn new(registry: Arc<dyn ParticipantRegistry>, broadcaster: Broadcaster) -> Self {
        Self {
            registry,
            broadcaster,
        }
    }

    /// 参加者切断を実行
    ///
    /// # Returns
    ///
    /// * `Some(Participant)` - 削除した参加者
    /// * `None` - すでに削除済み（何もしない）
    pub async fn execute(&self, id: ParticipantId) -> Option<Participant> {
        let participant = self.registry.remove(id).await?;

        if let Some(name) = &participant.display_name {
            self.broadcaster.broadcast(&SystemMessage::left(name)).await;
            let names = self.registry.snapshot().await;
            self.broadcaster.broadcast(&UsersMessage::new(&names)).await;
        }

        Some(participant)
    }

    /// 残りの参加者数を取得
    pub async fn count_remaining_participants(&self) -> usize {
        self.registry.count().await
    }
}
