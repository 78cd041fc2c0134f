//! UseCase: 表示名の設定処理
//!
//! ## テスト実装の作業記録
//!
//! ### 何をテストしているか
//! - SetNameUseCase::execute() メソッド
//! - 初回の表示名設定（入室通知 + 参加者一覧）、改名（参加者一覧のみ）、同名の再設定（通知なし）
//!
//! ### なぜこのテストが必要か
//! - users スナップショットが常に「名前を設定済みで接続中の参加者」と一致することを保証
//! - 不正な表示名でレジストリが変更されないことを確認

use std::sync::Arc;

use crate::{
    domain::{DisplayName, ParticipantId, ParticipantRegistry},
    infrastructure::{
        Broadcaster,
        dto::websocket::{SystemMessage, UsersMessage},
    },
};

use super::error::SetNameError;

/// 表示名設定の結果
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NameChange {
    /// 初めて表示名を設定した（入室）
    Joined(DisplayName),
    /// 既存の表示名を変更した
    Renamed {
        previous: DisplayName,
        current: DisplayName,
    },
    /// 同じ表示名を再設定した
    Unchanged(DisplayName),
}

impl NameChange {
    /// 設定後の表示名
    pub fn current(&self) -> &DisplayName {
        match self {
            NameChange::Joined(name) | NameChange::Unchanged(name) => name,
            NameChange::Renamed { current, .. } => current,
        }
    }
}

/// 表示名設定のユースケース
pub struct SetNameUseCase {
    registry: Arc<dyn ParticipantRegistry>,
    broadcaster: Broadcaster,
}

impl SetNameUseCase {
    /// 新しい SetNameUseCase を作成
    pub fn new(registry: Arc<dyn ParticipantRegistry>, broadcaster: Broadcaster) -> Self {
        Self {
            registry,
            broadcaster,
        }
    }

    /// 表示名設定を実行
    ///
    /// 初回設定時は入室通知と参加者一覧を、改名時は参加者一覧のみをブロードキャストする。
    ///
    /// # Arguments
    ///
    /// * `id` - 参加者 ID
    /// * `raw_name` - クライアントから受け取った表示名（未トリム）
    pub async fn execute(
        &self,
        id: ParticipantId,
        raw_name: &str,
    ) -> Result<NameChange, SetNameError> {
        let name = DisplayName::new(raw_name).map_err(SetNameError::InvalidName)?;

        let previous = self
            .registry
            .set_display_name(id, name.clone())
            .await
            .map_err(|_| SetNameError::NotRegistered)?;

        let change = match previous {
            None => {
                self.broadcaster
                    .broadcast(&SystemMessage::joined(&name))
                    .await;
                self.broadcast_users().await;
                NameChange::Joined(name)
            }
            Some(previous) if previous == name => NameChange::Unchanged(name),
            Some(previous) => {
                self.broadcast_users().await;
                NameChange::Renamed {
                    previous,
                    current: name,
                }
            }
        };

        Ok(change)
    }

    async fn broadcast_users(&self) {
        let names = self.registry.snapshot().await;
        self.broadcaster.broadcast(&UsersMessage::new(&names)).await;
    }
}
