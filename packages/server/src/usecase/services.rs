//! UseCase 層が共有する依存関係

use std::sync::Arc;

use tokio::sync::RwLock;

use crate::{
    domain::{DEFAULT_HISTORY_LIMIT, MessageLog, ParticipantRegistry},
    infrastructure::Broadcaster,
};

/// チャットの各ユースケースが使用するサービス群
///
/// 明示的に構築され、ゲートウェイから各セッションへ受け渡されます。
#[derive(Clone)]
pub struct ChatServices {
    /// 接続中の参加者のレジストリ
    pub registry: Arc<dyn ParticipantRegistry>,
    /// メッセージログ
    pub message_log: Arc<dyn MessageLog>,
    /// ブロードキャストエンジン
    pub broadcaster: Broadcaster,
    /// 接続時に送る履歴の件数
    pub history_limit: usize,
    /// 履歴の読み出しと新規接続の登録を、メッセージの追記・配信と排他にするロック
    ///
    /// 送信は共有ロックで「追記→配信」を、接続は排他ロックで「履歴取得→送信→登録」を行う。
    /// これにより各メッセージは新しい接続に対して履歴かブロードキャストのどちらか一方で必ず 1 回届く。
    pub history_gate: Arc<RwLock<()>>,
}

impl ChatServices {
    /// 新しい ChatServices を作成
    pub fn new(
        registry: Arc<dyn ParticipantRegistry>,
        message_log: Arc<dyn MessageLog>,
        history_limit: usize,
    ) -> Self {
        let broadcaster = Broadcaster::new(registry.clone());
        Self {
            registry,
            message_log,
            broadcaster,
            history_limit,
            history_gate: Arc::new(RwLock::new(())),
        }
    }

    /// 既定の履歴件数で作成
    pub fn with_default_history(
        registry: Arc<dyn ParticipantRegistry>,
        message_log: Arc<dyn MessageLog>,
    ) -> Self {
        Self::new(registry, message_log, DEFAULT_HISTORY_LIMIT)
    }
}
