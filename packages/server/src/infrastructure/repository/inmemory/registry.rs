//! InMemory Participant Registry 実装
//!
//! ドメイン層が定義する ParticipantRegistry trait の具体的な実装。
//! BTreeMap をインメモリのレジストリとして使用し、全操作を 1 つの Mutex で直列化します。
//! ParticipantId は接続順に採番されるため、BTreeMap の走査順は参加順になります。

use std::collections::BTreeMap;

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::domain::{
    DisplayName, OutboundSender, Participant, ParticipantId, ParticipantRegistry, RegistryError,
    Timestamp,
};

/// Registry entry: domain participant plus its outbound channel
struct RegistryEntry {
    participant: Participant,
    sender: OutboundSender,
}

#[derive(Default)]
struct RegistryInner {
    entries: BTreeMap<ParticipantId, RegistryEntry>,
    next_id: u64,
}

/// インメモリ Participant Registry 実装
pub struct InMemoryParticipantRegistry {
    inner: Mutex<RegistryInner>,
    /// 参加者数の上限（None の場合は無制限）
    capacity: Option<usize>,
}

impl InMemoryParticipantRegistry {
    /// 上限なしの InMemoryParticipantRegistry を作成
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(RegistryInner::default()),
            capacity: None,
        }
    }

    /// 参加者数の上限付きで InMemoryParticipantRegistry を作成
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            inner: Mutex::new(RegistryInner::default()),
            capacity: Some(capacity),
        }
    }
}

impl Default for InMemoryParticipantRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ParticipantRegistry for InMemoryParticipantRegistry {
    async fn add(
        &self,
        sender: OutboundSender,
        user_id: Option<String>,
    ) -> Result<ParticipantId, RegistryError> {
        let mut inner = self.inner.lock().await;

        if let Some(capacity) = self.capacity
            && inner.entries.len() >= capacity
        {
            return Err(RegistryError::CapacityExceeded {
                capacity,
                current: inner.entries.len(),
            });
        }

        inner.next_id += 1;
        let id = ParticipantId::new(inner.next_id);
        let participant = Participant::new(id, user_id, Timestamp::now());
        inner
            .entries
            .insert(id, RegistryEntry { participant, sender });

        Ok(id)
    }

    async fn set_display_name(
        &self,
        id: ParticipantId,
        name: DisplayName,
    ) -> Result<Option<DisplayName>, RegistryError> {
        let mut inner = self.inner.lock().await;
        let entry = inner
            .entries
            .get_mut(&id)
            .ok_or(RegistryError::ParticipantNotFound(id))?;
        Ok(entry.participant.rename(name))
    }

    async fn remove(&self, id: ParticipantId) -> Option<Participant> {
        let mut inner = self.inner.lock().await;
        inner.entries.remove(&id).map(|entry| entry.participant)
    }

    async fn snapshot(&self) -> Vec<DisplayName> {
        let inner = self.inner.lock().await;
        inner
            .entries
            .values()
            .filter_map(|entry| entry.participant.display_name.clone())
            .collect()
    }

    async fn recipients(&self) -> Vec<(ParticipantId, OutboundSender)> {
        let inner = self.inner.lock().await;
        inner
            .entries
            .iter()
            .map(|(id, entry)| (*id, entry.sender.clone()))
            .collect()
    }

    async fn count(&self) -> usize {
        let inner = self.inner.lock().await;
        inner.entries.len()
    }

    fn capacity(&self) -> Option<usize> {
        self.capacity
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use tokio::sync::mpsc;

    // ========================================
    // テスト作業記録
    // ========================================
    // 【何をテストするか】
    // - InMemoryParticipantRegistry の追加・改名・削除・スナップショット
    // - 上限付きレジストリの容量チェック
    // - 削除の冪等性（同じ参加者を二度削除しても問題ない）
    //
    // 【なぜこのテストが必要か】
    // - レジストリは複数の接続タスクから同時に操作される唯一の共有状態
    // - users スナップショットの正しさは参加者一覧のブロードキャストに直結する
    // ========================================

    fn name(value: &str) -> DisplayName {
        DisplayName::new(value).unwrap()
    }

    #[tokio::test]
    async fn test_add_assigns_increasing_ids() {
        // テスト項目: 追加した順に増加する ID が割り当てられる
        // given (前提条件):
        let registry = InMemoryParticipantRegistry::new();
        let (tx1, _rx1) = mpsc::unbounded_channel();
        let (tx2, _rx2) = mpsc::unbounded_channel();

        // when (操作):
        let first = registry.add(tx1, None).await.unwrap();
        let second = registry.add(tx2, Some("user-1".to_string())).await.unwrap();

        // then (期待する結果):
        assert!(first < second);
        assert_eq!(registry.count().await, 2);
        let removed = registry.remove(second).await.unwrap();
        assert_eq!(removed.id, second);
        assert_eq!(removed.user_id.as_deref(), Some("user-1"));
    }

    #[tokio::test]
    async fn test_snapshot_contains_only_named_participants() {
        // テスト項目: スナップショットには表示名を設定した参加者のみが含まれる
        // given (前提条件):
        let registry = InMemoryParticipantRegistry::new();
        let (tx1, _rx1) = mpsc::unbounded_channel();
        let (tx2, _rx2) = mpsc::unbounded_channel();
        let (tx3, _rx3) = mpsc::unbounded_channel();
        let alice = registry.add(tx1, None).await.unwrap();
        let _unnamed = registry.add(tx2, None).await.unwrap();
        let bob = registry.add(tx3, None).await.unwrap();

        // when (操作):
        registry.set_display_name(bob, name("Bob")).await.unwrap();
        registry.set_display_name(alice, name("Alice")).await.unwrap();
        let snapshot = registry.snapshot().await;

        // then (期待する結果): 参加順（Alice → Bob）
        assert_eq!(snapshot, vec![name("Alice"), name("Bob")]);
    }

    #[tokio::test]
    async fn test_set_display_name_returns_previous() {
        // テスト項目: 改名すると以前の表示名が返され、スナップショットに重複は生じない
        // given (前提条件):
        let registry = InMemoryParticipantRegistry::new();
        let (tx, _rx) = mpsc::unbounded_channel();
        let id = registry.add(tx, None).await.unwrap();

        // when (操作):
        let first = registry.set_display_name(id, name("Alice")).await.unwrap();
        let second = registry.set_display_name(id, name("Alicia")).await.unwrap();

        // then (期待する結果):
        assert_eq!(first, None);
        assert_eq!(second, Some(name("Alice")));
        assert_eq!(registry.snapshot().await, vec![name("Alicia")]);
    }

    #[tokio::test]
    async fn test_set_display_name_unknown_participant() {
        // テスト項目: 未登録の参加者の改名はエラーになる
        // given (前提条件):
        let registry = InMemoryParticipantRegistry::new();
        let unknown = ParticipantId::new(42);

        // when (操作):
        let result = registry.set_display_name(unknown, name("Ghost")).await;

        // then (期待する結果):
        assert_eq!(result, Err(RegistryError::ParticipantNotFound(unknown)));
    }

    #[tokio::test]
    async fn test_remove_is_idempotent() {
        // テスト項目: 同じ参加者を二度削除しても二度目は何もしない
        // given (前提条件):
        let registry = InMemoryParticipantRegistry::new();
        let (tx, _rx) = mpsc::unbounded_channel();
        let id = registry.add(tx, None).await.unwrap();
        registry.set_display_name(id, name("Alice")).await.unwrap();

        // when (操作):
        let first = registry.remove(id).await;
        let second = registry.remove(id).await;

        // then (期待する結果):
        assert_eq!(first.unwrap().display_name, Some(name("Alice")));
        assert!(second.is_none());
        assert_eq!(registry.count().await, 0);
        assert!(registry.snapshot().await.is_empty());
    }

    #[tokio::test]
    async fn test_capacity_exceeded() {
        // テスト項目: 上限に達したレジストリへの追加はエラーになる
        // given (前提条件):
        let registry = InMemoryParticipantRegistry::with_capacity(2);
        let (tx1, _rx1) = mpsc::unbounded_channel();
        let (tx2, _rx2) = mpsc::unbounded_channel();
        let (tx3, _rx3) = mpsc::unbounded_channel();
        registry.add(tx1, None).await.unwrap();
        registry.add(tx2, None).await.unwrap();

        // when (操作):
        let result = registry.add(tx3, None).await;

        // then (期待する結果):
        assert_eq!(
            result,
            Err(RegistryError::CapacityExceeded {
                capacity: 2,
                current: 2
            })
        );
        assert_eq!(registry.count().await, 2);
        assert_eq!(registry.capacity(), Some(2));
    }

    #[tokio::test]
    async fn test_recipients_include_unnamed_participants() {
        // テスト項目: 配信先には表示名未設定の参加者も含まれる
        // given (前提条件):
        let registry = InMemoryParticipantRegistry::new();
        let (tx1, mut rx1) = mpsc::unbounded_channel();
        let (tx2, mut rx2) = mpsc::unbounded_channel();
        let named = registry.add(tx1, None).await.unwrap();
        registry.add(tx2, None).await.unwrap();
        registry.set_display_name(named, name("Alice")).await.unwrap();

        // when (操作):
        let recipients = registry.recipients().await;
        for (_, sender) in &recipients {
            sender.send("ping".to_string()).unwrap();
        }

        // then (期待する結果):
        assert_eq!(recipients.len(), 2);
        assert_eq!(rx1.recv().await.as_deref(), Some("ping"));
        assert_eq!(rx2.recv().await.as_deref(), Some("ping"));
    }

    #[tokio::test]
    async fn test_concurrent_add_and_remove() {
        // テスト項目: 複数タスクからの同時追加・削除でもレジストリが壊れない
        // given (前提条件):
        let registry = Arc::new(InMemoryParticipantRegistry::new());

        // when (操作): 50 タスクが追加→命名→削除を行い、うち偶数番は残す
        let mut handles = Vec::new();
        for i in 0..50 {
            let registry = registry.clone();
            handles.push(tokio::spawn(async move {
                let (tx, rx) = mpsc::unbounded_channel();
                let id = registry.add(tx, None).await.unwrap();
                registry
                    .set_display_name(id, DisplayName::new(&format!("user-{i}")).unwrap())
                    .await
                    .unwrap();
                if i % 2 == 1 {
                    registry.remove(id).await;
                }
                rx
            }));
        }
        let mut receivers = Vec::new();
        for handle in handles {
            receivers.push(handle.await.unwrap());
        }

        // then (期待する結果):
        assert_eq!(registry.count().await, 25);
        let snapshot = registry.snapshot().await;
        assert_eq!(snapshot.len(), 25);
        assert!(
            snapshot
                .iter()
                .all(|n| n.as_str().trim_start_matches("user-").parse::<u32>().unwrap() % 2 == 0)
        );
    }
}
