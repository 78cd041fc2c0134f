//! SQLite Message Log 実装
//!
//! `messages` テーブルに追記専用でチャットメッセージを保存します。
//! `id` は自動採番され、直近履歴は id の降順で取得したのち古い順に並べ替えて返します。

use std::str::FromStr;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{
    SqlitePool,
    sqlite::{SqliteConnectOptions, SqlitePoolOptions},
};

use crate::domain::{ChatMessage, DisplayName, MessageLog, MessageText, StorageError, Timestamp};

const CREATE_MESSAGES_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS messages (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    sender_name TEXT NOT NULL,
    message_text TEXT NOT NULL,
    created_at TEXT NOT NULL
)
"#;

#[derive(sqlx::FromRow)]
struct MessageRow {
    sender_name: String,
    message_text: String,
    created_at: DateTime<Utc>,
}

impl TryFrom<MessageRow> for ChatMessage {
    type Error = StorageError;

    fn try_from(row: MessageRow) -> Result<Self, Self::Error> {
        let sender_name = DisplayName::new(&row.sender_name)
            .map_err(|e| StorageError::new(format!("corrupt sender_name: {e}")))?;
        let text = MessageText::new(&row.message_text)
            .map_err(|e| StorageError::new(format!("corrupt message_text: {e}")))?;
        Ok(ChatMessage::new(
            sender_name,
            text,
            Timestamp::new(row.created_at),
        ))
    }
}

fn storage_error(err: sqlx::Error) -> StorageError {
    StorageError::new(err.to_string())
}

/// SQLite Message Log 実装
#[derive(Clone)]
pub struct SqliteMessageLog {
    pool: SqlitePool,
}

impl SqliteMessageLog {
    /// データベース URL に接続し、テーブルがなければ作成する
    ///
    /// # Arguments
    ///
    /// * `database_url` - 例: `sqlite://hiroba.db`
    pub async fn connect(database_url: &str) -> Result<Self, StorageError> {
        let options = SqliteConnectOptions::from_str(database_url)
            .map_err(storage_error)?
            .create_if_missing(true);
        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect_with(options)
            .await
            .map_err(storage_error)?;
        Self::from_pool(pool).await
    }

    /// インメモリの SQLite データベースを使用する
    ///
    /// `sqlite::memory:` は接続ごとに別のデータベースになるため、接続数は 1 に固定する。
    pub async fn in_memory() -> Result<Self, StorageError> {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .map_err(storage_error)?;
        Self::from_pool(pool).await
    }

    /// 既存のプールから作成する
    pub async fn from_pool(pool: SqlitePool) -> Result<Self, StorageError> {
        sqlx::query(CREATE_MESSAGES_TABLE)
            .execute(&pool)
            .await
            .map_err(storage_error)?;
        Ok(Self { pool })
    }

    /// プールを閉じる
    pub async fn close(&self) {
        self.pool.close().await;
    }
}

#[async_trait]
impl MessageLog for SqliteMessageLog {
    async fn append(
        &self,
        sender_name: DisplayName,
        text: MessageText,
    ) -> Result<ChatMessage, StorageError> {
        let created_at = Timestamp::now();

        sqlx::query(
            r#"
            INSERT INTO messages (sender_name, message_text, created_at)
            VALUES (?, ?, ?)
            "#,
        )
        .bind(sender_name.as_str())
        .bind(text.as_str())
        .bind(created_at.value())
        .execute(&self.pool)
        .await
        .map_err(storage_error)?;

        Ok(ChatMessage::new(sender_name, text, created_at))
    }

    async fn recent_history(&self, limit: usize) -> Result<Vec<ChatMessage>, StorageError> {
        let limit = i64::try_from(limit).unwrap_or(i64::MAX);

        let rows = sqlx::query_as::<_, MessageRow>(
            r#"
            SELECT sender_name, message_text, created_at
            FROM messages
            ORDER BY id DESC
            LIMIT ?
            "#,
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await
        .map_err(storage_error)?;

        // Invalid rows are skipped, not fatal
        let messages = rows
            .into_iter()
            .rev()
            .filter_map(|row| match ChatMessage::try_from(row) {
                Ok(message) => Some(message),
                Err(e) => {
                    tracing::warn!("Skipping unreadable history row: {}", e);
                    None
                }
            })
            .collect();

        Ok(messages)
    }
}
