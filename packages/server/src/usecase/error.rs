//! UseCase 層のエラー定義

use thiserror::Error;

use crate::domain::{RegistryError, StorageError, ValueObjectError};

/// 参加者接続のエラー
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConnectError {
    /// レジストリの上限に達している
    #[error("Registry is full: maximum {capacity} participants allowed")]
    RegistryFull { capacity: usize },

    /// その他のレジストリエラー
    #[error(transparent)]
    Registry(RegistryError),
}

/// 表示名設定のエラー
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SetNameError {
    /// 表示名が不正（空、または長すぎる）
    #[error("Invalid name: {0}")]
    InvalidName(ValueObjectError),

    /// 参加者がレジストリに存在しない（切断処理と競合した場合）
    #[error("Participant is not registered")]
    NotRegistered,
}

/// メッセージ送信のエラー
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SendMessageError {
    /// トリム後のメッセージが空（黙って破棄する）
    #[error("Message is empty")]
    EmptyMessage,

    /// メッセージが不正（長すぎる）
    #[error("Invalid message: {0}")]
    InvalidText(ValueObjectError),

    /// メッセージログへの書き込みに失敗
    #[error(transparent)]
    Storage(#[from] StorageError),
}
