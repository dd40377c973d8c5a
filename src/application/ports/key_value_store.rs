use async_trait::async_trait;
use thiserror::Error;

use crate::shared::error::AppError;

/// キー値永続化プロバイダのエラー
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Storage backend error: {0}")]
    Backend(String),

    #[error("Serialization failed: {0}")]
    Serialization(String),
}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        StoreError::Backend(err.to_string())
    }
}

impl From<serde_json::Error> for StoreError {
    fn from(err: serde_json::Error) -> Self {
        StoreError::Serialization(err.to_string())
    }
}

impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Backend(msg) => AppError::Storage(msg),
            StoreError::Serialization(msg) => AppError::SerializationError(msg),
        }
    }
}

/// 文字列キー値ストアの非同期ポート
///
/// どの操作も失敗しうる。キャッシュ層は失敗を「値なし」/no-op として扱う。
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<String>, StoreError>;

    async fn set(&self, key: &str, value: String) -> Result<(), StoreError>;

    async fn remove(&self, key: &str) -> Result<(), StoreError>;
}
