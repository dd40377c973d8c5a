use std::path::{Path, PathBuf};

use async_trait::async_trait;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::{Pool, Sqlite};
use tracing::info;

use crate::application::ports::key_value_store::{KeyValueStore, StoreError};

const CREATE_KV_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS kv_entries (
    key TEXT PRIMARY KEY,
    value TEXT NOT NULL,
    updated_at INTEGER NOT NULL
)
"#;

const UPSERT_ENTRY: &str = r#"
INSERT INTO kv_entries (key, value, updated_at)
VALUES (?1, ?2, ?3)
ON CONFLICT(key) DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at
"#;

const SELECT_ENTRY: &str = "SELECT value FROM kv_entries WHERE key = ?1";

const DELETE_ENTRY: &str = "DELETE FROM kv_entries WHERE key = ?1";

/// SQLite ベースのキー値ストア
pub struct SqliteKeyValueStore {
    pool: Pool<Sqlite>,
}

impl SqliteKeyValueStore {
    /// 既存プールの上に構築し、スキーマを保証する
    pub async fn new(pool: Pool<Sqlite>) -> Result<Self, StoreError> {
        sqlx::query(CREATE_KV_TABLE).execute(&pool).await?;
        Ok(Self { pool })
    }

    /// ファイルパスを指定して開く(無ければ作成)
    pub async fn open(path: &Path) -> Result<Self, StoreError> {
        let options = SqliteConnectOptions::new()
            .filename(path)
            .create_if_missing(true);
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect_with(options)
            .await?;
        info!(path = %path.display(), "opened feed cache store");
        Self::new(pool).await
    }

    /// プラットフォーム標準のデータディレクトリ配下に開く
    pub async fn open_default() -> Result<Self, StoreError> {
        let base = dirs::data_local_dir().unwrap_or_else(|| PathBuf::from("./data"));
        let dir = base.join("machikado");
        std::fs::create_dir_all(&dir).map_err(|err| StoreError::Backend(err.to_string()))?;
        Self::open(&dir.join("feed_cache.db")).await
    }
}

#[async_trait]
impl KeyValueStore for SqliteKeyValueStore {
    async fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        let row: Option<(String,)> = sqlx::query_as(SELECT_ENTRY)
            .bind(key)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(|(value,)| value))
    }

    async fn set(&self, key: &str, value: String) -> Result<(), StoreError> {
        sqlx::query(UPSERT_ENTRY)
            .bind(key)
            .bind(&value)
            .bind(chrono::Utc::now().timestamp_millis())
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<(), StoreError> {
        sqlx::query(DELETE_ENTRY)
            .bind(key)
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sqlx::sqlite::SqlitePoolOptions;

    async fn setup_store() -> SqliteKeyValueStore {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .unwrap();
        SqliteKeyValueStore::new(pool).await.unwrap()
    }

    #[tokio::test]
    async fn test_set_get_remove() {
        let store = setup_store().await;

        assert!(store.get("k").await.unwrap().is_none());

        store.set("k", "v1".to_string()).await.unwrap();
        assert_eq!(store.get("k").await.unwrap().as_deref(), Some("v1"));

        store.remove("k").await.unwrap();
        assert!(store.get("k").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_set_overwrites_existing_value() {
        let store = setup_store().await;

        store.set("k", "v1".to_string()).await.unwrap();
        store.set("k", "v2".to_string()).await.unwrap();

        assert_eq!(store.get("k").await.unwrap().as_deref(), Some("v2"));
    }

    #[tokio::test]
    async fn test_values_survive_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("feed_cache.db");

        {
            let store = SqliteKeyValueStore::open(&path).await.unwrap();
            store.set("k", "persisted".to_string()).await.unwrap();
        }

        let store = SqliteKeyValueStore::open(&path).await.unwrap();
        assert_eq!(store.get("k").await.unwrap().as_deref(), Some("persisted"));
    }
}
