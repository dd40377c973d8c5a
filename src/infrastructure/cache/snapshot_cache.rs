use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, warn};

use crate::application::ports::key_value_store::KeyValueStore;
use crate::application::ports::snapshot_cache::SnapshotStore;
use crate::domain::entities::{FeedSnapshot, Post};

/// スナップショットを格納する固定キー
pub const FEED_SNAPSHOT_KEY: &str = "home_feed_snapshot";

/// ホームフィードスナップショットの永続キャッシュ
///
/// 論理フィードにつきスナップショットは常に1件で、書き込みは全置換。
/// 永続層の失敗はすべてここで飲み込む: 読み出し失敗はキャッシュミス、
/// 書き込み失敗は no-op に縮退し、呼び出し側には何も伝播しない。
pub struct FeedSnapshotCache {
    store: Arc<dyn KeyValueStore>,
}

impl FeedSnapshotCache {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    async fn write_snapshot(&self, snapshot: &FeedSnapshot) {
        let payload = match serde_json::to_string(snapshot) {
            Ok(payload) => payload,
            Err(err) => {
                warn!(error = %err, "failed to serialize feed snapshot");
                return;
            }
        };
        if let Err(err) = self.store.set(FEED_SNAPSHOT_KEY, payload).await {
            warn!(error = %err, "failed to persist feed snapshot");
        }
    }
}

#[async_trait]
impl SnapshotStore for FeedSnapshotCache {
    async fn save(&self, posts: &[Post], location_label: &str) {
        let snapshot = FeedSnapshot::capture(posts.to_vec(), location_label.to_string());
        self.write_snapshot(&snapshot).await;
    }

    async fn load(&self) -> Option<FeedSnapshot> {
        let payload = match self.store.get(FEED_SNAPSHOT_KEY).await {
            Ok(Some(payload)) => payload,
            Ok(None) => return None,
            Err(err) => {
                warn!(error = %err, "feed snapshot read failed, treating as cache miss");
                return None;
            }
        };

        match serde_json::from_str(&payload) {
            Ok(snapshot) => Some(snapshot),
            Err(err) => {
                warn!(error = %err, "feed snapshot payload malformed, treating as cache miss");
                None
            }
        }
    }

    async fn append_one(&self, post: &Post) {
        let Some(snapshot) = self.load().await else {
            debug!("append skipped: no cached feed snapshot");
            return;
        };

        let mut posts = snapshot.posts;
        posts.insert(0, post.clone());
        let snapshot = FeedSnapshot::capture(posts, snapshot.location_label);
        self.write_snapshot(&snapshot).await;
    }

    async fn clear(&self) {
        if let Err(err) = self.store.remove(FEED_SNAPSHOT_KEY).await {
            warn!(error = %err, "failed to clear feed snapshot");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::ports::key_value_store::StoreError;
    use crate::domain::entities::PostAuthor;
    use crate::infrastructure::storage::MemoryKeyValueStore;

    struct FailingStore;

    #[async_trait]
    impl KeyValueStore for FailingStore {
        async fn get(&self, _key: &str) -> Result<Option<String>, StoreError> {
            Err(StoreError::Backend("disk unavailable".to_string()))
        }

        async fn set(&self, _key: &str, _value: String) -> Result<(), StoreError> {
            Err(StoreError::Backend("disk unavailable".to_string()))
        }

        async fn remove(&self, _key: &str) -> Result<(), StoreError> {
            Err(StoreError::Backend("disk unavailable".to_string()))
        }
    }

    fn create_test_post(id: &str) -> Post {
        Post {
            id: id.to_string(),
            content: format!("post {id}"),
            author: PostAuthor {
                user_id: "user1".to_string(),
                display_name: "Test User".to_string(),
                avatar_url: None,
            },
            created_at: chrono::Utc::now(),
            hashtags: Vec::new(),
            likes: 0,
            comments: 0,
            image_url: None,
            distance_km: None,
        }
    }

    fn memory_cache() -> (FeedSnapshotCache, MemoryKeyValueStore) {
        let store = MemoryKeyValueStore::new();
        (FeedSnapshotCache::new(Arc::new(store.clone())), store)
    }

    #[tokio::test]
    async fn test_save_then_load_round_trips() {
        let (cache, _store) = memory_cache();
        let posts = vec![create_test_post("a"), create_test_post("b")];

        cache.save(&posts, "Shibuya, Japan").await;
        let snapshot = cache.load().await.expect("snapshot present");

        assert_eq!(snapshot.posts.len(), 2);
        assert_eq!(snapshot.posts[0].id, "a");
        assert_eq!(snapshot.location_label, "Shibuya, Japan");
        assert_eq!(snapshot.lead_post_id.as_deref(), Some("a"));
    }

    #[tokio::test]
    async fn test_save_empty_posts_has_no_lead() {
        let (cache, _store) = memory_cache();

        cache.save(&[], "Nearby").await;
        let snapshot = cache.load().await.unwrap();

        assert!(snapshot.posts.is_empty());
        assert!(snapshot.lead_post_id.is_none());
    }

    #[tokio::test]
    async fn test_save_replaces_previous_snapshot() {
        let (cache, _store) = memory_cache();

        cache.save(&[create_test_post("old")], "Nearby").await;
        cache.save(&[create_test_post("new")], "Shibuya, Japan").await;

        let snapshot = cache.load().await.unwrap();
        assert_eq!(snapshot.posts.len(), 1);
        assert_eq!(snapshot.lead_post_id.as_deref(), Some("new"));
        assert_eq!(snapshot.location_label, "Shibuya, Japan");
    }

    #[tokio::test]
    async fn test_append_one_prepends_and_updates_lead() {
        let (cache, _store) = memory_cache();
        cache
            .save(&[create_test_post("a"), create_test_post("b")], "Nearby")
            .await;

        cache.append_one(&create_test_post("p")).await;
        let snapshot = cache.load().await.unwrap();

        let ids: Vec<&str> = snapshot.posts.iter().map(|post| post.id.as_str()).collect();
        assert_eq!(ids, vec!["p", "a", "b"]);
        assert_eq!(snapshot.lead_post_id.as_deref(), Some("p"));
        assert_eq!(snapshot.location_label, "Nearby");
    }

    #[tokio::test]
    async fn test_append_one_without_snapshot_is_noop() {
        let (cache, store) = memory_cache();

        cache.append_one(&create_test_post("p")).await;

        assert!(cache.load().await.is_none());
        assert!(store.get(FEED_SNAPSHOT_KEY).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_load_treats_backend_failure_as_miss() {
        let cache = FeedSnapshotCache::new(Arc::new(FailingStore));
        assert!(cache.load().await.is_none());
    }

    #[tokio::test]
    async fn test_load_treats_malformed_payload_as_miss() {
        let (cache, store) = memory_cache();
        store
            .set(FEED_SNAPSHOT_KEY, "not json at all".to_string())
            .await
            .unwrap();

        assert!(cache.load().await.is_none());
    }

    #[tokio::test]
    async fn test_write_failures_are_swallowed() {
        let cache = FeedSnapshotCache::new(Arc::new(FailingStore));

        // どれも panic もエラー伝播もしないこと
        cache.save(&[create_test_post("a")], "Nearby").await;
        cache.append_one(&create_test_post("b")).await;
        cache.clear().await;
    }

    #[tokio::test]
    async fn test_clear_removes_snapshot() {
        let (cache, _store) = memory_cache();
        cache.save(&[create_test_post("a")], "Nearby").await;

        cache.clear().await;

        assert!(cache.load().await.is_none());
    }
}
