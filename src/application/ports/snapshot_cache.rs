use async_trait::async_trait;

use crate::domain::entities::{FeedSnapshot, Post};

/// フィードスナップショット永続化のポート
///
/// スナップショットは1件のみで、書き込みは常に全置換。
/// 永続層の失敗は呼び出し側に伝播しない: 読み込み失敗は None、
/// 書き込み失敗は no-op になる。
#[async_trait]
pub trait SnapshotStore: Send + Sync {
    /// 新しいスナップショットを構築して保存する
    async fn save(&self, posts: &[Post], location_label: &str);

    async fn load(&self) -> Option<FeedSnapshot>;

    /// 既存スナップショットの先頭に1件追加して保存し直す
    async fn append_one(&self, post: &Post);

    async fn clear(&self);
}
