use async_trait::async_trait;

use crate::domain::entities::Post;

/// 投稿作成フローからフィード画面へ1件だけ受け渡すスロット
#[async_trait]
pub trait PendingPostSlot: Send + Sync {
    /// 作成済み投稿を格納する(前の値は置き換え)
    async fn put(&self, post: Post);

    /// 消費して空にする
    async fn take(&self) -> Option<Post>;
}
