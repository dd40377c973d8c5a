use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::application::ports::handoff::PendingPostSlot;
use crate::domain::entities::Post;

/// プロセス内の受け渡しスロット
#[derive(Default)]
pub struct InMemoryPendingPostSlot {
    slot: Mutex<Option<Post>>,
}

impl InMemoryPendingPostSlot {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl PendingPostSlot for InMemoryPendingPostSlot {
    async fn put(&self, post: Post) {
        *self.slot.lock().await = Some(post);
    }

    async fn take(&self) -> Option<Post> {
        self.slot.lock().await.take()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::PostAuthor;

    #[tokio::test]
    async fn test_take_consumes_the_slot() {
        let slot = InMemoryPendingPostSlot::new();
        let post = Post::new(
            "hello".to_string(),
            PostAuthor {
                user_id: "user1".to_string(),
                display_name: "Test User".to_string(),
                avatar_url: None,
            },
        );

        assert!(slot.take().await.is_none());

        slot.put(post.clone()).await;
        let taken = slot.take().await.unwrap();
        assert_eq!(taken.id, post.id);

        // 2回目は空
        assert!(slot.take().await.is_none());
    }
}
