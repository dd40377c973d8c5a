use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// フィード表示に必要な最小限の投稿者情報
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PostAuthor {
    pub user_id: String,
    pub display_name: String,
    pub avatar_url: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Post {
    pub id: String,
    pub content: String,
    pub author: PostAuthor,
    pub created_at: DateTime<Utc>,
    pub hashtags: Vec<String>,
    pub likes: u32,
    pub comments: u32,
    pub image_url: Option<String>,
    pub distance_km: Option<f64>,
}

impl Post {
    pub fn new(content: String, author: PostAuthor) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            content,
            author,
            created_at: chrono::Utc::now(),
            hashtags: Vec::new(),
            likes: 0,
            comments: 0,
            image_url: None,
            distance_km: None,
        }
    }

    pub fn with_hashtags(mut self, hashtags: Vec<String>) -> Self {
        self.hashtags = hashtags;
        self
    }

    pub fn increment_likes(&mut self) {
        self.likes += 1;
    }

    pub fn decrement_likes(&mut self) {
        if self.likes > 0 {
            self.likes -= 1;
        }
    }

    pub fn increment_comments(&mut self) {
        self.comments += 1;
    }
}
