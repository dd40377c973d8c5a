use super::post::Post;
use chrono::Utc;
use serde::{Deserialize, Serialize};

/// ホームフィードの永続スナップショット
///
/// `lead_post_id` は書き込み時点の先頭投稿 id。新着検出の安価な手がかりで、
/// 常に `posts` の先頭と一致する(空リストなら None)。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeedSnapshot {
    pub posts: Vec<Post>,
    pub location_label: String,
    /// 保存時刻(エポックミリ秒)
    pub captured_at: i64,
    pub lead_post_id: Option<String>,
}

impl FeedSnapshot {
    /// 現在時刻でスナップショットを構築する
    pub fn capture(posts: Vec<Post>, location_label: String) -> Self {
        Self::capture_at(posts, location_label, Utc::now().timestamp_millis())
    }

    pub fn capture_at(posts: Vec<Post>, location_label: String, captured_at: i64) -> Self {
        let lead_post_id = posts.first().map(|post| post.id.clone());
        Self {
            posts,
            location_label,
            captured_at,
            lead_post_id,
        }
    }

    /// 保存からの経過秒数(切り捨て)
    pub fn age_seconds(&self) -> i64 {
        self.age_seconds_at(Utc::now().timestamp_millis())
    }

    pub fn age_seconds_at(&self, now_ms: i64) -> i64 {
        (now_ms - self.captured_at).div_euclid(1000)
    }

    pub fn is_empty(&self) -> bool {
        self.posts.is_empty()
    }
}
