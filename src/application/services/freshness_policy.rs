use std::collections::HashSet;

use chrono::Utc;

use crate::domain::entities::{FeedSnapshot, Post};

/// キャッシュ鮮度の判定ポリシー
///
/// 状態を持たない純粋な判定のみ。副作用なし。
#[derive(Debug, Clone, Copy)]
pub struct FreshnessPolicy {
    stale_after_ms: i64,
}

impl FreshnessPolicy {
    pub fn new(stale_after_secs: u64) -> Self {
        Self {
            stale_after_ms: (stale_after_secs as i64) * 1000,
        }
    }

    /// 最終フェッチからの経過が閾値を厳密に超えたら true
    pub fn is_stale(&self, last_fetch_ms: i64) -> bool {
        self.is_stale_at(last_fetch_ms, Utc::now().timestamp_millis())
    }

    pub fn is_stale_at(&self, last_fetch_ms: i64, now_ms: i64) -> bool {
        now_ms - last_fetch_ms > self.stale_after_ms
    }

    /// 候補リストにキャッシュ未知の投稿 id が含まれるか
    ///
    /// 投票数などの内容変化では発火しない。id でのみ比較する。
    /// 先頭 id の不一致は既知投稿の並べ替えでも起きるため、
    /// それ自体では新着と断定せず、未知 id の有無まで確認する。
    pub fn has_newer_posts(&self, snapshot: &FeedSnapshot, candidates: &[Post]) -> bool {
        let Some(lead_id) = snapshot.lead_post_id.as_deref() else {
            return false;
        };
        let Some(candidate_lead) = candidates.first() else {
            return false;
        };

        let cached_ids: HashSet<&str> = snapshot
            .posts
            .iter()
            .map(|post| post.id.as_str())
            .collect();

        if candidate_lead.id != lead_id && !cached_ids.contains(candidate_lead.id.as_str()) {
            return true;
        }

        candidates
            .iter()
            .any(|post| !cached_ids.contains(post.id.as_str()))
    }
}

impl Default for FreshnessPolicy {
    fn default() -> Self {
        Self::new(crate::shared::config::FeedConfig::default().cache.stale_after_secs)
    }
}
