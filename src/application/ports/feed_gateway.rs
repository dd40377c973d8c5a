use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::domain::entities::Post;
use crate::domain::value_objects::{Coordinates, Hashtag};
use crate::shared::error::AppError;

/// 位置の説明が無いときに使う表示ラベル
pub const FALLBACK_LOCATION_LABEL: &str = "Nearby";

/// 近隣フィード取得のクエリ
#[derive(Debug, Clone)]
pub struct NearbyQuery {
    pub center: Coordinates,
    pub radius_km: f64,
    pub limit: u32,
}

/// フェッチ結果に付随する位置の説明
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FeedLocation {
    pub city: Option<String>,
    pub country: Option<String>,
}

impl FeedLocation {
    /// 表示用ラベル。市区町村と国を ", " で連結し、どちらも無ければフォールバック
    pub fn label(&self) -> String {
        let parts: Vec<&str> = [self.city.as_deref(), self.country.as_deref()]
            .into_iter()
            .flatten()
            .map(str::trim)
            .filter(|part| !part.is_empty())
            .collect();
        if parts.is_empty() {
            FALLBACK_LOCATION_LABEL.to_string()
        } else {
            parts.join(", ")
        }
    }
}

/// サーバから返る1ページ分のフィード
#[derive(Debug, Clone)]
pub struct FeedPage {
    pub posts: Vec<Post>,
    pub location: Option<FeedLocation>,
}

impl FeedPage {
    pub fn location_label(&self) -> String {
        self.location
            .as_ref()
            .map(FeedLocation::label)
            .unwrap_or_else(|| FALLBACK_LOCATION_LABEL.to_string())
    }
}

/// リモートフィード API の狭いポート
#[async_trait]
pub trait FeedGateway: Send + Sync {
    /// 座標周辺の投稿を取得する
    async fn fetch_nearby(&self, query: NearbyQuery) -> Result<FeedPage, AppError>;

    /// ハッシュタグでフィルタした投稿を取得する
    async fn fetch_hashtag(&self, tag: &Hashtag, limit: u32) -> Result<FeedPage, AppError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_label_joins_city_and_country() {
        let location = FeedLocation {
            city: Some("Shibuya".to_string()),
            country: Some("Japan".to_string()),
        };
        assert_eq!(location.label(), "Shibuya, Japan");
    }

    #[test]
    fn test_label_skips_blank_parts() {
        let location = FeedLocation {
            city: Some("  ".to_string()),
            country: Some("Japan".to_string()),
        };
        assert_eq!(location.label(), "Japan");
    }

    #[test]
    fn test_label_falls_back_when_empty() {
        assert_eq!(FeedLocation::default().label(), FALLBACK_LOCATION_LABEL);
        let page = FeedPage {
            posts: Vec::new(),
            location: None,
        };
        assert_eq!(page.location_label(), FALLBACK_LOCATION_LABEL);
    }
}
