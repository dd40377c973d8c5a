// モジュール定義
pub mod application;
pub mod domain;
pub mod infrastructure;
pub mod shared;

pub use application::ports::{
    FeedGateway, FeedLocation, FeedPage, KeyValueStore, LocationResolver, NearbyQuery,
    PendingPostSlot, SnapshotStore, StoreError,
};
pub use application::services::{
    FeedEvent, FeedMode, FeedService, FeedViewState, FreshnessPolicy, RefreshCycle,
    RefreshScheduler,
};
pub use domain::entities::{FeedSnapshot, Post, PostAuthor};
pub use domain::value_objects::{Coordinates, Hashtag};
pub use infrastructure::cache::FeedSnapshotCache;
pub use infrastructure::handoff::InMemoryPendingPostSlot;
pub use infrastructure::location::StaticLocationResolver;
pub use infrastructure::storage::{MemoryKeyValueStore, SqliteKeyValueStore};
pub use shared::config::FeedConfig;
pub use shared::error::{AppError, Result};

/// ログ設定の初期化(アプリ起動時に一度だけ呼ぶ)
pub fn init_logging() {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "machikado_feed=debug,info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}
