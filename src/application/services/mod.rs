pub mod feed_service;
pub mod freshness_policy;
pub mod refresh_scheduler;

pub use feed_service::{FeedEvent, FeedMode, FeedService, FeedViewState};
pub use freshness_policy::FreshnessPolicy;
pub use refresh_scheduler::{RefreshCycle, RefreshScheduler};
