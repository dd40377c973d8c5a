pub mod feed_gateway;
pub mod handoff;
pub mod key_value_store;
pub mod location;
pub mod snapshot_cache;

pub use feed_gateway::{FeedGateway, FeedLocation, FeedPage, NearbyQuery};
pub use handoff::PendingPostSlot;
pub use key_value_store::{KeyValueStore, StoreError};
pub use location::LocationResolver;
pub use snapshot_cache::SnapshotStore;
