pub mod feed_snapshot;
pub mod post;

pub use feed_snapshot::FeedSnapshot;
pub use post::{Post, PostAuthor};
