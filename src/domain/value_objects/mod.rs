pub mod coordinates;
pub mod hashtag;

pub use coordinates::Coordinates;
pub use hashtag::Hashtag;
