pub mod cache;
pub mod handoff;
pub mod location;
pub mod storage;
