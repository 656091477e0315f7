//! Data-source adapters: the HTTP clients and in-memory feeds behind the
//! `RankTracker`, `SerpSource` and `NewsSource` capabilities.

pub mod news;
pub mod rank_tracker;
pub mod serp;

pub use news::StaticNewsSource;
pub use rank_tracker::HttpRankTracker;
pub use serp::HttpSerpSource;
