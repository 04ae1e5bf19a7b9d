//! Collector implementations.

pub mod google_news;
pub mod rate_limited;

pub use google_news::GoogleNewsCollector;
pub use rate_limited::{CollectorExt, RateLimitedCollector};
