//! Rate-limited collector wrapper.
//!
//! Wraps any Collector implementation with rate limiting using the
//! governor crate, so a briefing over many subjects stays polite to
//! the upstream feed.

use async_trait::async_trait;
use governor::{Quota, RateLimiter};
use nonzero_ext::nonzero;
use std::num::NonZeroU32;
use std::sync::Arc;

use crate::error::Result;
use crate::traits::collector::Collector;
use crate::types::{article::Article, config::TimeWindow};

type DefaultRateLimiter = RateLimiter<
    governor::state::NotKeyed,
    governor::state::InMemoryState,
    governor::clock::DefaultClock,
>;

/// A collector wrapper that enforces rate limits on fetches.
pub struct RateLimitedCollector<C: Collector> {
    inner: C,
    limiter: Arc<DefaultRateLimiter>,
}

impl<C: Collector> RateLimitedCollector<C> {
    /// Create a new rate-limited collector.
    ///
    /// # Arguments
    /// * `collector` - The underlying collector to wrap
    /// * `requests_per_second` - Maximum fetches per second
    pub fn new(collector: C, requests_per_second: u32) -> Self {
        let quota = Quota::per_second(
            NonZeroU32::new(requests_per_second).unwrap_or(nonzero!(1u32)),
        );
        Self {
            inner: collector,
            limiter: Arc::new(RateLimiter::direct(quota)),
        }
    }

    /// Create with a custom quota.
    pub fn with_quota(collector: C, quota: Quota) -> Self {
        Self {
            inner: collector,
            limiter: Arc::new(RateLimiter::direct(quota)),
        }
    }

    /// Get a reference to the wrapped collector.
    pub fn inner(&self) -> &C {
        &self.inner
    }
}

#[async_trait]
impl<C: Collector> Collector for RateLimitedCollector<C> {
    async fn fetch_articles(
        &self,
        keywords: &[String],
        window: &TimeWindow,
        max_results: usize,
    ) -> Result<Vec<Article>> {
        self.limiter.until_ready().await;
        self.inner.fetch_articles(keywords, window, max_results).await
    }
}

/// Extension trait for easy rate limiting.
pub trait CollectorExt: Collector + Sized {
    /// Wrap this collector with rate limiting.
    fn rate_limited(self, requests_per_second: u32) -> RateLimitedCollector<Self> {
        RateLimitedCollector::new(self, requests_per_second)
    }
}

impl<C: Collector + Sized> CollectorExt for C {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::MockCollector;
    use chrono::{Duration, Utc};
    use std::time::Instant;

    fn window() -> TimeWindow {
        let now = Utc::now();
        TimeWindow::new(now - Duration::days(1), now)
    }

    #[tokio::test]
    async fn test_rate_limiting_spaces_out_fetches() {
        let collector = MockCollector::new()
            .with_articles(vec![Article::new("기사", "https://a.com/1")])
            .rate_limited(2);

        let start = Instant::now();
        for _ in 0..3 {
            collector
                .fetch_articles(&["키워드".to_string()], &window(), 10)
                .await
                .unwrap();
        }
        let elapsed = start.elapsed();

        assert_eq!(collector.inner().calls().len(), 3);
        // 3 fetches at 2/sec: the first is immediate, the rest wait.
        assert!(elapsed.as_millis() >= 500, "rate limiting not applied: {elapsed:?}");
    }

    #[tokio::test]
    async fn test_passes_through_results() {
        let collector = MockCollector::new()
            .with_articles(vec![Article::new("기사", "https://a.com/1")])
            .rate_limited(100);

        let batch = collector
            .fetch_articles(&["키워드".to_string()], &window(), 10)
            .await
            .unwrap();
        assert_eq!(batch.len(), 1);
    }
}
