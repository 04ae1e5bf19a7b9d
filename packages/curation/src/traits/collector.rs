//! Collector trait for article collection.

use async_trait::async_trait;

use crate::error::Result;
use crate::types::{article::Article, config::TimeWindow};

/// Source of raw candidate articles.
///
/// Implementations query an upstream news source per keyword and
/// return articles already in [`Article`] shape. The result may
/// contain duplicate URLs across keyword variants; the pipeline does
/// not assume pre-deduplication.
#[async_trait]
pub trait Collector: Send + Sync {
    /// Fetch up to `max_results` articles published inside `window`.
    async fn fetch_articles(
        &self,
        keywords: &[String],
        window: &TimeWindow,
        max_results: usize,
    ) -> Result<Vec<Article>>;
}
