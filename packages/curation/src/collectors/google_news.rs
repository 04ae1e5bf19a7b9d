//! Google News RSS collector.
//!
//! Queries the Google News search feed once per keyword and
//! concatenates the results. Articles arriving under several keyword
//! variants are returned as-is; deduplication is the pipeline's job.

use regex::Regex;
use reqwest::Client;
use tracing::{debug, warn};

use crate::error::{CurationError, Result};
use crate::traits::collector::Collector;
use crate::types::{
    article::{parse_published, Article},
    config::TimeWindow,
};
use async_trait::async_trait;

const FEED_URL: &str = "https://news.google.com/rss/search";

/// Collector backed by the Google News RSS search feed.
pub struct GoogleNewsCollector {
    client: Client,
    /// Feed locale, e.g. `ko` / `KR`.
    language: String,
    country: String,
    item_re: Regex,
    title_re: Regex,
    link_re: Regex,
    pub_date_re: Regex,
    source_re: Regex,
    description_re: Regex,
}

impl Default for GoogleNewsCollector {
    fn default() -> Self {
        Self::new()
    }
}

impl GoogleNewsCollector {
    pub fn new() -> Self {
        let tag = |name: &str| {
            Regex::new(&format!(
                r"(?s)<{name}[^>]*>\s*(?:<!\[CDATA\[)?(.*?)(?:\]\]>)?\s*</{name}>"
            ))
            .unwrap()
        };
        Self {
            client: Client::new(),
            language: "ko".to_string(),
            country: "KR".to_string(),
            item_re: Regex::new(r"(?s)<item>(.*?)</item>").unwrap(),
            title_re: tag("title"),
            link_re: tag("link"),
            pub_date_re: tag("pubDate"),
            source_re: tag("source"),
            description_re: tag("description"),
        }
    }

    /// Set the feed locale (default: ko / KR).
    pub fn with_locale(mut self, language: impl Into<String>, country: impl Into<String>) -> Self {
        self.language = language.into();
        self.country = country.into();
        self
    }

    async fn fetch_feed(&self, keyword: &str) -> Result<String> {
        let ceid = format!("{}:{}", self.country, self.language);
        let response = self
            .client
            .get(FEED_URL)
            .query(&[
                ("q", keyword),
                ("hl", self.language.as_str()),
                ("gl", self.country.as_str()),
                ("ceid", ceid.as_str()),
            ])
            .send()
            .await
            .map_err(CurationError::collect)?;

        if !response.status().is_success() {
            return Err(CurationError::collect(format!(
                "Google News feed returned {}",
                response.status()
            )));
        }
        response.text().await.map_err(CurationError::collect)
    }

    /// Parse one RSS document into articles inside the window.
    fn parse_feed(&self, body: &str, window: &TimeWindow) -> Vec<Article> {
        let field = |re: &Regex, block: &str| -> String {
            re.captures(block)
                .map(|c| unescape(c[1].trim()))
                .unwrap_or_default()
        };

        let mut articles = vec![];
        for item in self.item_re.captures_iter(body) {
            let block = &item[1];

            let title = field(&self.title_re, block);
            let url = field(&self.link_re, block);
            if title.is_empty() || url.is_empty() {
                continue;
            }

            let article = Article::new(title, url)
                .with_press(field(&self.source_re, block))
                .with_published_at(field(&self.pub_date_re, block))
                .with_content(strip_tags(&field(&self.description_re, block)));

            match parse_published(&article.published_at) {
                Some(at) if !window.contains(at) => continue,
                None => {
                    debug!(published_at = %article.published_at, "unparsable pubDate; keeping article");
                }
                _ => {}
            }
            articles.push(article);
        }
        articles
    }
}

// &amp; goes last so double-escaped input like &amp;lt; stays &lt;.
fn unescape(text: &str) -> String {
    text.replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&amp;", "&")
}

fn strip_tags(html: &str) -> String {
    let mut out = String::with_capacity(html.len());
    let mut in_tag = false;
    for ch in html.chars() {
        match ch {
            '<' => in_tag = true,
            '>' => in_tag = false,
            c if !in_tag => out.push(c),
            _ => {}
        }
    }
    out.trim().to_string()
}

#[async_trait]
impl Collector for GoogleNewsCollector {
    async fn fetch_articles(
        &self,
        keywords: &[String],
        window: &TimeWindow,
        max_results: usize,
    ) -> Result<Vec<Article>> {
        let mut articles = vec![];
        for keyword in keywords {
            match self.fetch_feed(keyword).await {
                Ok(body) => {
                    let parsed = self.parse_feed(&body, window);
                    debug!(keyword = %keyword, count = parsed.len(), "feed parsed");
                    articles.extend(parsed);
                }
                // One keyword failing should not lose the others.
                Err(err) => warn!(keyword = %keyword, error = %err, "feed fetch failed"),
            }
            if articles.len() >= max_results {
                break;
            }
        }
        articles.truncate(max_results);
        Ok(articles)
    }
}
