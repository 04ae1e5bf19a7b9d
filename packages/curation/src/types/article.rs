//! Article identity and normalization.
//!
//! `url` is the strongest identity key; the cleaned title is a
//! secondary key. Two articles are "the same story" when either
//! matches after normalization.

use std::sync::OnceLock;

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveTime, TimeZone, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};
use url::Url;

/// Korean Standard Time, the timezone the upstream feeds report in.
pub fn kst() -> FixedOffset {
    FixedOffset::east_opt(9 * 3600).expect("KST offset is valid")
}

/// One news item as reported by the collector.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Article {
    pub title: String,

    /// Often identical to the title for headline-only feeds.
    pub content: String,

    pub url: String,

    /// Source name as reported by the feed.
    pub press: String,

    /// Loosely formatted timestamp; multiple upstream formats occur.
    pub published_at: String,

    /// Position in the current batch. Reassigned at every stage that
    /// rebuilds a list.
    #[serde(default)]
    pub index: usize,
}

impl Article {
    /// Create an article from a title and URL. Content defaults to the
    /// title, which is what headline-only feeds deliver.
    pub fn new(title: impl Into<String>, url: impl Into<String>) -> Self {
        let title = title.into();
        Self {
            content: title.clone(),
            title,
            url: url.into(),
            press: String::new(),
            published_at: String::new(),
            index: 0,
        }
    }

    /// Set the source name.
    pub fn with_press(mut self, press: impl Into<String>) -> Self {
        self.press = press.into();
        self
    }

    /// Set the raw published timestamp.
    pub fn with_published_at(mut self, published_at: impl Into<String>) -> Self {
        self.published_at = published_at.into();
        self
    }

    /// Set content distinct from the title.
    pub fn with_content(mut self, content: impl Into<String>) -> Self {
        self.content = content.into();
        self
    }

    /// Lowercased host of the article URL, if it parses.
    pub fn host(&self) -> Option<String> {
        Url::parse(&self.url)
            .ok()?
            .host_str()
            .map(|h| h.to_lowercase())
    }

    /// Title with tags and trailing press suffixes stripped.
    pub fn cleaned_title(&self) -> String {
        clean_title(&self.title)
    }
}

/// Reassign `index` to the position in the list. Every stage that
/// rebuilds a list calls this so judge verdicts can refer to articles
/// by batch position.
pub fn reindex(mut articles: Vec<Article>) -> Vec<Article> {
    for (i, article) in articles.iter_mut().enumerate() {
        article.index = i;
    }
    articles
}

/// Whether two articles cover the same underlying story: exact URL
/// match or normalized-title match. Empty keys never match.
pub fn same_story(a: &Article, b: &Article) -> bool {
    if !a.url.is_empty() && a.url == b.url {
        return true;
    }
    let (ta, tb) = (clean_title(&a.title), clean_title(&b.title));
    !ta.is_empty() && ta == tb
}

/// Strip bracketed tags anywhere in the title and the trailing
/// `- <press name>` suffix, including the two-part suffixes some
/// outlets append.
pub fn clean_title(title: &str) -> String {
    static BRACKETS: OnceLock<Regex> = OnceLock::new();
    static CHOSUNBIZ: OnceLock<Regex> = OnceLock::new();
    static FNNEWS: OnceLock<Regex> = OnceLock::new();
    static TRAILING_PRESS: OnceLock<Regex> = OnceLock::new();

    if title.is_empty() {
        return String::new();
    }

    let brackets = BRACKETS.get_or_init(|| Regex::new(r"\[.*?\]").unwrap());
    let mut cleaned = brackets.replace_all(title, "").trim().to_string();

    // Two-part suffixes that the generic rule below would only half-strip.
    let chosunbiz = CHOSUNBIZ
        .get_or_init(|| Regex::new(r"(?i)\s*-\s*조선비즈\s*-\s*Chosun\s?Biz\s*$").unwrap());
    cleaned = chosunbiz.replace(&cleaned, "").to_string();
    let fnnews = FNNEWS.get_or_init(|| Regex::new(r"(?i)\s*-\s*fnnews\.com\s*$").unwrap());
    cleaned = fnnews.replace(&cleaned, "").to_string();

    let trailing_press =
        TRAILING_PRESS.get_or_init(|| Regex::new(r"\s*-\s*[가-힣A-Za-z0-9\s]+$").unwrap());
    cleaned = trailing_press.replace(&cleaned, "").to_string();

    cleaned.trim().to_string()
}

/// Parse the loosely formatted published timestamp.
///
/// Accepts `YYYY-MM-DD` (interpreted as midnight KST) and RFC 2822
/// (the Google News RSS `pubDate` format). Returns `None` when the
/// string matches neither.
pub fn parse_published(raw: &str) -> Option<DateTime<Utc>> {
    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        let midnight = NaiveTime::from_hms_opt(0, 0, 0)?;
        return kst()
            .from_local_datetime(&date.and_time(midnight))
            .single()
            .map(|dt| dt.with_timezone(&Utc));
    }
    if let Ok(dt) = DateTime::parse_from_rfc2822(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    None
}

/// Format a raw published timestamp as `MM/DD` in KST for display.
/// Unparsable input is passed through unchanged.
pub fn format_date(raw: &str) -> String {
    match parse_published(raw) {
        Some(dt) => dt.with_timezone(&kst()).format("%m/%d").to_string(),
        None => raw.to_string(),
    }
}
