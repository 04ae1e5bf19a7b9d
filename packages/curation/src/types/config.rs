//! Configuration types for a curation run.
//!
//! Configuration is an explicit value passed into each subject's
//! pipeline invocation. There is no ambient global state, and nothing
//! here is ever evaluated as code: press directories are plain
//! name → alias maps validated at this boundary.

use chrono::{DateTime, Datelike, Duration, TimeZone, Utc};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::error::{CurationError, Result};
use crate::types::article::kst;

/// Allow-list (or deny-list) of news sources.
///
/// Maps a canonical source name to its aliases: name variants and
/// exact host strings. Matching is case-insensitive and exact, no
/// substring or subdomain matching, so an aggregator host only matches
/// when listed itself.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PressDirectory(IndexMap<String, Vec<String>>);

impl PressDirectory {
    /// Create an empty directory.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a source and its aliases.
    pub fn with_source(
        mut self,
        name: impl Into<String>,
        aliases: impl IntoIterator<Item = impl Into<String>>,
    ) -> Self {
        self.insert(name, aliases);
        self
    }

    /// Insert a source, extending aliases if it already exists.
    pub fn insert(
        &mut self,
        name: impl Into<String>,
        aliases: impl IntoIterator<Item = impl Into<String>>,
    ) {
        let entry = self.0.entry(name.into()).or_default();
        for alias in aliases {
            let alias = alias.into();
            if !entry.contains(&alias) {
                entry.push(alias);
            }
        }
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Union of this directory and another. Aliases for sources present
    /// in both are merged. Used to widen the allow-list for the relaxed
    /// pass.
    pub fn merged(&self, other: &PressDirectory) -> PressDirectory {
        let mut merged = self.clone();
        for (name, aliases) in &other.0 {
            merged.insert(name.clone(), aliases.iter().cloned());
        }
        merged
    }

    /// Whether a reported press name or a URL host matches any alias.
    /// Both comparisons are case-insensitive exact equality.
    pub fn matches(&self, press: &str, host: Option<&str>) -> bool {
        let press = press.to_lowercase();
        let host = host.map(|h| h.to_lowercase());
        self.0.values().flatten().any(|alias| {
            let alias = alias.to_lowercase();
            alias == press || host.as_deref() == Some(alias.as_str())
        })
    }

    /// Iterate over canonical source names.
    pub fn sources(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }
}

impl<K, A, I> FromIterator<(K, I)> for PressDirectory
where
    K: Into<String>,
    A: Into<String>,
    I: IntoIterator<Item = A>,
{
    fn from_iter<T: IntoIterator<Item = (K, I)>>(iter: T) -> Self {
        let mut dir = PressDirectory::new();
        for (name, aliases) in iter {
            dir.insert(name, aliases);
        }
        dir
    }
}

/// Half-open collection window `[start, end)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeWindow {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl TimeWindow {
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        Self { start, end }
    }

    /// The standard daily window: 08:00 KST `days` days ago up to
    /// 08:00 KST on the day of `now` (exclusive).
    pub fn trailing_days_kst(now: DateTime<Utc>, days: i64) -> Self {
        let local = now.with_timezone(&kst());
        // A fixed offset has no ambiguous local times.
        let end_local = kst()
            .with_ymd_and_hms(local.year(), local.month(), local.day(), 8, 0, 0)
            .single()
            .unwrap_or(local);
        let end = end_local.with_timezone(&Utc);
        Self {
            start: end - Duration::days(days),
            end,
        }
    }

    /// Whether a timestamp falls inside the window.
    pub fn contains(&self, at: DateTime<Utc>) -> bool {
        self.start <= at && at < self.end
    }
}

/// Per-subject cap on final selections.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ArticleCap {
    /// Keep at most this many selections.
    Limited(usize),
    /// No truncation: every service-selected article passes through.
    Unlimited,
}

impl ArticleCap {
    /// The truncation length, if any.
    pub fn limit(&self) -> Option<usize> {
        match self {
            ArticleCap::Limited(n) => Some(*n),
            ArticleCap::Unlimited => None,
        }
    }
}

impl Default for ArticleCap {
    fn default() -> Self {
        ArticleCap::Limited(3)
    }
}

/// Looser criteria used only by the relaxed re-evaluation pass.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelaxedCriteria {
    pub exclusion: String,
    pub duplicate: String,
    pub selection: String,
}

/// Everything one subject's pipeline run consumes.
///
/// Criteria texts are opaque to the pipeline; only the judgment
/// service interprets them.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CurationConfig {
    /// The company/entity being analyzed.
    pub subject: String,

    /// Search keywords for collection (name variants, tickers, etc.).
    pub keywords: Vec<String>,

    /// Trusted sources admitted by the press validator.
    pub press: PressDirectory,

    /// Extra sources unioned in only for the relaxed pass.
    #[serde(default)]
    pub supplementary_press: PressDirectory,

    /// Sources dropped even when the allow-list admits them.
    #[serde(default)]
    pub excluded_press: PressDirectory,

    /// Deny-list of title/content substrings (case-insensitive).
    #[serde(default)]
    pub excluded_keywords: Vec<String>,

    pub exclusion_criteria: String,
    pub duplicate_criteria: String,
    pub selection_criteria: String,

    /// Criteria substituted in by the relaxed pass.
    #[serde(default)]
    pub relaxed: RelaxedCriteria,

    #[serde(default)]
    pub max_articles: ArticleCap,

    /// Collection window `[start, end)`.
    pub window: TimeWindow,

    /// Upper bound on collected articles per run.
    #[serde(default = "default_fetch_limit")]
    pub fetch_limit: usize,

    /// Subjects exempt from the relaxed re-evaluation pass by policy.
    #[serde(default)]
    pub relaxation_exempt: bool,
}

fn default_fetch_limit() -> usize {
    50
}

impl CurationConfig {
    /// Minimal config for a subject; everything else defaulted.
    pub fn new(subject: impl Into<String>, window: TimeWindow) -> Self {
        let subject = subject.into();
        Self {
            keywords: vec![subject.clone()],
            subject,
            press: PressDirectory::new(),
            supplementary_press: PressDirectory::new(),
            excluded_press: PressDirectory::new(),
            excluded_keywords: vec![],
            exclusion_criteria: String::new(),
            duplicate_criteria: String::new(),
            selection_criteria: String::new(),
            relaxed: RelaxedCriteria::default(),
            max_articles: ArticleCap::default(),
            window,
            fetch_limit: default_fetch_limit(),
            relaxation_exempt: false,
        }
    }

    pub fn with_keywords(mut self, keywords: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.keywords = keywords.into_iter().map(|k| k.into()).collect();
        self
    }

    pub fn with_press(mut self, press: PressDirectory) -> Self {
        self.press = press;
        self
    }

    pub fn with_supplementary_press(mut self, press: PressDirectory) -> Self {
        self.supplementary_press = press;
        self
    }

    pub fn with_excluded_keywords(
        mut self,
        keywords: impl IntoIterator<Item = impl Into<String>>,
    ) -> Self {
        self.excluded_keywords = keywords.into_iter().map(|k| k.into()).collect();
        self
    }

    pub fn with_criteria(
        mut self,
        exclusion: impl Into<String>,
        duplicate: impl Into<String>,
        selection: impl Into<String>,
    ) -> Self {
        self.exclusion_criteria = exclusion.into();
        self.duplicate_criteria = duplicate.into();
        self.selection_criteria = selection.into();
        self
    }

    pub fn with_relaxed_criteria(mut self, relaxed: RelaxedCriteria) -> Self {
        self.relaxed = relaxed;
        self
    }

    pub fn with_max_articles(mut self, cap: ArticleCap) -> Self {
        self.max_articles = cap;
        self
    }

    pub fn relaxation_exempt(mut self) -> Self {
        self.relaxation_exempt = true;
        self
    }

    /// Validate the pipeline-entry invariants. An empty press
    /// directory is *valid* configuration; the press stage fails
    /// closed on it instead.
    pub fn validate(&self) -> Result<()> {
        if self.subject.trim().is_empty() {
            return Err(CurationError::Config {
                reason: "subject must not be empty".to_string(),
            });
        }
        if self.keywords.is_empty() {
            return Err(CurationError::Config {
                reason: format!("no collection keywords for subject {}", self.subject),
            });
        }
        if self.window.start >= self.window.end {
            return Err(CurationError::Config {
                reason: "time window start must precede end".to_string(),
            });
        }
        if self.fetch_limit == 0 {
            return Err(CurationError::Config {
                reason: "fetch_limit must be positive".to_string(),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn window() -> TimeWindow {
        let end = Utc::now();
        TimeWindow::new(end - Duration::days(1), end)
    }

    #[test]
    fn test_press_directory_matches_press_name() {
        let dir = PressDirectory::new()
            .with_source("한국경제", ["한국경제", "한경", "hankyung.com"]);
        assert!(dir.matches("한국경제", None));
        assert!(dir.matches("한경", None));
        assert!(!dir.matches("다른신문", None));
    }

    #[test]
    fn test_press_directory_matches_host_exactly() {
        let dir = PressDirectory::new().with_source("조선비즈", ["biz.chosun.com"]);
        assert!(dir.matches("unknown", Some("biz.chosun.com")));
        assert!(dir.matches("unknown", Some("BIZ.CHOSUN.COM")));
        // No subdomain leakage in either direction.
        assert!(!dir.matches("unknown", Some("chosun.com")));
        assert!(!dir.matches("unknown", Some("sub.biz.chosun.com")));
    }

    #[test]
    fn test_press_directory_merged_unions_aliases() {
        let base = PressDirectory::new().with_source("연합뉴스", ["yna.co.kr"]);
        let extra = PressDirectory::new()
            .with_source("연합뉴스", ["yna"])
            .with_source("뉴시스", ["newsis.com"]);

        let merged = base.merged(&extra);
        assert!(merged.matches("yna", None));
        assert!(merged.matches("unknown", Some("newsis.com")));
        assert_eq!(merged.len(), 2);

        // Original is untouched.
        assert!(!base.matches("yna", None));
    }

    #[test]
    fn test_time_window_half_open() {
        let w = window();
        assert!(w.contains(w.start));
        assert!(!w.contains(w.end));
    }

    #[test]
    fn test_article_cap_serde() {
        let limited: ArticleCap = serde_json::from_str(r#"{"limited":2}"#).unwrap();
        assert_eq!(limited, ArticleCap::Limited(2));

        let unlimited: ArticleCap = serde_json::from_str(r#""unlimited""#).unwrap();
        assert_eq!(unlimited, ArticleCap::Unlimited);
        assert_eq!(unlimited.limit(), None);
    }

    #[test]
    fn test_validate_rejects_empty_subject() {
        let config = CurationConfig::new("  ", window());
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_inverted_window() {
        let end = Utc::now();
        let config = CurationConfig::new("삼성", TimeWindow::new(end, end - Duration::days(1)));
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_allows_empty_press_directory() {
        // Fail-closed happens at the press stage, not here.
        let config = CurationConfig::new("삼성", window());
        assert!(config.validate().is_ok());
    }
}
