//! Testing utilities including mock implementations.
//!
//! These are useful for testing applications that use the curation
//! library without making real AI or network calls.

use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::{Arc, RwLock};

use crate::error::{CurationError, Result};
use crate::traits::{
    collector::Collector,
    judge::{ExclusionVerdict, GroupingVerdict, Judge, SelectionVerdict},
};
use crate::types::{
    article::Article,
    config::{ArticleCap, TimeWindow},
};

/// A mock judgment service for testing.
///
/// Each stage pops the next queued verdict; when a queue is empty the
/// default verdict is returned, which every stage repairs into its
/// fallback (all retained / all singletons / nothing selected).
/// Records every call with a clone of the batch it received.
#[derive(Default)]
pub struct MockJudge {
    exclusions: Arc<RwLock<VecDeque<ExclusionVerdict>>>,
    groupings: Arc<RwLock<VecDeque<GroupingVerdict>>>,
    selections: Arc<RwLock<VecDeque<SelectionVerdict>>>,

    fail_exclusion: bool,
    fail_grouping: bool,
    fail_selection: bool,

    /// Call tracking for assertions
    calls: Arc<RwLock<Vec<MockJudgeCall>>>,
}

/// Record of a call made to the mock judge.
#[derive(Debug, Clone)]
pub enum MockJudgeCall {
    Exclusion { articles: Vec<Article>, criteria: String },
    Grouping { articles: Vec<Article>, criteria: String },
    Selection { articles: Vec<Article>, criteria: String, cap: ArticleCap },
}

impl MockJudge {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue an exclusion verdict.
    pub fn with_exclusion(self, verdict: ExclusionVerdict) -> Self {
        self.exclusions.write().unwrap().push_back(verdict);
        self
    }

    /// Queue a grouping verdict.
    pub fn with_grouping(self, verdict: GroupingVerdict) -> Self {
        self.groupings.write().unwrap().push_back(verdict);
        self
    }

    /// Queue a selection verdict.
    pub fn with_selection(self, verdict: SelectionVerdict) -> Self {
        self.selections.write().unwrap().push_back(verdict);
        self
    }

    /// Make every exclusion call fail.
    pub fn fail_exclusion(mut self) -> Self {
        self.fail_exclusion = true;
        self
    }

    /// Make every grouping call fail.
    pub fn fail_grouping(mut self) -> Self {
        self.fail_grouping = true;
        self
    }

    /// Make every selection call fail.
    pub fn fail_selection(mut self) -> Self {
        self.fail_selection = true;
        self
    }

    /// Get all calls made to this mock.
    pub fn calls(&self) -> Vec<MockJudgeCall> {
        self.calls.read().unwrap().clone()
    }

    /// Clear call history.
    pub fn clear_calls(&self) {
        self.calls.write().unwrap().clear();
    }

    fn record(&self, call: MockJudgeCall) {
        self.calls.write().unwrap().push(call);
    }

    fn fail(stage: &str) -> CurationError {
        CurationError::judge(std::io::Error::new(
            std::io::ErrorKind::Other,
            format!("mock {stage} failure"),
        ))
    }
}

#[async_trait]
impl Judge for MockJudge {
    async fn judge_exclusion(
        &self,
        articles: &[Article],
        criteria: &str,
    ) -> Result<ExclusionVerdict> {
        self.record(MockJudgeCall::Exclusion {
            articles: articles.to_vec(),
            criteria: criteria.to_string(),
        });
        if self.fail_exclusion {
            return Err(Self::fail("exclusion"));
        }
        Ok(self
            .exclusions
            .write()
            .unwrap()
            .pop_front()
            .unwrap_or_default())
    }

    async fn judge_grouping(
        &self,
        articles: &[Article],
        criteria: &str,
    ) -> Result<GroupingVerdict> {
        self.record(MockJudgeCall::Grouping {
            articles: articles.to_vec(),
            criteria: criteria.to_string(),
        });
        if self.fail_grouping {
            return Err(Self::fail("grouping"));
        }
        Ok(self
            .groupings
            .write()
            .unwrap()
            .pop_front()
            .unwrap_or_default())
    }

    async fn judge_selection(
        &self,
        articles: &[Article],
        criteria: &str,
        cap: ArticleCap,
    ) -> Result<SelectionVerdict> {
        self.record(MockJudgeCall::Selection {
            articles: articles.to_vec(),
            criteria: criteria.to_string(),
            cap,
        });
        if self.fail_selection {
            return Err(Self::fail("selection"));
        }
        Ok(self
            .selections
            .write()
            .unwrap()
            .pop_front()
            .unwrap_or_default())
    }
}

/// A mock collector returning a fixed batch.
#[derive(Default)]
pub struct MockCollector {
    articles: Vec<Article>,
    failing: bool,

    /// Call tracking for assertions
    calls: Arc<RwLock<Vec<MockCollectorCall>>>,
}

/// Record of a call made to the mock collector.
#[derive(Debug, Clone)]
pub struct MockCollectorCall {
    pub keywords: Vec<String>,
    pub max_results: usize,
}

impl MockCollector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the batch returned by every fetch.
    pub fn with_articles(mut self, articles: Vec<Article>) -> Self {
        self.articles = articles;
        self
    }

    /// Make every fetch fail.
    pub fn failing(mut self) -> Self {
        self.failing = true;
        self
    }

    /// Get all calls made to this mock.
    pub fn calls(&self) -> Vec<MockCollectorCall> {
        self.calls.read().unwrap().clone()
    }
}

#[async_trait]
impl Collector for MockCollector {
    async fn fetch_articles(
        &self,
        keywords: &[String],
        _window: &TimeWindow,
        max_results: usize,
    ) -> Result<Vec<Article>> {
        self.calls.write().unwrap().push(MockCollectorCall {
            keywords: keywords.to_vec(),
            max_results,
        });
        if self.failing {
            return Err(CurationError::collect(std::io::Error::new(
                std::io::ErrorKind::Other,
                "mock collection failure",
            )));
        }
        Ok(self
            .articles
            .iter()
            .take(max_results)
            .cloned()
            .collect())
    }
}
