//! Judge trait for the external judgment service.
//!
//! Each AI stage makes exactly one batch call. The verdict types are
//! the structured response schema; they are parsed leniently (missing
//! fields default to empty) and the pipeline stages repair whatever
//! the service returns into the stage invariants. Indices in verdicts
//! refer to positions in the batch passed to the call.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::types::{article::Article, config::ArticleCap};

/// The external judgment service.
///
/// Implementations wrap a specific decision backend (an LLM provider,
/// a mock) and handle the specifics of prompting and response parsing.
/// The pipeline depends only on this contract, never on prompt wording
/// or a particular model.
#[async_trait]
pub trait Judge: Send + Sync {
    /// Classify a batch as excluded / borderline / retained against
    /// natural-language exclusion criteria.
    async fn judge_exclusion(
        &self,
        articles: &[Article],
        criteria: &str,
    ) -> Result<ExclusionVerdict>;

    /// Group near-duplicate articles (same underlying story) against
    /// natural-language duplicate criteria.
    async fn judge_grouping(&self, articles: &[Article], criteria: &str)
        -> Result<GroupingVerdict>;

    /// Rank a batch and pick the important articles against
    /// natural-language selection criteria. The cap is advisory here;
    /// the ranking stage enforces it post-hoc.
    async fn judge_selection(
        &self,
        articles: &[Article],
        criteria: &str,
        cap: ArticleCap,
    ) -> Result<SelectionVerdict>;
}

/// One article's verdict at the exclusion stage.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct VerdictItem {
    pub index: usize,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub reason: String,
}

impl VerdictItem {
    pub fn new(index: usize, reason: impl Into<String>) -> Self {
        Self {
            index,
            title: String::new(),
            reason: reason.into(),
        }
    }
}

/// Response schema for [`Judge::judge_exclusion`].
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExclusionVerdict {
    #[serde(default)]
    pub excluded: Vec<VerdictItem>,
    #[serde(default)]
    pub borderline: Vec<VerdictItem>,
    #[serde(default)]
    pub retained: Vec<VerdictItem>,
}

/// One duplicate group in a grouping verdict.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GroupVerdict {
    #[serde(default)]
    pub indices: Vec<usize>,
    /// The representative; defaults to the group's first member when
    /// missing or invalid.
    #[serde(default)]
    pub selected: Option<usize>,
    #[serde(default)]
    pub reason: String,
}

/// Response schema for [`Judge::judge_grouping`].
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GroupingVerdict {
    #[serde(default)]
    pub groups: Vec<GroupVerdict>,
}

/// One selected article in a selection verdict.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SelectionItem {
    pub index: usize,
    #[serde(default)]
    pub reason: String,
    #[serde(default)]
    pub keywords: Vec<String>,
    #[serde(default)]
    pub affiliates: Vec<String>,
}

/// One rejected article in a selection verdict.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RejectionItem {
    pub index: usize,
    #[serde(default)]
    pub importance: String,
    #[serde(default)]
    pub reason: String,
}

/// Response schema for [`Judge::judge_selection`].
///
/// `selected` is in the service's own ranking order, most important
/// first; cap truncation relies on that order.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SelectionVerdict {
    #[serde(default)]
    pub selected: Vec<SelectionItem>,
    #[serde(default)]
    pub not_selected: Vec<RejectionItem>,
}
