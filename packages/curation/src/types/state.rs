//! The pipeline state threaded through all stages.

use serde::{Deserialize, Serialize};

use crate::types::article::{reindex, Article};

/// One article's classification at the exclusion stage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JudgedArticle {
    /// Index into the exclusion stage's input batch.
    pub index: usize,
    pub title: String,
    pub reason: String,
}

/// A group of near-duplicate articles covering the same story.
///
/// `member_indices` index into the retained batch; the groups
/// partition it. `selected_index` is always one of `member_indices`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DuplicateGroup {
    pub member_indices: Vec<usize>,
    pub selected_index: usize,
    pub reason: String,
}

/// A final selection, enriched by the judgment service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectedArticle {
    pub article: Article,
    pub reason: String,
    #[serde(default)]
    pub keywords: Vec<String>,
    #[serde(default)]
    pub affiliates: Vec<String>,
}

/// An article considered at the ranking stage but not chosen.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PassedOver {
    /// Index into the ranking stage's input batch.
    pub index: usize,
    pub title: String,
    pub importance: String,
    pub reason: String,
}

/// The record threaded through all pipeline stages.
///
/// Owned exclusively by one subject's run; each stage takes the state
/// by value and returns the updated state. `raw_articles` is set once
/// by the collector and never mutated afterward; it is the replay
/// source for the relaxed re-evaluation pass.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PipelineState {
    /// The collected batch, untouched after collection.
    pub raw_articles: Vec<Article>,

    /// Output of the press validator.
    pub press_filtered: Vec<Article>,

    /// Output of the keyword excluder; input to the exclusion judge.
    pub keyword_filtered: Vec<Article>,

    /// Three-way partition of `keyword_filtered`. Disjoint, covering
    /// the input exactly.
    pub excluded: Vec<JudgedArticle>,
    pub borderline: Vec<JudgedArticle>,
    pub retained: Vec<JudgedArticle>,

    /// Duplicate groups over the retained batch.
    pub groups: Vec<DuplicateGroup>,

    /// One representative article per group, in first-occurrence order
    /// of each group's earliest member.
    pub grouped: Vec<Article>,

    /// The chosen articles, in the service's ranking order.
    pub final_selection: Vec<SelectedArticle>,

    /// Considered but not chosen at the ranking stage.
    pub not_selected: Vec<PassedOver>,

    /// True only when the relaxed pass produced a non-empty selection
    /// that replaced an empty primary one.
    pub is_reevaluated: bool,

    /// Raw judgment-service failures, recorded for diagnostics. Never
    /// drives control flow; an empty ranking result does, whatever its
    /// cause.
    pub diagnostics: Vec<String>,
}

impl PipelineState {
    /// Start a run from a collected batch.
    pub fn new(raw_articles: Vec<Article>) -> Self {
        Self {
            raw_articles: reindex(raw_articles),
            ..Default::default()
        }
    }

    /// The retained articles as a re-indexed working batch for the
    /// dedup stage. Looks each retained index up in
    /// `keyword_filtered`.
    pub fn retained_articles(&self) -> Vec<Article> {
        let articles = self
            .retained
            .iter()
            .filter_map(|j| self.keyword_filtered.get(j.index).cloned())
            .collect();
        reindex(articles)
    }

    /// Record a judgment-service failure for diagnostics.
    pub fn record_diagnostic(&mut self, stage: &str, detail: impl std::fmt::Display) {
        self.diagnostics.push(format!("{stage}: {detail}"));
    }
}
