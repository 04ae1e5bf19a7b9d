//! The Curator - main entry point for the curation library.
//!
//! Drives one subject through the full stage sequence and owns the
//! single relaxed retry: when the primary pass selects nothing and the
//! subject is not exempt, the stages re-run once from the untouched
//! raw batch with a widened press directory and relaxed criteria.

use std::pin::Pin;

use async_stream::stream;
use futures::Stream;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::error::{CurationError, Result};
use crate::pipeline::{
    dedup::group_duplicates, exclusion::judge_exclusion, keywords::filter_excluded_keywords,
    press::filter_valid_press, ranking::rank_importance,
};
use crate::traits::{collector::Collector, judge::Judge};
use crate::types::{
    article::Article,
    config::{CurationConfig, PressDirectory},
    state::PipelineState,
};

/// The terminal result of one subject's run.
///
/// An empty selection is a reportable outcome, not an error; `result`
/// is `Err` only for configuration or collection failures.
pub struct RunOutcome {
    pub subject: String,
    pub result: Result<PipelineState>,
}

/// The main entry point - curates news for one subject at a time.
///
/// # Example
///
/// ```rust,ignore
/// let curator = Curator::new(collector, judge);
/// let state = curator.run(&config).await?;
/// for pick in &state.final_selection {
///     println!("{}: {}", pick.article.title, pick.reason);
/// }
/// ```
pub struct Curator<C: Collector, J: Judge> {
    collector: C,
    judge: J,
}

struct PassCriteria<'a> {
    exclusion: &'a str,
    duplicate: &'a str,
    selection: &'a str,
}

impl<C: Collector, J: Judge> Curator<C, J> {
    pub fn new(collector: C, judge: J) -> Self {
        Self { collector, judge }
    }

    /// Get a reference to the collector.
    pub fn collector(&self) -> &C {
        &self.collector
    }

    /// Get a reference to the judge.
    pub fn judge(&self) -> &J {
        &self.judge
    }

    /// Collect and curate one subject.
    ///
    /// Configuration and collection failures surface as errors; a
    /// judgment-service failure never does (each stage recovers
    /// locally and the run completes with diagnostics).
    pub async fn run(&self, config: &CurationConfig) -> Result<PipelineState> {
        config.validate()?;

        let raw = self
            .collector
            .fetch_articles(&config.keywords, &config.window, config.fetch_limit)
            .await?;

        info!(
            subject = %config.subject,
            collected = raw.len(),
            "collection complete"
        );
        Ok(self.run_from_batch(config, raw).await)
    }

    /// Curate a pre-collected batch.
    ///
    /// The batch becomes `raw_articles` and is never mutated; the
    /// relaxed retry replays it bit-for-bit.
    pub async fn run_from_batch(&self, config: &CurationConfig, raw: Vec<Article>) -> PipelineState {
        let run_id = Uuid::new_v4();
        let state = PipelineState::new(raw);

        let primary = self
            .evaluate(
                state,
                &config.press,
                config,
                PassCriteria {
                    exclusion: &config.exclusion_criteria,
                    duplicate: &config.duplicate_criteria,
                    selection: &config.selection_criteria,
                },
            )
            .await;

        if !primary.final_selection.is_empty() {
            info!(
                subject = %config.subject,
                run_id = %run_id,
                selected = primary.final_selection.len(),
                "curation complete"
            );
            return primary;
        }

        if config.relaxation_exempt {
            info!(subject = %config.subject, run_id = %run_id, "nothing selected; subject exempt from relaxed retry");
            return primary;
        }

        debug!(subject = %config.subject, run_id = %run_id, "primary selection empty; retrying with relaxed criteria");

        // Single retry from the untouched raw batch, widened directory.
        let widened = config.press.merged(&config.supplementary_press);
        let mut retry_state = PipelineState::new(primary.raw_articles.clone());
        retry_state.diagnostics = primary.diagnostics.clone();

        let relaxed = self
            .evaluate(
                retry_state,
                &widened,
                config,
                PassCriteria {
                    exclusion: &config.relaxed.exclusion,
                    duplicate: &config.relaxed.duplicate,
                    selection: &config.relaxed.selection,
                },
            )
            .await;

        if relaxed.final_selection.is_empty() {
            info!(subject = %config.subject, run_id = %run_id, "relaxed retry also selected nothing");
            // The retry seeded its diagnostics from the primary pass,
            // so this carries both passes' failures in the result.
            let mut primary = primary;
            primary.diagnostics = relaxed.diagnostics;
            return primary;
        }

        info!(
            subject = %config.subject,
            run_id = %run_id,
            selected = relaxed.final_selection.len(),
            "relaxed retry produced a selection"
        );
        let mut relaxed = relaxed;
        relaxed.is_reevaluated = true;
        relaxed
    }

    /// Run with cancellation support.
    pub async fn run_with_cancel(
        &self,
        config: &CurationConfig,
        cancel: CancellationToken,
    ) -> Result<PipelineState> {
        tokio::select! {
            result = self.run(config) => result,
            _ = cancel.cancelled() => Err(CurationError::Cancelled),
        }
    }

    /// Run several subjects sequentially.
    ///
    /// One subject's failure never aborts the others.
    pub async fn run_all(&self, configs: &[CurationConfig]) -> Vec<RunOutcome> {
        let mut outcomes = Vec::with_capacity(configs.len());
        for config in configs {
            let result = self.run(config).await;
            if let Err(err) = &result {
                warn!(subject = %config.subject, error = %err, "subject run failed");
            }
            outcomes.push(RunOutcome {
                subject: config.subject.clone(),
                result,
            });
        }
        outcomes
    }

    /// Return a stream of per-subject outcomes.
    ///
    /// Yields each subject's outcome as it finishes, in config order.
    pub fn run_stream<'a>(
        &'a self,
        configs: &'a [CurationConfig],
    ) -> Pin<Box<dyn Stream<Item = RunOutcome> + Send + 'a>> {
        Box::pin(stream! {
            for config in configs {
                let result = self.run(config).await;
                yield RunOutcome {
                    subject: config.subject.clone(),
                    result,
                };
            }
        })
    }

    /// One full pass over the stages with the given press directory
    /// and criteria set.
    async fn evaluate(
        &self,
        state: PipelineState,
        press: &PressDirectory,
        config: &CurationConfig,
        criteria: PassCriteria<'_>,
    ) -> PipelineState {
        let state = filter_valid_press(state, press, &config.excluded_press);
        let state = filter_excluded_keywords(state, &config.excluded_keywords);
        let state = judge_exclusion(state, &self.judge, criteria.exclusion).await;
        let state = group_duplicates(state, &self.judge, criteria.duplicate).await;
        rank_importance(state, &self.judge, criteria.selection, config.max_articles).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{MockCollector, MockJudge};
    use crate::traits::judge::{
        ExclusionVerdict, GroupVerdict, GroupingVerdict, SelectionItem, SelectionVerdict,
        VerdictItem,
    };
    use crate::types::article::Article;
    use crate::types::config::ArticleCap;
    use futures::StreamExt;

    fn article(title: &str, url: &str, press: &str) -> Article {
        Article::new(title, url).with_press(press)
    }

    fn config() -> CurationConfig {
        let window = crate::types::config::TimeWindow::trailing_days_kst(chrono::Utc::now(), 1);
        CurationConfig::new("테스트기업", window)
            .with_press(PressDirectory::new().with_source("한국경제", ["한국경제"]))
            .with_supplementary_press(
                PressDirectory::new().with_source("전자신문", ["전자신문"]),
            )
    }

    fn retain_all(n: usize) -> ExclusionVerdict {
        ExclusionVerdict {
            retained: (0..n).map(|i| VerdictItem::new(i, "유지")).collect(),
            ..Default::default()
        }
    }

    fn select(indices: &[usize]) -> SelectionVerdict {
        SelectionVerdict {
            selected: indices
                .iter()
                .map(|&i| SelectionItem {
                    index: i,
                    reason: "중요".to_string(),
                    keywords: vec![],
                    affiliates: vec![],
                })
                .collect(),
            not_selected: vec![],
        }
    }

    #[tokio::test]
    async fn test_non_empty_primary_skips_relaxation() {
        let judge = MockJudge::new()
            .with_exclusion(retain_all(1))
            .with_grouping(GroupingVerdict::default())
            .with_selection(select(&[0]));
        let collector =
            MockCollector::new().with_articles(vec![article("기사", "https://h.com/1", "한국경제")]);
        let curator = Curator::new(collector, judge);

        let state = curator.run(&config()).await.unwrap();
        assert_eq!(state.final_selection.len(), 1);
        assert!(!state.is_reevaluated);
        // Three judge calls: one per AI stage, no retry.
        assert_eq!(curator.judge().calls().len(), 3);
    }

    #[tokio::test]
    async fn test_relaxed_retry_replays_raw_batch_with_widened_press() {
        // The supplementary-press article is dropped by the primary
        // press filter but survives the widened one.
        let judge = MockJudge::new()
            .with_exclusion(retain_all(1))
            .with_grouping(GroupingVerdict::default())
            .with_selection(SelectionVerdict::default())
            .with_exclusion(retain_all(2))
            .with_grouping(GroupingVerdict::default())
            .with_selection(select(&[1]));
        let collector = MockCollector::new().with_articles(vec![
            article("주력사 기사", "https://h.com/1", "한국경제"),
            article("보조 매체 기사", "https://e.com/2", "전자신문"),
        ]);
        let curator = Curator::new(collector, judge);

        let state = curator.run(&config()).await.unwrap();
        assert!(state.is_reevaluated);
        assert_eq!(state.final_selection.len(), 1);
        assert_eq!(state.final_selection[0].article.title, "보조 매체 기사");
        assert_eq!(state.raw_articles.len(), 2);
        // The collector ran once; the retry reused the raw batch.
        assert_eq!(curator.collector().calls().len(), 1);
    }

    #[tokio::test]
    async fn test_still_empty_relaxed_keeps_primary_result() {
        let judge = MockJudge::new()
            .with_exclusion(retain_all(1))
            .with_grouping(GroupingVerdict::default())
            .with_selection(SelectionVerdict::default())
            .with_exclusion(retain_all(1))
            .with_grouping(GroupingVerdict::default())
            .with_selection(SelectionVerdict::default());
        let collector =
            MockCollector::new().with_articles(vec![article("기사", "https://h.com/1", "한국경제")]);
        let curator = Curator::new(collector, judge);

        let state = curator.run(&config()).await.unwrap();
        assert!(state.final_selection.is_empty());
        assert!(!state.is_reevaluated);
        // Exactly one retry, never a loop.
        assert_eq!(curator.judge().calls().len(), 6);
    }

    #[tokio::test]
    async fn test_diagnostics_from_both_passes_survive_empty_retry() {
        // The ranking call fails in the primary pass and again in the
        // relaxed retry; the returned state must report both failures.
        let judge = MockJudge::new()
            .with_exclusion(retain_all(1))
            .with_grouping(GroupingVerdict::default())
            .with_exclusion(retain_all(1))
            .with_grouping(GroupingVerdict::default())
            .fail_selection();
        let collector =
            MockCollector::new().with_articles(vec![article("기사", "https://h.com/1", "한국경제")]);
        let curator = Curator::new(collector, judge);

        let state = curator.run(&config()).await.unwrap();
        assert!(state.final_selection.is_empty());
        assert!(!state.is_reevaluated);
        assert_eq!(state.diagnostics.len(), 2);
        assert!(state
            .diagnostics
            .iter()
            .all(|d| d.starts_with("ranking:")));
    }

    #[tokio::test]
    async fn test_exempt_subject_never_retries() {
        let judge = MockJudge::new()
            .with_exclusion(retain_all(1))
            .with_grouping(GroupingVerdict::default())
            .with_selection(SelectionVerdict::default());
        let collector =
            MockCollector::new().with_articles(vec![article("기사", "https://h.com/1", "한국경제")]);
        let curator = Curator::new(collector, judge);

        let state = curator
            .run(&config().relaxation_exempt())
            .await
            .unwrap();
        assert!(state.final_selection.is_empty());
        assert!(!state.is_reevaluated);
        assert_eq!(curator.judge().calls().len(), 3);
    }

    #[tokio::test]
    async fn test_collector_failure_surfaces() {
        let curator = Curator::new(MockCollector::new().failing(), MockJudge::new());
        let err = curator.run(&config()).await.unwrap_err();
        assert!(matches!(err, CurationError::Collect(_)));
    }

    #[tokio::test]
    async fn test_invalid_config_rejected_before_collection() {
        let collector = MockCollector::new();
        let curator = Curator::new(collector, MockJudge::new());
        let mut bad = config();
        bad.subject = String::new();

        let err = curator.run(&bad).await.unwrap_err();
        assert!(matches!(err, CurationError::Config { .. }));
        assert!(curator.collector().calls().is_empty());
    }

    #[tokio::test]
    async fn test_cancellation() {
        let curator = Curator::new(MockCollector::new(), MockJudge::new());
        let cancel = CancellationToken::new();
        cancel.cancel();

        let err = curator
            .run_with_cancel(&config(), cancel)
            .await
            .unwrap_err();
        assert!(matches!(err, CurationError::Cancelled));
    }

    #[tokio::test]
    async fn test_run_all_continues_past_failures() {
        let judge = MockJudge::new()
            .with_exclusion(retain_all(1))
            .with_grouping(GroupingVerdict::default())
            .with_selection(select(&[0]));
        let collector =
            MockCollector::new().with_articles(vec![article("기사", "https://h.com/1", "한국경제")]);
        let curator = Curator::new(collector, judge);

        let mut bad = config();
        bad.subject = String::new();
        let outcomes = curator.run_all(&[bad, config()]).await;

        assert_eq!(outcomes.len(), 2);
        assert!(outcomes[0].result.is_err());
        assert_eq!(outcomes[1].subject, "테스트기업");
        assert!(outcomes[1].result.is_ok());
    }

    #[tokio::test]
    async fn test_run_stream_yields_in_config_order() {
        let judge = MockJudge::new()
            .with_exclusion(retain_all(1))
            .with_grouping(GroupingVerdict::default())
            .with_selection(select(&[0]))
            .with_exclusion(retain_all(1))
            .with_grouping(GroupingVerdict::default())
            .with_selection(select(&[0]));
        let collector =
            MockCollector::new().with_articles(vec![article("기사", "https://h.com/1", "한국경제")]);
        let curator = Curator::new(collector, judge);

        let first = config();
        let mut second = config();
        second.subject = "둘째기업".to_string();
        let configs = [first, second];

        let outcomes: Vec<_> = curator.run_stream(&configs).collect().await;
        assert_eq!(outcomes[0].subject, "테스트기업");
        assert_eq!(outcomes[1].subject, "둘째기업");
    }

    #[tokio::test]
    async fn test_grouping_scenario_three_candidate_stories() {
        // 5 collected, #0 fails the press filter, the judge excludes
        // nothing of the remaining 4 and groups two of them.
        let judge = MockJudge::new()
            .with_exclusion(retain_all(4))
            .with_grouping(GroupingVerdict {
                groups: vec![GroupVerdict {
                    indices: vec![0, 2],
                    selected: Some(0),
                    reason: "같은 기사".to_string(),
                }],
            })
            .with_selection(select(&[0]));
        let collector = MockCollector::new().with_articles(vec![
            article("외부 매체", "https://x.com/1", "모르는신문"),
            article("기사 A", "https://h.com/2", "한국경제"),
            article("기사 B", "https://h.com/3", "한국경제"),
            article("기사 A 복제", "https://h.com/4", "한국경제"),
            article("기사 C", "https://h.com/5", "한국경제"),
        ]);
        let curator = Curator::new(collector, judge);

        let state = curator.run(&config()).await.unwrap();
        assert_eq!(state.grouped.len(), 3);
        let pair = state
            .groups
            .iter()
            .find(|g| g.member_indices.len() == 2)
            .unwrap();
        assert_eq!(pair.member_indices, vec![0, 2]);
    }

    #[tokio::test]
    async fn test_cap_scenario_two_of_three_ranked() {
        let judge = MockJudge::new()
            .with_exclusion(retain_all(3))
            .with_grouping(GroupingVerdict::default())
            .with_selection(select(&[2, 0, 1]));
        let collector = MockCollector::new().with_articles(vec![
            article("A", "https://h.com/1", "한국경제"),
            article("B", "https://h.com/2", "한국경제"),
            article("C", "https://h.com/3", "한국경제"),
        ]);
        let curator = Curator::new(collector, judge);

        let state = curator
            .run(&config().with_max_articles(ArticleCap::Limited(2)))
            .await
            .unwrap();
        assert_eq!(state.final_selection.len(), 2);
        assert_eq!(state.final_selection[0].article.title, "C");
        assert_eq!(state.not_selected.len(), 1);
        assert!(!state.not_selected[0].reason.is_empty());
    }
}
