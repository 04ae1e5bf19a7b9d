//! Importance ranking - pick the articles worth a client briefing.

use std::collections::HashSet;

use tracing::{debug, warn};

use crate::traits::judge::Judge;
use crate::types::config::ArticleCap;
use crate::types::state::{PassedOver, PipelineState, SelectedArticle};

const UNRATED_IMPORTANCE: &str = "미평가";
const UNRATED_REASON: &str = "판단 결과에 포함되지 않음";
// Overflow items were ranked important by the service; only the cap
// pushed them out.
const OVERFLOW_IMPORTANCE: &str = "상";
const OVERFLOW_REASON: &str = "선정 한도 초과";
const FAILURE_REASON: &str = "판단 서비스 실패";

/// Rank the deduplicated batch via one batch selection call and keep
/// at most `cap` articles, in the service's own ranking order.
///
/// Every article in the batch ends up either in `final_selection` or
/// in `not_selected`. The cap is enforced here rather than trusted to
/// the service; overflow items move to `not_selected` with an overflow
/// reason. On a failed call the selection is left empty and the whole
/// batch lands in `not_selected` with the failure noted; an empty
/// selection is what the relaxation controller reacts to, whatever the
/// cause.
pub async fn rank_importance<J: Judge>(
    mut state: PipelineState,
    judge: &J,
    criteria: &str,
    cap: ArticleCap,
) -> PipelineState {
    state.final_selection = vec![];
    state.not_selected = vec![];

    if state.grouped.is_empty() {
        return state;
    }

    let verdict = match judge.judge_selection(&state.grouped, criteria, cap).await {
        Ok(verdict) => verdict,
        Err(err) => {
            warn!(error = %err, "importance ranking failed; nothing selected");
            state.record_diagnostic("ranking", &err);
            state.not_selected = state
                .grouped
                .iter()
                .map(|a| PassedOver {
                    index: a.index,
                    title: a.title.clone(),
                    importance: UNRATED_IMPORTANCE.to_string(),
                    reason: FAILURE_REASON.to_string(),
                })
                .collect();
            return state;
        }
    };

    let mut claimed: HashSet<usize> = HashSet::new();

    for item in &verdict.selected {
        let Some(article) = state.grouped.get(item.index) else {
            debug!(index = item.index, "selection index out of range; ignored");
            continue;
        };
        if !claimed.insert(item.index) {
            continue;
        }
        let selected = SelectedArticle {
            article: article.clone(),
            reason: item.reason.clone(),
            keywords: item.keywords.clone(),
            affiliates: item.affiliates.clone(),
        };
        match cap.limit() {
            Some(limit) if state.final_selection.len() >= limit => {
                state.not_selected.push(PassedOver {
                    index: item.index,
                    title: selected.article.title.clone(),
                    importance: OVERFLOW_IMPORTANCE.to_string(),
                    reason: OVERFLOW_REASON.to_string(),
                });
            }
            _ => state.final_selection.push(selected),
        }
    }

    for item in &verdict.not_selected {
        if item.index >= state.grouped.len() || !claimed.insert(item.index) {
            continue;
        }
        state.not_selected.push(PassedOver {
            index: item.index,
            title: state.grouped[item.index].title.clone(),
            importance: item.importance.clone(),
            reason: item.reason.clone(),
        });
    }

    for article in &state.grouped {
        if !claimed.contains(&article.index) {
            state.not_selected.push(PassedOver {
                index: article.index,
                title: article.title.clone(),
                importance: UNRATED_IMPORTANCE.to_string(),
                reason: UNRATED_REASON.to_string(),
            });
        }
    }

    debug!(
        input = state.grouped.len(),
        selected = state.final_selection.len(),
        "importance ranking complete"
    );
    state
}
