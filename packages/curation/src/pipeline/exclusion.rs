//! AI exclusion judgment - three-way partition of the filtered batch.

use std::collections::HashMap;

use tracing::{debug, warn};

use crate::traits::judge::{ExclusionVerdict, Judge, VerdictItem};
use crate::types::state::{JudgedArticle, PipelineState};

const RETAINED_BY_DEFAULT: &str = "판단 대상에서 누락되어 유지";
const RETAINED_ON_FAILURE: &str = "판단 서비스 실패로 전체 유지";

#[derive(Clone, Copy, PartialEq)]
enum Class {
    Excluded,
    Borderline,
    Retained,
}

/// Classify every article in `keyword_filtered` as excluded,
/// borderline, or retained via one batch judgment call.
///
/// The verdict is repaired into a true partition: out-of-range indices
/// are dropped, an index claimed twice keeps its first classification,
/// and indices the verdict never mentions are retained. On a failed
/// call or unparsable response the whole batch is retained (fail open)
/// and the raw failure is recorded for diagnostics; later stages
/// still get a chance to filter, so nothing is silently lost.
pub async fn judge_exclusion<J: Judge>(
    mut state: PipelineState,
    judge: &J,
    criteria: &str,
) -> PipelineState {
    state.excluded = vec![];
    state.borderline = vec![];
    state.retained = vec![];

    if state.keyword_filtered.is_empty() {
        return state;
    }

    let verdict = match judge.judge_exclusion(&state.keyword_filtered, criteria).await {
        Ok(verdict) => verdict,
        Err(err) => {
            warn!(error = %err, "exclusion judgment failed; retaining entire batch");
            state.record_diagnostic("exclusion", &err);
            ExclusionVerdict {
                retained: state
                    .keyword_filtered
                    .iter()
                    .map(|a| VerdictItem::new(a.index, RETAINED_ON_FAILURE))
                    .collect(),
                ..Default::default()
            }
        }
    };

    let mut assignment: HashMap<usize, (Class, String)> = HashMap::new();
    let claims = verdict
        .excluded
        .iter()
        .map(|v| (Class::Excluded, v))
        .chain(verdict.borderline.iter().map(|v| (Class::Borderline, v)))
        .chain(verdict.retained.iter().map(|v| (Class::Retained, v)));

    for (class, item) in claims {
        if item.index >= state.keyword_filtered.len() {
            debug!(index = item.index, "verdict index out of range; ignored");
            continue;
        }
        // First classification wins.
        assignment
            .entry(item.index)
            .or_insert_with(|| (class, item.reason.clone()));
    }

    for article in &state.keyword_filtered {
        let (class, reason) = assignment
            .remove(&article.index)
            .unwrap_or((Class::Retained, RETAINED_BY_DEFAULT.to_string()));
        let judged = JudgedArticle {
            index: article.index,
            title: article.title.clone(),
            reason,
        };
        match class {
            Class::Excluded => state.excluded.push(judged),
            Class::Borderline => state.borderline.push(judged),
            Class::Retained => state.retained.push(judged),
        }
    }

    debug!(
        excluded = state.excluded.len(),
        borderline = state.borderline.len(),
        retained = state.retained.len(),
        "exclusion judgment complete"
    );
    state
}
