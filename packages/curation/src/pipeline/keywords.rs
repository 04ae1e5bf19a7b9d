//! Rule-based keyword exclusion.

use tracing::debug;

use crate::types::{article::reindex, state::PipelineState};

/// Drop articles whose title or content contains any deny-list
/// substring. Matching is case-insensitive, applied consistently to
/// both fields. Order-preserving pure filter.
pub fn filter_excluded_keywords(mut state: PipelineState, deny_list: &[String]) -> PipelineState {
    if deny_list.is_empty() {
        state.keyword_filtered = reindex(state.press_filtered.clone());
        return state;
    }

    let deny_lower: Vec<String> = deny_list.iter().map(|k| k.to_lowercase()).collect();

    let kept: Vec<_> = state
        .press_filtered
        .iter()
        .filter(|article| {
            let title = article.title.to_lowercase();
            let content = article.content.to_lowercase();
            !deny_lower
                .iter()
                .any(|k| title.contains(k.as_str()) || content.contains(k.as_str()))
        })
        .cloned()
        .collect();

    debug!(
        input = state.press_filtered.len(),
        kept = kept.len(),
        deny_list = deny_list.len(),
        "keyword exclusion complete"
    );

    state.keyword_filtered = reindex(kept);
    state
}
