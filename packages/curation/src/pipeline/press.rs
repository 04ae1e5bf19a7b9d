//! Press validation - admit only articles from trusted sources.

use tracing::{debug, warn};

use crate::types::{
    article::reindex,
    config::PressDirectory,
    state::PipelineState,
};

/// Keep only articles whose reported press name or URL host matches
/// the allow-list, then drop any that match the deny directory.
///
/// Matching is case-insensitive exact equality against the aliases,
/// no substring or subdomain matching, so articles behind an
/// aggregator/redirector host only pass when that host itself is
/// listed. An empty allow-list yields an empty output (fail closed).
pub fn filter_valid_press(
    mut state: PipelineState,
    allowed: &PressDirectory,
    excluded: &PressDirectory,
) -> PipelineState {
    if allowed.is_empty() {
        warn!("press allow-list is empty; dropping entire batch");
        state.press_filtered = vec![];
        return state;
    }

    let kept: Vec<_> = state
        .raw_articles
        .iter()
        .filter(|article| {
            let host = article.host();
            if !allowed.matches(&article.press, host.as_deref()) {
                return false;
            }
            if excluded.matches(&article.press, host.as_deref()) {
                debug!(press = %article.press, title = %article.title, "press on exclusion list");
                return false;
            }
            true
        })
        .cloned()
        .collect();

    debug!(
        input = state.raw_articles.len(),
        kept = kept.len(),
        "press validation complete"
    );

    state.press_filtered = reindex(kept);
    state
}
