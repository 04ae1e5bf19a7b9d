//! Duplicate grouping - collapse articles covering the same story.

use std::collections::HashSet;

use tracing::{debug, warn};

use crate::traits::judge::{GroupingVerdict, Judge};
use crate::types::article::{reindex, same_story, Article};
use crate::types::state::{DuplicateGroup, PipelineState};

const SINGLETON_REASON: &str = "중복 그룹에 속하지 않음";
const FAILURE_REASON: &str = "판단 서비스 실패로 단독 그룹 처리";

/// Group near-duplicates in the retained batch via one batch grouping
/// call and keep one representative per group.
///
/// The verdict is repaired into a partition of the retained set:
/// out-of-range indices are dropped, an index claimed by two groups
/// stays with the first, unclaimed indices become singleton groups,
/// and a representative outside its own group snaps to the group's
/// first member. On a failed call every article becomes its own
/// singleton group, so nothing is collapsed and nothing is lost.
pub async fn group_duplicates<J: Judge>(
    mut state: PipelineState,
    judge: &J,
    criteria: &str,
) -> PipelineState {
    let batch = state.retained_articles();
    state.groups = vec![];
    state.grouped = vec![];

    if batch.is_empty() {
        return state;
    }

    let (verdict, fallback_reason) = match judge.judge_grouping(&batch, criteria).await {
        Ok(verdict) => (verdict, SINGLETON_REASON),
        Err(err) => {
            warn!(error = %err, "duplicate grouping failed; keeping all articles");
            state.record_diagnostic("dedup", &err);
            (GroupingVerdict::default(), FAILURE_REASON)
        }
    };

    let mut claimed: HashSet<usize> = HashSet::new();
    let mut groups: Vec<DuplicateGroup> = vec![];

    for group in &verdict.groups {
        let mut members: Vec<usize> = vec![];
        for &index in &group.indices {
            if index >= batch.len() {
                debug!(index, "grouping index out of range; ignored");
                continue;
            }
            // First group wins; also drops repeats within one group.
            if claimed.insert(index) {
                members.push(index);
            }
        }
        if members.is_empty() {
            continue;
        }
        let selected_index = match group.selected {
            Some(s) if members.contains(&s) => s,
            _ => members[0],
        };
        groups.push(DuplicateGroup {
            member_indices: members,
            selected_index,
            reason: group.reason.clone(),
        });
    }

    for article in &batch {
        if !claimed.contains(&article.index) {
            groups.push(DuplicateGroup {
                member_indices: vec![article.index],
                selected_index: article.index,
                reason: fallback_reason.to_string(),
            });
        }
    }

    // Representative order follows each group's earliest member.
    groups.sort_by_key(|g| g.member_indices.iter().copied().min().unwrap_or(usize::MAX));

    let representatives: Vec<Article> = groups
        .iter()
        .filter_map(|g| batch.get(g.selected_index).cloned())
        .collect();

    debug!(
        input = batch.len(),
        groups = groups.len(),
        "duplicate grouping complete"
    );

    state.groups = groups;
    state.grouped = reindex(representatives);
    state
}

/// Deterministic safety net over an already-curated list: drop later
/// items that share a URL or a normalized title with an earlier one.
///
/// Greedy first-seen-wins, so applying it twice changes nothing. This
/// is the only dedup applied when merging selections across subjects;
/// within a run the grouping judgment is authoritative.
pub fn collapse_exact_duplicates(items: Vec<Article>) -> Vec<Article> {
    let mut kept: Vec<Article> = Vec::with_capacity(items.len());
    for item in items {
        if !kept.iter().any(|k| same_story(k, &item)) {
            kept.push(item);
        }
    }
    kept
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::MockJudge;
    use crate::traits::judge::GroupVerdict;
    use crate::types::state::JudgedArticle;

    fn state_with(titles: &[&str]) -> PipelineState {
        let mut state = PipelineState::default();
        state.keyword_filtered = reindex(
            titles
                .iter()
                .enumerate()
                .map(|(i, t)| Article::new(*t, format!("https://example.com/{i}")))
                .collect(),
        );
        state.retained = state
            .keyword_filtered
            .iter()
            .map(|a| JudgedArticle {
                index: a.index,
                title: a.title.clone(),
                reason: String::new(),
            })
            .collect();
        state
    }

    fn grouping(groups: &[(&[usize], Option<usize>)]) -> GroupingVerdict {
        GroupingVerdict {
            groups: groups
                .iter()
                .map(|(indices, selected)| GroupVerdict {
                    indices: indices.to_vec(),
                    selected: *selected,
                    reason: "같은 사건".to_string(),
                })
                .collect(),
        }
    }

    fn assert_partition(state: &PipelineState, n: usize) {
        let mut seen = HashSet::new();
        for group in &state.groups {
            assert!(group.member_indices.contains(&group.selected_index));
            for &i in &group.member_indices {
                assert!(seen.insert(i), "index {i} in two groups");
            }
        }
        assert_eq!(seen.len(), n);
    }

    #[tokio::test]
    async fn test_groups_partition_retained_batch() {
        let judge = MockJudge::new().with_grouping(grouping(&[(&[0, 2], Some(2))]));
        let state = group_duplicates(state_with(&["a", "b", "c", "d"]), &judge, "기준").await;

        assert_partition(&state, 4);
        assert_eq!(state.groups.len(), 3);
        assert_eq!(state.grouped.len(), 3);
    }

    #[tokio::test]
    async fn test_unclaimed_indices_become_singletons() {
        let judge = MockJudge::new().with_grouping(grouping(&[(&[1, 2], None)]));
        let state = group_duplicates(state_with(&["a", "b", "c"]), &judge, "기준").await;

        let singleton = state
            .groups
            .iter()
            .find(|g| g.member_indices == vec![0])
            .unwrap();
        assert_eq!(singleton.reason, SINGLETON_REASON);
    }

    #[tokio::test]
    async fn test_index_in_two_groups_stays_with_first() {
        let judge =
            MockJudge::new().with_grouping(grouping(&[(&[0, 1], None), (&[1, 2], None)]));
        let state = group_duplicates(state_with(&["a", "b", "c"]), &judge, "기준").await;

        assert_partition(&state, 3);
        assert_eq!(state.groups[0].member_indices, vec![0, 1]);
        assert_eq!(state.groups[1].member_indices, vec![2]);
    }

    #[tokio::test]
    async fn test_invalid_representative_snaps_to_first_member() {
        let judge = MockJudge::new().with_grouping(grouping(&[(&[1, 2], Some(9))]));
        let state = group_duplicates(state_with(&["a", "b", "c"]), &judge, "기준").await;

        let group = state
            .groups
            .iter()
            .find(|g| g.member_indices.len() == 2)
            .unwrap();
        assert_eq!(group.selected_index, 1);
    }

    #[tokio::test]
    async fn test_representatives_follow_earliest_member_order() {
        let judge = MockJudge::new().with_grouping(grouping(&[(&[2, 3], Some(3))]));
        let state = group_duplicates(state_with(&["a", "b", "c", "d"]), &judge, "기준").await;

        let titles: Vec<_> = state.grouped.iter().map(|a| a.title.as_str()).collect();
        assert_eq!(titles, vec!["a", "b", "d"]);
        assert_eq!(state.grouped[2].index, 2);
    }

    #[tokio::test]
    async fn test_failure_keeps_every_article_as_singleton() {
        let judge = MockJudge::new().fail_grouping();
        let state = group_duplicates(state_with(&["a", "b"]), &judge, "기준").await;

        assert_partition(&state, 2);
        assert_eq!(state.grouped.len(), 2);
        assert!(state.groups.iter().all(|g| g.reason == FAILURE_REASON));
        assert_eq!(state.diagnostics.len(), 1);
    }

    #[test]
    fn test_collapse_drops_same_url_and_same_title() {
        let items = vec![
            Article::new("삼성전자 실적 발표", "https://a.com/1"),
            Article::new("[속보] 삼성전자 실적 발표", "https://b.com/2"),
            Article::new("다른 기사", "https://a.com/1"),
            Article::new("다른 기사", "https://c.com/3"),
        ];
        let collapsed = collapse_exact_duplicates(items);
        assert_eq!(collapsed.len(), 2);
        assert_eq!(collapsed[0].url, "https://a.com/1");
        assert_eq!(collapsed[1].title, "다른 기사");
    }

    #[test]
    fn test_collapse_is_idempotent() {
        let items = vec![
            Article::new("a", "https://a.com/1"),
            Article::new("a", "https://a.com/2"),
            Article::new("b", "https://b.com/1"),
        ];
        let once = collapse_exact_duplicates(items);
        let twice = collapse_exact_duplicates(once.clone());
        assert_eq!(once, twice);
    }

    proptest::proptest! {
        #[test]
        fn prop_collapse_idempotent(seed in proptest::collection::vec((0usize..5, 0usize..5), 0..20)) {
            let items: Vec<Article> = seed
                .iter()
                .map(|(t, u)| Article::new(format!("기사 {t}"), format!("https://example.com/{u}")))
                .collect();
            let once = collapse_exact_duplicates(items);
            let twice = collapse_exact_duplicates(once.clone());
            proptest::prop_assert_eq!(once, twice);
        }
    }
}
