//! LLM prompts for the curation pipeline.
//!
//! The pipeline itself depends only on the `Judge` trait; these
//! templates belong to the OpenAI-backed judge. Verdict JSON shapes
//! here mirror the serde schemas in `traits::judge`.

use crate::types::article::Article;
use crate::types::config::ArticleCap;

/// Prompt for the exclusion judgment stage.
pub const EXCLUSION_PROMPT: &str = r#"You are screening Korean news articles for an accounting firm's client-intelligence briefing.

Classify EVERY article below into exactly one of three lists according to these exclusion criteria:

{criteria}

- "excluded": clearly matches the exclusion criteria
- "borderline": arguably matches, judgment call
- "retained": does not match, keep for the briefing

Articles:
{articles}

Output JSON only:
{
    "excluded": [{"index": 0, "title": "...", "reason": "why it is excluded"}],
    "borderline": [{"index": 1, "title": "...", "reason": "why it is borderline"}],
    "retained": [{"index": 2, "title": "...", "reason": "why it is kept"}]
}

Rules:
- Use the article index numbers exactly as given
- Every article must appear in exactly one list
- Reasons in Korean, one sentence each"#;

/// Prompt for the duplicate grouping stage.
pub const GROUPING_PROMPT: &str = r#"You are deduplicating Korean news articles that may cover the same underlying story.

Duplicate criteria:

{criteria}

Articles:
{articles}

Group articles that report the SAME event or announcement. For each group, pick the single most informative article as the representative.

Output JSON only:
{
    "groups": [
        {"indices": [0, 3], "selected": 3, "reason": "same announcement, article 3 has more detail"}
    ]
}

Rules:
- Use the article index numbers exactly as given
- "selected" must be one of that group's indices
- Articles with no duplicate may be omitted; they stay as-is
- Different events are never grouped, even for the same company"#;

/// Prompt for the importance ranking stage.
pub const SELECTION_PROMPT: &str = r#"You are selecting the news articles an accounting firm's relationship partner should read about a client company.

Selection criteria:

{criteria}

Select {cap} from the articles below, most important first.

Articles:
{articles}

Output JSON only:
{
    "selected": [
        {"index": 0, "reason": "why this matters to the firm", "keywords": ["deal", "audit"], "affiliates": ["subsidiary names mentioned"]}
    ],
    "not_selected": [
        {"index": 1, "importance": "하", "reason": "routine coverage"}
    ]
}

Rules:
- Use the article index numbers exactly as given
- "selected" ordered by importance, most important first
- Every article appears in exactly one of the two lists
- Reasons in Korean; importance one of 상 / 중 / 하"#;

/// Render a batch as numbered article blocks.
fn format_articles(articles: &[Article]) -> String {
    articles
        .iter()
        .map(|a| {
            format!(
                "[{}] {}\nPress: {}\nDate: {}\nURL: {}\n{}",
                a.index, a.title, a.press, a.published_at, a.url, a.content
            )
        })
        .collect::<Vec<_>>()
        .join("\n---\n")
}

/// Format the exclusion prompt for a batch.
pub fn format_exclusion_prompt(articles: &[Article], criteria: &str) -> String {
    EXCLUSION_PROMPT
        .replace("{criteria}", criteria)
        .replace("{articles}", &format_articles(articles))
}

/// Format the grouping prompt for a batch.
pub fn format_grouping_prompt(articles: &[Article], criteria: &str) -> String {
    GROUPING_PROMPT
        .replace("{criteria}", criteria)
        .replace("{articles}", &format_articles(articles))
}

/// Format the selection prompt for a batch.
pub fn format_selection_prompt(articles: &[Article], criteria: &str, cap: ArticleCap) -> String {
    let cap_text = match cap.limit() {
        Some(limit) => format!("at most {limit} articles"),
        None => "every article that meets the criteria".to_string(),
    };
    SELECTION_PROMPT
        .replace("{criteria}", criteria)
        .replace("{cap}", &cap_text)
        .replace("{articles}", &format_articles(articles))
}
