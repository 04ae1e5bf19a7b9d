//! Briefing digest - merge per-subject selections into one report.
//!
//! The grouping judgment is the dedup authority inside one subject's
//! run; across subjects only the deterministic collapse applies, so a
//! story shared by two clients appears once, under the first subject.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::pipeline::dedup::collapse_exact_duplicates;
use crate::pipeline::relaxation::RunOutcome;
use crate::types::article::{format_date, same_story, Article};
use crate::types::state::SelectedArticle;

/// One subject's slice of the briefing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BriefingSection {
    pub subject: String,
    pub items: Vec<SelectedArticle>,
    /// The selection came from the relaxed retry.
    pub is_reevaluated: bool,
}

/// The merged briefing over all subjects of a run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Briefing {
    pub generated_at: DateTime<Utc>,
    pub sections: Vec<BriefingSection>,
}

impl Briefing {
    /// Assemble a briefing from per-subject outcomes, in outcome
    /// order. Failed subjects are skipped; subjects that completed
    /// with nothing selected keep an empty section (a reportable
    /// outcome). A story already shown under an earlier subject is
    /// dropped from later sections.
    pub fn from_outcomes(outcomes: &[RunOutcome]) -> Self {
        // One collapse over every selection in outcome order; each
        // surviving representative is then spent by the first section
        // that claims its story.
        let all: Vec<Article> = outcomes
            .iter()
            .filter_map(|o| o.result.as_ref().ok())
            .flat_map(|s| s.final_selection.iter().map(|p| p.article.clone()))
            .collect();
        let mut unclaimed = collapse_exact_duplicates(all);

        let mut sections = vec![];
        for outcome in outcomes {
            let Ok(state) = &outcome.result else {
                continue;
            };
            let mut items = vec![];
            for pick in &state.final_selection {
                if let Some(pos) = unclaimed.iter().position(|a| same_story(a, &pick.article)) {
                    unclaimed.remove(pos);
                    items.push(pick.clone());
                }
            }
            sections.push(BriefingSection {
                subject: outcome.subject.clone(),
                items,
                is_reevaluated: state.is_reevaluated,
            });
        }

        Self {
            generated_at: Utc::now(),
            sections,
        }
    }

    pub fn total_articles(&self) -> usize {
        self.sections.iter().map(|s| s.items.len()).sum()
    }

    /// Plain-text rendering for logs and console output.
    pub fn render_text(&self) -> String {
        let mut out = String::new();
        for section in &self.sections {
            out.push_str(&format!("## {}", section.subject));
            if section.is_reevaluated {
                out.push_str(" (재평가)");
            }
            out.push('\n');

            if section.items.is_empty() {
                out.push_str("관련 기사 없음\n\n");
                continue;
            }
            for item in &section.items {
                out.push_str(&format!(
                    "- {} [{}] {}\n  {}\n  {}\n",
                    format_date(&item.article.published_at),
                    item.article.press,
                    item.article.cleaned_title(),
                    item.reason,
                    item.article.url,
                ));
            }
            out.push('\n');
        }
        out
    }
}
