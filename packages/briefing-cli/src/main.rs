//! Daily briefing driver.
//!
//! Loads a JSON briefing config, runs the curation pipeline for each
//! subject sequentially, and prints the merged briefing. All pipeline
//! logic lives in the `curation` library; this binary only wires
//! configuration to collaborators.

use anyhow::{Context, Result};
use chrono::Utc;
use serde::Deserialize;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use curation::{
    ArticleCap, Briefing, CollectorExt, CurationConfig, Curator, GoogleNewsCollector, OpenAiJudge,
    PressDirectory, RelaxedCriteria, TimeWindow,
};

/// The briefing config file as authored.
///
/// Shared settings apply to every subject; a subject entry may
/// override its cap or opt out of the relaxed retry.
#[derive(Debug, Deserialize)]
struct BriefingFile {
    /// Collection window length in days (default 1).
    #[serde(default = "default_days")]
    days: i64,

    press: PressDirectory,
    #[serde(default)]
    supplementary_press: PressDirectory,
    #[serde(default)]
    excluded_press: PressDirectory,
    #[serde(default)]
    excluded_keywords: Vec<String>,

    criteria: CriteriaSection,
    #[serde(default)]
    relaxed_criteria: RelaxedCriteria,

    #[serde(default)]
    max_articles: ArticleCap,

    subjects: Vec<SubjectEntry>,
}

#[derive(Debug, Deserialize)]
struct CriteriaSection {
    exclusion: String,
    duplicate: String,
    selection: String,
}

#[derive(Debug, Deserialize)]
struct SubjectEntry {
    name: String,
    /// Defaults to the subject name.
    #[serde(default)]
    keywords: Vec<String>,
    #[serde(default)]
    max_articles: Option<ArticleCap>,
    #[serde(default)]
    relaxation_exempt: bool,
}

fn default_days() -> i64 {
    1
}

impl BriefingFile {
    fn subject_configs(&self) -> Vec<CurationConfig> {
        let window = TimeWindow::trailing_days_kst(Utc::now(), self.days);
        self.subjects
            .iter()
            .map(|subject| {
                let mut config = CurationConfig::new(&subject.name, window)
                    .with_press(self.press.clone())
                    .with_supplementary_press(self.supplementary_press.clone())
                    .with_excluded_keywords(self.excluded_keywords.iter().cloned())
                    .with_criteria(
                        &self.criteria.exclusion,
                        &self.criteria.duplicate,
                        &self.criteria.selection,
                    )
                    .with_relaxed_criteria(self.relaxed_criteria.clone())
                    .with_max_articles(subject.max_articles.unwrap_or(self.max_articles));
                config.excluded_press = self.excluded_press.clone();
                if !subject.keywords.is_empty() {
                    config = config.with_keywords(subject.keywords.iter().cloned());
                }
                if subject.relaxation_exempt {
                    config = config.relaxation_exempt();
                }
                config
            })
            .collect()
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,curation=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_target(true))
        .init();

    dotenvy::dotenv().ok();

    let path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "briefing.json".to_string());
    let raw = std::fs::read_to_string(&path)
        .with_context(|| format!("failed to read briefing config {path}"))?;
    let file: BriefingFile =
        serde_json::from_str(&raw).with_context(|| format!("invalid briefing config {path}"))?;

    tracing::info!(
        subjects = file.subjects.len(),
        days = file.days,
        "starting briefing run"
    );

    let collector = GoogleNewsCollector::new().rate_limited(2);
    let judge = OpenAiJudge::from_env().context("judge setup failed")?;
    let curator = Curator::new(collector, judge);

    let configs = file.subject_configs();
    let outcomes = curator.run_all(&configs).await;

    let failed = outcomes.iter().filter(|o| o.result.is_err()).count();
    let briefing = Briefing::from_outcomes(&outcomes);

    tracing::info!(
        sections = briefing.sections.len(),
        articles = briefing.total_articles(),
        failed,
        "briefing assembled"
    );

    println!("{}", briefing.render_text());

    if failed > 0 {
        anyhow::bail!("{failed} subject(s) failed");
    }
    Ok(())
}
