//! News Curation Pipeline for Client Intelligence
//!
//! Given a subject company, collect recent news and distill it into
//! the handful of articles a relationship partner should actually
//! read: press validation, keyword exclusion, AI exclusion judgment,
//! duplicate grouping, importance ranking, and a single relaxed
//! re-evaluation when the strict pass selects nothing.
//!
//! # Design Philosophy
//!
//! - The pipeline is a pure state transform; collaborators (article
//!   collection, the judgment service) live behind traits.
//! - External judgment failures degrade, never crash: each AI stage
//!   recovers locally and records the failure in the run diagnostics.
//! - An empty final selection is a reportable outcome, not an error.
//!
//! # Usage
//!
//! ```rust,ignore
//! use curation::{Curator, CurationConfig, GoogleNewsCollector, OpenAiJudge};
//!
//! let curator = Curator::new(GoogleNewsCollector::new(), OpenAiJudge::from_env()?);
//! let state = curator.run(&config).await?;
//! for pick in &state.final_selection {
//!     println!("{}: {}", pick.article.title, pick.reason);
//! }
//! ```
//!
//! # Modules
//!
//! - [`traits`] - Core trait abstractions (Judge, Collector)
//! - [`types`] - Articles, pipeline state, configuration
//! - [`pipeline`] - The stage functions and the Curator orchestrator
//! - [`judges`] - Judge implementations (OpenAI)
//! - [`collectors`] - Collector implementations (Google News RSS)
//! - [`digest`] - Cross-subject briefing assembly
//! - [`testing`] - Mock implementations for testing

pub mod collectors;
pub mod digest;
pub mod error;
pub mod judges;
pub mod pipeline;
pub mod testing;
pub mod traits;
pub mod types;

// Re-export core types at crate root
pub use error::{CurationError, Result};
pub use traits::{
    collector::Collector,
    judge::{
        ExclusionVerdict, GroupVerdict, GroupingVerdict, Judge, RejectionItem, SelectionItem,
        SelectionVerdict, VerdictItem,
    },
};
pub use types::{
    article::{clean_title, format_date, same_story, Article},
    config::{ArticleCap, CurationConfig, PressDirectory, RelaxedCriteria, TimeWindow},
    state::{DuplicateGroup, JudgedArticle, PassedOver, PipelineState, SelectedArticle},
};

// Re-export the orchestrator and stage functions
pub use pipeline::{
    collapse_exact_duplicates, filter_excluded_keywords, filter_valid_press, group_duplicates,
    judge_exclusion, rank_importance, Curator, RunOutcome,
};

// Re-export implementations
pub use collectors::{CollectorExt, GoogleNewsCollector, RateLimitedCollector};
pub use digest::{Briefing, BriefingSection};
pub use judges::OpenAiJudge;

// Re-export testing utilities
pub use testing::{MockCollector, MockJudge};
