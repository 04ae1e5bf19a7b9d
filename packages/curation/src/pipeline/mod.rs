//! Curation pipeline - the core of the library.
//!
//! Stage order for one subject:
//! - Press validation (allow-list, fail closed)
//! - Keyword exclusion (deny-list)
//! - AI exclusion judgment (fail open)
//! - Duplicate grouping (fail safe, singleton groups)
//! - Importance ranking (cap enforced post-hoc)
//! - Relaxed re-evaluation (single retry from the raw batch)

pub mod dedup;
pub mod exclusion;
pub mod keywords;
pub mod press;
pub mod prompts;
pub mod ranking;
pub mod relaxation;

pub use dedup::{collapse_exact_duplicates, group_duplicates};
pub use exclusion::judge_exclusion;
pub use keywords::filter_excluded_keywords;
pub use press::filter_valid_press;
pub use prompts::{
    format_exclusion_prompt, format_grouping_prompt, format_selection_prompt, EXCLUSION_PROMPT,
    GROUPING_PROMPT, SELECTION_PROMPT,
};
pub use ranking::rank_importance;
pub use relaxation::{Curator, RunOutcome};
