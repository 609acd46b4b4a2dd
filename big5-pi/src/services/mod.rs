//! Post-prediction services: labels and narrative summaries

pub mod summary;
pub mod trait_interpreter;

pub use summary::{GeminiSummarizer, ProfileSummary, RuleBasedSummarizer, Summarizer};
pub use trait_interpreter::{interpret, ProfileInterpretation, TraitLevel};
