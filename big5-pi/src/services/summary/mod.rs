//! Profile summary collaborator
//!
//! The core hands the summarizer nothing but the final profile, formatted as
//! a textual score listing. What comes back is opaque prose.

pub mod gemini;
pub mod rule_based;

pub use gemini::GeminiSummarizer;
pub use rule_based::RuleBasedSummarizer;

use anyhow::Result;
use async_trait::async_trait;
use big5_common::{PersonalityProfile, Trait};
use serde::{Deserialize, Serialize};

/// Generated narrative for one profile
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProfileSummary {
    pub full_summary: String,
    pub short_summary: String,
    /// Provenance ("AI-generated", "Rule-based (AI unavailable)")
    pub generated_at: String,
}

/// Narrative generation for a finished profile
#[async_trait]
pub trait Summarizer: Send + Sync {
    /// Collaborator identifier (e.g., "rule-based", "gemini")
    fn source_id(&self) -> &'static str;

    async fn summarize(&self, profile: &PersonalityProfile) -> Result<ProfileSummary>;

    /// Short insight for a single 0-10 trait score
    async fn trait_insight(&self, t: Trait, score: f64) -> Result<String>;
}

/// `- {Trait}: {score}/10 ({percentage}%)`, one line per trait
pub fn format_score_listing(profile: &PersonalityProfile) -> String {
    profile
        .iter()
        .map(|(t, s)| format!("- {}: {}/10 ({}%)", t, s.score, s.percentage))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Narrative level on the 0-10 scale (summaries only; labels use the interpreter)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NarrativeLevel {
    Low,
    Medium,
    High,
}

impl NarrativeLevel {
    pub fn from_score(score: f64) -> Self {
        if score > 6.5 {
            NarrativeLevel::High
        } else if score > 3.5 {
            NarrativeLevel::Medium
        } else {
            NarrativeLevel::Low
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            NarrativeLevel::Low => "low",
            NarrativeLevel::Medium => "medium",
            NarrativeLevel::High => "high",
        }
    }
}
