//! Offline rule-based summaries
//!
//! Deterministic narrative used when no text-generation backend is
//! configured or when the backend fails.

use super::{NarrativeLevel, ProfileSummary, Summarizer};
use anyhow::Result;
use async_trait::async_trait;
use big5_common::{PersonalityProfile, Trait};

pub const RULE_BASED_PROVENANCE: &str = "Rule-based (AI unavailable)";

fn description(t: Trait, level: NarrativeLevel) -> &'static str {
    use NarrativeLevel::*;
    match (t, level) {
        (Trait::Openness, High) => "creative, curious, and open to new experiences",
        (Trait::Openness, Medium) => "moderately open to new ideas with practical considerations",
        (Trait::Openness, Low) => "practical, conventional, and prefers familiar routines",
        (Trait::Conscientiousness, High) => "organized, disciplined, and goal-oriented",
        (Trait::Conscientiousness, Medium) => "reasonably organized with balanced spontaneity",
        (Trait::Conscientiousness, Low) => "spontaneous, flexible, and adaptable",
        (Trait::Extraversion, High) => "outgoing, energetic, and socially engaged",
        (Trait::Extraversion, Medium) => "balanced social engagement with alone time",
        (Trait::Extraversion, Low) => "reserved, introspective, and values solitude",
        (Trait::Agreeableness, High) => "compassionate, cooperative, and empathetic",
        (Trait::Agreeableness, Medium) => "cooperative with assertiveness when needed",
        (Trait::Agreeableness, Low) => "direct, competitive, and values honesty",
        (Trait::Neuroticism, High) => "emotionally sensitive and aware of feelings",
        (Trait::Neuroticism, Medium) => "emotionally balanced with normal stress responses",
        (Trait::Neuroticism, Low) => "emotionally stable and resilient",
    }
}

fn describe(t: Trait, score: f64) -> &'static str {
    description(t, NarrativeLevel::from_score(score))
}

fn level(score: f64) -> &'static str {
    NarrativeLevel::from_score(score).as_str()
}

/// Pick one of three phrases by the 6 / 4 relationship thresholds
fn tiered(score: f64, high: &'static str, mid: &'static str, low: &'static str) -> &'static str {
    if score > 6.0 {
        high
    } else if score > 4.0 {
        mid
    } else {
        low
    }
}

/// Rule-based summarizer
#[derive(Debug, Clone, Copy, Default)]
pub struct RuleBasedSummarizer;

impl RuleBasedSummarizer {
    pub fn new() -> Self {
        Self
    }

    /// Synchronous summary (also the fallback for remote summarizers)
    pub fn summary(&self, profile: &PersonalityProfile) -> ProfileSummary {
        let score = |t: Trait| profile.get(t).score;
        let avg = profile.average_score();
        let (top, top_score) = profile.strongest();
        let (bottom, bottom_score) = profile.weakest();
        let top_score = top_score.score;
        let bottom_score = bottom_score.score;
        let balance = if avg > 3.0 && avg < 7.0 {
            "well-balanced"
        } else {
            "distinctive"
        };

        let o = score(Trait::Openness);
        let c = score(Trait::Conscientiousness);
        let e = score(Trait::Extraversion);
        let a = score(Trait::Agreeableness);
        let n = score(Trait::Neuroticism);

        let full_summary = format!(
            "## Overall Personality Summary\n\n\
Your personality profile shows an average score of {avg:.1}/10 across all traits. \
You are particularly strong in {top} ({top_score}/10), which suggests you are {top_desc}. \
Your profile indicates a {balance} personality with unique strengths.\n\n\
## Trait-by-Trait Analysis\n\n\
### Openness to Experience: {o}/10\n\
You show {o_level} openness, meaning you are {o_desc}.\n\n\
### Conscientiousness: {c}/10\n\
Your conscientiousness is {c_level}, indicating you are {c_desc}.\n\n\
### Extraversion: {e}/10\n\
With {e_level} extraversion, you are {e_desc}.\n\n\
### Agreeableness: {a}/10\n\
Your agreeableness is {a_level}, showing you are {a_desc}.\n\n\
### Neuroticism: {n}/10\n\
Your neuroticism score indicates you are {n_desc}.\n\n\
## Key Strengths\n\n\
Based on your scores, your main strengths include:\n\
- **{top}** ({top_score}/10): This is your strongest trait\n\
- Balanced approach across multiple personality dimensions\n\
- Unique combination of traits that defines your individuality\n\n\
## Growth Areas\n\n\
Areas for potential development:\n\
- **{bottom}** ({bottom_score}/10): Consider exploring activities that build this trait\n\
- Balance between different aspects of your personality\n\
- Self-awareness through continuous reflection\n\n\
## Career Suggestions\n\n\
Based on your profile, suitable career paths might include:\n\
- Roles that leverage your high {top_lower}\n\
- Environments that match your {e_level} social engagement preference\n\
- Positions requiring {c_level} levels of structure\n\n\
## Relationship Style\n\n\
Your personality suggests you approach relationships with:\n\
- {a_style}\n\
- {e_style}\n\
- {n_style}\n",
            top_desc = describe(top, top_score),
            o_level = level(o),
            o_desc = describe(Trait::Openness, o),
            c_level = level(c),
            c_desc = describe(Trait::Conscientiousness, c),
            e_level = level(e),
            e_desc = describe(Trait::Extraversion, e),
            a_level = level(a),
            a_desc = describe(Trait::Agreeableness, a),
            n_desc = describe(Trait::Neuroticism, n),
            top_lower = top.name().to_lowercase(),
            a_style = tiered(
                a,
                "High empathy and cooperation",
                "Balanced cooperation and assertiveness",
                "Direct communication and honesty"
            ),
            e_style = tiered(
                e,
                "Social engagement and energy sharing",
                "Balanced social interaction",
                "Meaningful one-on-one connections"
            ),
            n_style = tiered(
                n,
                "Emotional awareness and sensitivity",
                "Emotional stability with normal responses",
                "Calm and resilient demeanor"
            ),
        );

        let short_summary = format!(
            "Your personality profile (average {avg:.1}/10) shows particularly strong {top} ({top_score}/10), \
indicating you are {}. This unique combination of traits shapes how you interact with the world \
and approach challenges.",
            describe(top, top_score)
        );

        ProfileSummary {
            full_summary,
            short_summary,
            generated_at: RULE_BASED_PROVENANCE.to_string(),
        }
    }

    /// Synchronous single-trait insight
    pub fn insight(&self, t: Trait, score: f64) -> String {
        let level = if score > 6.5 {
            "high"
        } else if score > 3.5 {
            "moderate"
        } else {
            "low"
        };
        let pick = |high: &'static str, moderate: &'static str, low: &'static str| match level {
            "high" => high,
            "moderate" => moderate,
            _ => low,
        };

        match t {
            Trait::Openness => format!(
                "Your {level} openness ({score}/10) influences your curiosity and creativity. \
This affects how you approach new experiences and problem-solving in daily life."
            ),
            Trait::Conscientiousness => format!(
                "With {level} conscientiousness ({score}/10), you show {}. \
This impacts your work ethic and goal achievement.",
                pick(
                    "strong organizational skills",
                    "balanced flexibility",
                    "spontaneous adaptability"
                )
            ),
            Trait::Extraversion => format!(
                "Your {level} extraversion ({score}/10) shapes your social energy. You {}.",
                pick(
                    "thrive in social settings",
                    "balance social interaction with alone time",
                    "prefer deep one-on-one connections"
                )
            ),
            Trait::Agreeableness => format!(
                "Your {level} agreeableness ({score}/10) influences how you collaborate. \
You tend to be {}.",
                pick(
                    "highly cooperative and empathetic",
                    "balanced in cooperation and assertiveness",
                    "direct and honest in communication"
                )
            ),
            Trait::Neuroticism => format!(
                "With {level} emotional sensitivity ({score}/10), you {}. \
This affects stress management and resilience.",
                pick(
                    "are highly aware of emotions",
                    "experience normal emotional responses",
                    "maintain emotional stability"
                )
            ),
        }
    }
}

#[async_trait]
impl Summarizer for RuleBasedSummarizer {
    fn source_id(&self) -> &'static str {
        "rule-based"
    }

    async fn summarize(&self, profile: &PersonalityProfile) -> Result<ProfileSummary> {
        Ok(self.summary(profile))
    }

    async fn trait_insight(&self, t: Trait, score: f64) -> Result<String> {
        Ok(self.insight(t, score))
    }
}
