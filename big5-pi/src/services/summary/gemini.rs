//! Gemini text-generation client
//!
//! Prompts are built from the textual score listing only. Each configured
//! model is tried in order; when every model fails the rule-based
//! summarizer answers instead, so callers never see a backend error.
//!
//! API: `POST {base_url}/models/{model}:generateContent?key={api_key}`

use super::rule_based::RuleBasedSummarizer;
use super::{format_score_listing, ProfileSummary, Summarizer};
use anyhow::{anyhow, bail, Context, Result};
use async_trait::async_trait;
use big5_common::config::SummaryConfig;
use big5_common::{PersonalityProfile, Trait};
use governor::{Quota, RateLimiter};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::num::NonZeroU32;
use std::time::Duration;
use tracing::{debug, warn};

pub const GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";
pub const AI_PROVENANCE: &str = "AI-generated";

#[derive(Debug, Serialize)]
struct GenerateRequest<'a> {
    contents: [Content<'a>; 1],
}

#[derive(Debug, Serialize)]
struct Content<'a> {
    parts: [Part<'a>; 1],
}

#[derive(Debug, Serialize)]
struct Part<'a> {
    text: &'a str,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: CandidateContent,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Debug, Deserialize)]
struct CandidatePart {
    #[serde(default)]
    text: String,
}

impl GenerateResponse {
    fn into_text(self) -> Option<String> {
        self.candidates
            .into_iter()
            .next()?
            .content
            .parts
            .into_iter()
            .next()
            .map(|p| p.text)
            .filter(|t| !t.trim().is_empty())
    }
}

pub(crate) fn full_prompt(scores_text: &str) -> String {
    format!(
        "Based on the following Big Five personality trait scores, provide a comprehensive personality analysis:\n\n\
{scores_text}\n\n\
Please provide:\n\n\
1. **Overall Personality Summary** (2-3 sentences)\n\
2. **Trait-by-Trait Analysis** (brief explanation for each trait)\n\
3. **Key Strengths** (3-4 bullet points)\n\
4. **Growth Areas** (2-3 bullet points)\n\
5. **Career Suggestions** (3-4 suitable career paths)\n\
6. **Relationship Style** (how they might interact in relationships)\n\n\
Format the response in clear sections with bullet points where appropriate. Be encouraging and constructive."
    )
}

pub(crate) fn short_prompt(scores_text: &str) -> String {
    format!(
        "Based on these Big Five scores: {scores_text}\n\n\
Provide a 2-sentence personality snapshot that captures the essence of this personality profile."
    )
}

pub(crate) fn insight_prompt(t: Trait, score: f64) -> String {
    format!(
        "For the personality trait {t} with a score of {score}/10 ({}%):\n\n\
Provide:\n\
1. What this score means in everyday behavior\n\
2. How this manifests in work settings\n\
3. Tips for leveraging this trait effectively\n\n\
Keep it concise (3-4 sentences total).",
        score * 10.0
    )
}

/// Gemini-backed summarizer with rule-based fallback
pub struct GeminiSummarizer {
    client: Client,
    base_url: String,
    api_key: String,
    /// Tried in order until one answers
    models: Vec<String>,
    rate_limiter: RateLimiter<
        governor::state::direct::NotKeyed,
        governor::state::InMemoryState,
        governor::clock::DefaultClock,
    >,
    fallback: RuleBasedSummarizer,
}

impl GeminiSummarizer {
    pub fn new(api_key: String, config: &SummaryConfig) -> Result<Self> {
        Self::with_base_url(api_key, config, GEMINI_BASE_URL)
    }

    pub fn with_base_url(
        api_key: String,
        config: &SummaryConfig,
        base_url: impl Into<String>,
    ) -> Result<Self> {
        if config.models.is_empty() {
            bail!("no summary models configured");
        }
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .connect_timeout(Duration::from_secs(config.timeout_secs.min(5)))
            .build()
            .context("Failed to build HTTP client")?;
        let per_minute = NonZeroU32::new(config.requests_per_minute)
            .ok_or_else(|| anyhow!("summary requests_per_minute must be non-zero"))?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key,
            models: config.models.clone(),
            rate_limiter: RateLimiter::direct(Quota::per_minute(per_minute)),
            fallback: RuleBasedSummarizer::new(),
        })
    }

    async fn generate_with(&self, model: &str, prompt: &str) -> Result<String> {
        self.rate_limiter.until_ready().await;

        let url = format!("{}/models/{}:generateContent", self.base_url, model);
        let body = GenerateRequest {
            contents: [Content {
                parts: [Part { text: prompt }],
            }],
        };

        let response = self
            .client
            .post(&url)
            .query(&[("key", self.api_key.as_str())])
            .json(&body)
            .send()
            .await
            .context("Gemini request failed")?;

        let status = response.status();
        if !status.is_success() {
            bail!("Gemini returned error status: {}", status);
        }

        let parsed: GenerateResponse = response
            .json()
            .await
            .context("Failed to parse Gemini response")?;
        parsed
            .into_text()
            .ok_or_else(|| anyhow!("Gemini response had no text"))
    }

    /// Try every configured model in order
    pub async fn generate(&self, prompt: &str) -> Result<String> {
        let mut last_error = None;
        for model in &self.models {
            match self.generate_with(model, prompt).await {
                Ok(text) => {
                    debug!(model = %model, "Gemini generation succeeded");
                    return Ok(text);
                }
                Err(e) => {
                    debug!(model = %model, error = %e, "Gemini model failed, trying next");
                    last_error = Some(e);
                }
            }
        }
        Err(last_error.unwrap_or_else(|| anyhow!("no summary models configured")))
    }

    async fn remote_summary(&self, profile: &PersonalityProfile) -> Result<ProfileSummary> {
        let scores_text = format_score_listing(profile);
        let full_summary = self.generate(&full_prompt(&scores_text)).await?;
        let short_summary = self.generate(&short_prompt(&scores_text)).await?;
        Ok(ProfileSummary {
            full_summary,
            short_summary,
            generated_at: AI_PROVENANCE.to_string(),
        })
    }
}

impl std::fmt::Debug for GeminiSummarizer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GeminiSummarizer")
            .field("base_url", &self.base_url)
            .field("models", &self.models)
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl Summarizer for GeminiSummarizer {
    fn source_id(&self) -> &'static str {
        "gemini"
    }

    async fn summarize(&self, profile: &PersonalityProfile) -> Result<ProfileSummary> {
        match self.remote_summary(profile).await {
            Ok(summary) => Ok(summary),
            Err(e) => {
                warn!(error = %e, "AI summary generation failed, using rule-based summary");
                Ok(self.fallback.summary(profile))
            }
        }
    }

    async fn trait_insight(&self, t: Trait, score: f64) -> Result<String> {
        match self.generate(&insight_prompt(t, score)).await {
            Ok(text) => Ok(text),
            Err(e) => {
                warn!(error = %e, trait_name = %t, "AI trait insight failed, using rule-based insight");
                Ok(self.fallback.insight(t, score))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::summary::rule_based::RULE_BASED_PROVENANCE;

    fn config() -> SummaryConfig {
        SummaryConfig {
            timeout_secs: 1,
            models: vec!["gemini-1.5-flash".to_string(), "gemini-pro".to_string()],
            ..SummaryConfig::default()
        }
    }

    #[test]
    fn test_prompts_carry_score_listing() {
        let listing = format_score_listing(&PersonalityProfile::neutral());
        let prompt = full_prompt(&listing);
        assert!(prompt.contains("- Openness: 5/10 (50%)"));
        assert!(prompt.contains("6. **Relationship Style**"));
        assert!(short_prompt(&listing).starts_with("Based on these Big Five scores: - Openness"));
        assert!(insight_prompt(Trait::Agreeableness, 7.5)
            .starts_with("For the personality trait Agreeableness with a score of 7.5/10 (75%)"));
    }

    #[test]
    fn test_response_text_extraction() {
        let body = serde_json::json!({
            "candidates": [{"content": {"parts": [{"text": "A curious mind."}]}}]
        });
        let parsed: GenerateResponse = serde_json::from_value(body).unwrap();
        assert_eq!(parsed.into_text().as_deref(), Some("A curious mind."));

        let empty: GenerateResponse = serde_json::from_value(serde_json::json!({})).unwrap();
        assert_eq!(empty.into_text(), None);
    }

    #[test]
    fn test_rejects_zero_rate() {
        let cfg = SummaryConfig {
            requests_per_minute: 0,
            ..config()
        };
        assert!(GeminiSummarizer::new("key".to_string(), &cfg).is_err());
    }

    #[tokio::test]
    async fn test_unreachable_backend_falls_back() {
        // Port 9 (discard) on loopback refuses connections
        let summarizer =
            GeminiSummarizer::with_base_url("key".to_string(), &config(), "http://127.0.0.1:9")
                .unwrap();
        let profile = PersonalityProfile::from_means([7.0, 5.0, 3.0, 6.0, 4.0]);

        let summary = summarizer.summarize(&profile).await.unwrap();
        assert_eq!(summary.generated_at, RULE_BASED_PROVENANCE);

        let insight = summarizer
            .trait_insight(Trait::Openness, 7.0)
            .await
            .unwrap();
        assert!(insight.starts_with("Your high openness (7/10)"));
    }
}
