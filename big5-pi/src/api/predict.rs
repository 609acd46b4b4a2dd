//! Profile prediction endpoint
//!
//! **Request:** `{"comments": ["..."], "include_summary": true}`
//! **Response:** `{"scores": {...}, "interpretations": {...}, "summary": {...},
//! "success": true, "degraded": false}`
//!
//! The core runs on a blocking thread. Summary failures never fail the
//! request; prediction failures either fail it (500) or, with
//! `pipeline.fallback_on_error`, yield the neutral profile marked `degraded`.

use crate::error::PredictionError;
use crate::services::{ProfileInterpretation, ProfileSummary};
use crate::{ApiError, ApiResult, AppState};
use axum::{extract::State, routing::post, Json, Router};
use big5_common::PersonalityProfile;
use serde::{Deserialize, Serialize};
use tracing::{error, info, warn};

pub const SUMMARY_UNAVAILABLE: &str = "AI summary temporarily unavailable";
pub const SHORT_SUMMARY_UNAVAILABLE: &str = "Unable to generate summary at this time";

fn default_include_summary() -> bool {
    true
}

#[derive(Debug, Deserialize)]
pub struct PredictRequest {
    #[serde(default)]
    pub comments: Vec<String>,
    #[serde(default = "default_include_summary")]
    pub include_summary: bool,
}

#[derive(Debug, Serialize)]
pub struct PredictResponse {
    pub scores: PersonalityProfile,
    pub interpretations: ProfileInterpretation,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<ProfileSummary>,
    pub success: bool,
    /// Neutral profile substituted after a prediction failure
    pub degraded: bool,
}

async fn run_prediction(
    state: &AppState,
    comments: Vec<String>,
) -> Result<PersonalityProfile, PredictionError> {
    let predictor = state.predictor.clone();
    tokio::task::spawn_blocking(move || predictor.predict_profile(comments.as_slice()))
        .await
        .map_err(|e| PredictionError::Worker(e.to_string()))?
}

async fn summarize(state: &AppState, profile: &PersonalityProfile) -> ProfileSummary {
    match state.summarizer.summarize(profile).await {
        Ok(summary) => summary,
        Err(e) => {
            warn!(error = %e, "Summary generation failed");
            ProfileSummary {
                full_summary: SUMMARY_UNAVAILABLE.to_string(),
                short_summary: SHORT_SUMMARY_UNAVAILABLE.to_string(),
                generated_at: "unavailable".to_string(),
            }
        }
    }
}

/// POST /predict
pub async fn predict(
    State(state): State<AppState>,
    Json(request): Json<PredictRequest>,
) -> ApiResult<Json<PredictResponse>> {
    if request.comments.is_empty() {
        return Err(ApiError::BadRequest("No comments provided".to_string()));
    }

    let comment_count = request.comments.len();
    let (profile, degraded) = match run_prediction(&state, request.comments).await {
        Ok(profile) => {
            // Health reports the latest outcome, not a stale failure
            if state.last_error.write().await.take().is_some() {
                info!("Prediction recovered after earlier failure");
            }
            (profile, false)
        }
        Err(e) if state.fallback_on_error => {
            error!(error = %e, comments = comment_count, "Prediction failed, serving neutral profile");
            *state.last_error.write().await = Some(format!("Prediction failed: {}", e));
            (PersonalityProfile::neutral(), true)
        }
        Err(e) => {
            error!(error = %e, comments = comment_count, "Prediction failed");
            *state.last_error.write().await = Some(format!("Prediction failed: {}", e));
            return Err(ApiError::Prediction(e));
        }
    };

    let summary = if request.include_summary && state.summary_enabled {
        Some(summarize(&state, &profile).await)
    } else {
        None
    };

    info!(comments = comment_count, degraded, "Prediction served");

    Ok(Json(PredictResponse {
        interpretations: ProfileInterpretation::from_profile(&profile),
        scores: profile,
        summary,
        success: true,
        degraded,
    }))
}

pub fn predict_routes() -> Router<AppState> {
    Router::new().route("/predict", post(predict))
}
