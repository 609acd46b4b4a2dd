//! Single-trait insight endpoint
//!
//! `POST /trait-insight?trait=Openness&score=7.5`

use crate::{ApiError, ApiResult, AppState};
use axum::{
    extract::{Query, State},
    routing::post,
    Json, Router,
};
use big5_common::Trait;
use serde::{Deserialize, Serialize};
use tracing::warn;

#[derive(Debug, Deserialize)]
pub struct InsightQuery {
    #[serde(rename = "trait")]
    pub trait_name: String,
    pub score: f64,
}

#[derive(Debug, Serialize)]
pub struct InsightResponse {
    #[serde(rename = "trait")]
    pub trait_name: Trait,
    pub score: f64,
    pub insight: String,
}

/// POST /trait-insight
pub async fn trait_insight(
    State(state): State<AppState>,
    Query(query): Query<InsightQuery>,
) -> ApiResult<Json<InsightResponse>> {
    let t: Trait = query.trait_name.parse()?;
    if !query.score.is_finite() {
        return Err(ApiError::BadRequest("score must be a finite number".to_string()));
    }

    let insight = state
        .summarizer
        .trait_insight(t, query.score)
        .await
        .unwrap_or_else(|e| {
            warn!(error = %e, trait_name = %t, "Trait insight generation failed");
            "Insight temporarily unavailable".to_string()
        });

    Ok(Json(InsightResponse {
        trait_name: t,
        score: query.score,
        insight,
    }))
}

pub fn insight_routes() -> Router<AppState> {
    Router::new().route("/trait-insight", post(trait_insight))
}
