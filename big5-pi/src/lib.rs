//! big5-pi library interface
//!
//! Big Five personality inference from free-text comments. Each comment is
//! normalized, run through four independent feature extractors, fused into a
//! fixed 781-wide vector, scored by the trait regressor, and the per-comment
//! scores are averaged into one profile.

pub mod api;
pub mod config;
pub mod error;
pub mod fusion;
pub mod models;
pub mod normalizer;
pub mod regressor;
pub mod services;
pub mod workflow;

pub use crate::error::{ApiError, ApiResult};

use axum::{http::HeaderValue, Router};
use chrono::{DateTime, Utc};
use services::Summarizer;
use std::sync::Arc;
use tokio::sync::RwLock;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::warn;
use uuid::Uuid;
use workflow::ProfilePredictor;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    /// Loaded models, shared read-only by every request
    pub predictor: Arc<ProfilePredictor>,
    pub summarizer: Arc<dyn Summarizer>,
    /// Serve the neutral profile when prediction fails
    pub fallback_on_error: bool,
    pub summary_enabled: bool,
    /// Service startup timestamp for uptime tracking
    pub startup_time: DateTime<Utc>,
    /// Last error for diagnostic purposes
    pub last_error: Arc<RwLock<Option<String>>>,
}

impl AppState {
    pub fn new(
        predictor: Arc<ProfilePredictor>,
        summarizer: Arc<dyn Summarizer>,
        fallback_on_error: bool,
        summary_enabled: bool,
    ) -> Self {
        Self {
            predictor,
            summarizer,
            fallback_on_error,
            summary_enabled,
            startup_time: Utc::now(),
            last_error: Arc::new(RwLock::new(None)),
        }
    }
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    let allowed: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|o| match o.parse::<HeaderValue>() {
            Ok(v) => Some(v),
            Err(_) => {
                warn!(origin = %o, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(allowed)
        .allow_methods(Any)
        .allow_headers(Any)
}

/// Build application router
pub fn build_router(state: AppState, cors_origins: &[String]) -> Router {
    Router::new()
        .merge(api::root_routes())
        .merge(api::health_routes())
        .merge(api::predict_routes())
        .merge(api::insight_routes())
        .with_state(state)
        .layer(TraceLayer::new_for_http().make_span_with(
            |request: &axum::http::Request<axum::body::Body>| {
                tracing::info_span!(
                    "request",
                    request_id = %Uuid::new_v4(),
                    method = %request.method(),
                    uri = %request.uri(),
                )
            },
        ))
        .layer(cors_layer(cors_origins))
}
