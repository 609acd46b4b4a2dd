//! Service banner

use axum::{routing::get, Json, Router};
use serde::Serialize;

use crate::AppState;

#[derive(Debug, Serialize)]
pub struct RootResponse {
    pub message: &'static str,
    pub status: &'static str,
}

/// GET /
pub async fn root() -> Json<RootResponse> {
    Json(RootResponse {
        message: "Big Five Personality Prediction API",
        status: "running",
    })
}

pub fn root_routes() -> Router<AppState> {
    Router::new().route("/", get(root))
}
