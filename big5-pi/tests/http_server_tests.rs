//! HTTP Server & Routing Integration Tests

mod helpers;

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use big5_common::{PersonalityProfile, Trait};
use big5_pi::services::{ProfileSummary, RuleBasedSummarizer, Summarizer};
use big5_pi::workflow::ProfilePredictor;
use big5_pi::{build_router, AppState};
use helpers::*;
use http_body_util::BodyExt;
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceExt;

struct BrokenSummarizer;

#[async_trait]
impl Summarizer for BrokenSummarizer {
    fn source_id(&self) -> &'static str {
        "broken"
    }

    async fn summarize(&self, _profile: &PersonalityProfile) -> anyhow::Result<ProfileSummary> {
        anyhow::bail!("collaborator down")
    }

    async fn trait_insight(&self, _t: Trait, _score: f64) -> anyhow::Result<String> {
        anyhow::bail!("collaborator down")
    }
}

fn app_with(
    predictor: ProfilePredictor,
    summarizer: Arc<dyn Summarizer>,
    fallback: bool,
) -> (Router, AppState) {
    let state = AppState::new(Arc::new(predictor), summarizer, fallback, true);
    let origins = vec!["http://localhost:3000".to_string()];
    (build_router(state.clone(), &origins), state)
}

fn test_app() -> Router {
    app_with(table_predictor(false), Arc::new(RuleBasedSummarizer::new()), true).0
}

async fn send(app: Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, body)
}

fn post_json(uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

#[tokio::test]
async fn test_root_banner() {
    let (status, body) = send(
        test_app(),
        Request::builder().uri("/").body(Body::empty()).unwrap(),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        json!({"message": "Big Five Personality Prediction API", "status": "running"})
    );
}

#[tokio::test]
async fn test_health_endpoint() {
    let (status, body) = send(
        test_app(),
        Request::builder().uri("/health").body(Body::empty()).unwrap(),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert_eq!(body["module"], "big5-pi");
    assert_eq!(body["regressor_encoding"], "table_stub");
    assert_eq!(body["summarizer"], "rule-based");
    assert!(body["uptime_seconds"].is_u64());
    assert!(body.get("last_error").is_none());
}

#[tokio::test]
async fn test_predict_returns_profile_and_labels() {
    let (status, body) = send(
        test_app(),
        post_json("/predict", json!({"comments": [HIGH_COMMENT, LOW_COMMENT, HIGH_COMMENT]})),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["degraded"], false);

    let scores = body["scores"].as_object().unwrap();
    assert_eq!(scores.len(), 5);
    assert_eq!(body["scores"]["Openness"]["score"], 6.0);
    assert_eq!(body["scores"]["Openness"]["percentage"], 60.0);
    assert_eq!(body["scores"]["Neuroticism"]["score"], 4.0);

    assert_eq!(
        body["interpretations"]["Openness"],
        "Balanced approach to new experiences"
    );
    assert_eq!(body["summary"]["generated_at"], "Rule-based (AI unavailable)");
}

#[tokio::test]
async fn test_predict_without_summary() {
    let (status, body) = send(
        test_app(),
        post_json("/predict", json!({"comments": [HIGH_COMMENT], "include_summary": false})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.get("summary").is_none());
    assert_eq!(body["scores"]["Agreeableness"]["score"], 9.0);
}

#[tokio::test]
async fn test_empty_comments_rejected() {
    for payload in [json!({"comments": []}), json!({})] {
        let (status, body) = send(test_app(), post_json("/predict", payload)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["code"], "BAD_REQUEST");
        assert_eq!(body["error"]["message"], "No comments provided");
    }
}

#[tokio::test]
async fn test_prediction_failure_serves_degraded_neutral_profile() {
    let (app, state) = app_with(
        stub_predictor(Arc::new(FailingRegressor), false),
        Arc::new(RuleBasedSummarizer::new()),
        true,
    );

    let (status, body) = send(
        app.clone(),
        post_json("/predict", json!({"comments": ["hi there"]})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["degraded"], true);
    for t in Trait::ALL {
        assert_eq!(body["scores"][t.name()]["score"], 5.0);
        assert_eq!(body["scores"][t.name()]["percentage"], 50.0);
    }
    assert!(state.last_error.read().await.is_some());

    let (_, health) = send(
        app,
        Request::builder().uri("/health").body(Body::empty()).unwrap(),
    )
    .await;
    assert_eq!(health["status"], "degraded");
    assert!(health["last_error"].as_str().unwrap().contains("regressor offline"));
}

#[tokio::test]
async fn test_successful_prediction_clears_last_error() {
    let regressor = Arc::new(FlakyRegressor::default());
    regressor.set_offline(true);
    let (app, state) = app_with(
        stub_predictor(regressor.clone(), false),
        Arc::new(RuleBasedSummarizer::new()),
        true,
    );
    let health = || Request::builder().uri("/health").body(Body::empty()).unwrap();

    let (_, body) = send(app.clone(), post_json("/predict", json!({"comments": ["hi there"]}))).await;
    assert_eq!(body["degraded"], true);
    let (_, status) = send(app.clone(), health()).await;
    assert_eq!(status["status"], "degraded");

    regressor.set_offline(false);
    let (code, body) = send(app.clone(), post_json("/predict", json!({"comments": ["hi there"]}))).await;
    assert_eq!(code, StatusCode::OK);
    assert_eq!(body["degraded"], false);
    assert!(state.last_error.read().await.is_none());

    let (_, status) = send(app, health()).await;
    assert_eq!(status["status"], "ok");
    assert!(status.get("last_error").is_none());
}

#[tokio::test]
async fn test_prediction_failure_without_fallback_is_500() {
    let (app, _) = app_with(
        stub_predictor(Arc::new(FailingRegressor), false),
        Arc::new(RuleBasedSummarizer::new()),
        false,
    );
    let (status, body) = send(app, post_json("/predict", json!({"comments": ["hi there"]}))).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["error"]["code"], "PREDICTION_ERROR");
}

#[tokio::test]
async fn test_summary_failure_uses_placeholders() {
    let (app, _) = app_with(table_predictor(false), Arc::new(BrokenSummarizer), true);
    let (status, body) = send(app, post_json("/predict", json!({"comments": [LOW_COMMENT]}))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["degraded"], false);
    assert_eq!(body["summary"]["full_summary"], "AI summary temporarily unavailable");
    assert_eq!(
        body["summary"]["short_summary"],
        "Unable to generate summary at this time"
    );
}

#[tokio::test]
async fn test_trait_insight() {
    let request = Request::builder()
        .method("POST")
        .uri("/trait-insight?trait=extraversion&score=7")
        .body(Body::empty())
        .unwrap();
    let (status, body) = send(test_app(), request).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["trait"], "Extraversion");
    assert_eq!(body["score"], 7.0);
    assert!(body["insight"]
        .as_str()
        .unwrap()
        .starts_with("Your high extraversion (7/10)"));
}

#[tokio::test]
async fn test_trait_insight_unknown_trait() {
    let request = Request::builder()
        .method("POST")
        .uri("/trait-insight?trait=Charisma&score=5")
        .body(Body::empty())
        .unwrap();
    let (status, body) = send(test_app(), request).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["message"], "Unknown trait: Charisma");
}

#[tokio::test]
async fn test_cors_preflight_allows_configured_origin() {
    let request = Request::builder()
        .method("OPTIONS")
        .uri("/predict")
        .header("origin", "http://localhost:3000")
        .header("access-control-request-method", "POST")
        .body(Body::empty())
        .unwrap();
    let response = test_app().oneshot(request).await.unwrap();
    assert_eq!(
        response
            .headers()
            .get("access-control-allow-origin")
            .and_then(|v| v.to_str().ok()),
        Some("http://localhost:3000")
    );
}
