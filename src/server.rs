//! HTTP/JSON API for the insight pipelines.

use std::collections::BTreeMap;
use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::{info, warn};

use crate::ai::{run_all_ai_insights, AiAnalysisResults, AiClient};
use crate::config::Config;
use crate::error::InputError;
use crate::insights::orchestrator::{InsightFailure, RunMetadata};
use crate::insights::summaries::ConsolidatedInsights;
use crate::insights::{run_all_trading_insights, InsightReport};
use crate::models::InsightKind;

/// Shared, read-only state for the handlers.
#[derive(Clone)]
pub struct AppState {
    pub ai: Arc<AiClient>,
    pub config: Arc<Config>,
}

impl AppState {
    pub fn new(config: Config) -> Self {
        let ai = AiClient::from_config(&config.ai());
        Self {
            ai: Arc::new(ai),
            config: Arc::new(config),
        }
    }
}

pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/api/trading-insights", post(trading_insights))
        .route("/api/ai-insights", post(ai_insights))
        .with_state(state)
}

async fn health_check() -> &'static str {
    "OK"
}

/// Both analysis endpoints take the journal rows under `data`. A missing
/// field reads as null and is rejected as not-an-array.
#[derive(Debug, Deserialize)]
pub struct InsightsRequest {
    #[serde(default)]
    pub data: Value,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TradingInsightsResponse {
    pub success: bool,
    pub results: BTreeMap<InsightKind, InsightReport>,
    pub summaries: BTreeMap<InsightKind, String>,
    pub errors: Vec<InsightFailure>,
    pub consolidated_insights: ConsolidatedInsights,
    pub metadata: RunMetadata,
}

async fn trading_insights(
    State(state): State<AppState>,
    body: Result<Json<InsightsRequest>, JsonRejection>,
) -> Result<Json<TradingInsightsResponse>, ApiError> {
    let Json(req) = body?;
    info!(
        "Trading insights requested for {} records",
        req.data.as_array().map_or(0, Vec::len)
    );

    let results = run_all_trading_insights(&req.data, &state.config.insight_options())?;

    Ok(Json(TradingInsightsResponse {
        success: results.success,
        results: results.insights,
        summaries: results.concise_summaries,
        errors: results.errors,
        consolidated_insights: results.consolidated_insights,
        metadata: results.metadata,
    }))
}

async fn ai_insights(
    State(state): State<AppState>,
    body: Result<Json<InsightsRequest>, JsonRejection>,
) -> Result<Json<AiAnalysisResults>, ApiError> {
    let Json(req) = body?;
    info!(
        "AI insights requested for {} records",
        req.data.as_array().map_or(0, Vec::len)
    );

    let results = run_all_ai_insights(
        &req.data,
        &state.ai,
        &state.config.insight_options(),
        state.config.min_ai_trades,
    )
    .await?;

    Ok(Json(results))
}

/// Request validation failure, rendered as `{success: false, error}` with a
/// 400 status.
#[derive(Debug)]
pub enum ApiError {
    Input(InputError),
    Body(String),
}

impl From<InputError> for ApiError {
    fn from(error: InputError) -> Self {
        ApiError::Input(error)
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::Body(rejection.body_text())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        let message = match self {
            ApiError::Input(e) => e.to_string(),
            ApiError::Body(text) => text,
        };
        warn!("Rejected request: {}", message);
        let body = json!({
            "success": false,
            "error": message,
        });
        (StatusCode::BAD_REQUEST, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::{default_test_config, raw_trade};
    use axum::body::Body;
    use axum::http::Request;
    use tower::ServiceExt;

    fn app() -> Router {
        create_router(AppState::new(default_test_config()))
    }

    async fn post_json(uri: &str, body: Value) -> (StatusCode, Value) {
        let response = app()
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri(uri)
                    .header("content-type", "application/json")
                    .body(Body::from(body.to_string()))
                    .unwrap(),
            )
            .await
            .unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn test_health_check() {
        let response = app()
            .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_trading_insights() {
        let body = json!({"data": [
            raw_trade("13/01/2025", "09:20", "BANKNIFTY", 1200.0),
            raw_trade("14/01/2025", "11:05", "NIFTY", -300.0),
        ]});
        let (status, json) = post_json("/api/trading-insights", body).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["success"], true);
        assert_eq!(json["metadata"]["validTrades"], 2);
        assert_eq!(
            json["results"]["dayOfWeek"]["summary"]["bestDay"]["bucket"],
            "Monday"
        );
        assert!(json["summaries"]["duration"].is_string());
    }

    #[tokio::test]
    async fn test_non_array_is_bad_request() {
        let (status, json) = post_json("/api/trading-insights", json!({"data": {"x": 1}})).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["success"], false);
        assert_eq!(json["error"], "trade data must be an array");
    }

    #[tokio::test]
    async fn test_missing_data_is_bad_request() {
        let (status, _) = post_json("/api/trading-insights", json!({})).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_malformed_body_uses_error_envelope() {
        for (content_type, body) in [
            ("application/json", "{not json"),
            ("text/plain", r#"{"data": []}"#),
        ] {
            let response = app()
                .oneshot(
                    Request::builder()
                        .method("POST")
                        .uri("/api/trading-insights")
                        .header("content-type", content_type)
                        .body(Body::from(body))
                        .unwrap(),
                )
                .await
                .unwrap();
            assert_eq!(response.status(), StatusCode::BAD_REQUEST);
            let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
                .await
                .unwrap();
            let json: Value = serde_json::from_slice(&bytes).unwrap();
            assert_eq!(json["success"], false);
            assert!(json["error"].as_str().is_some_and(|e| !e.is_empty()));
        }
    }

    #[tokio::test]
    async fn test_ai_insights_needs_five_trades() {
        let body = json!({"data": [raw_trade("13/01/2025", "09:20", "NIFTY", 10.0)]});
        let (status, json) = post_json("/api/ai-insights", body).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["error"], "at least 5 trades are required, found 1");
    }

    #[tokio::test]
    async fn test_ai_insights_mock_mode() {
        let data: Vec<Value> = (13..=17)
            .map(|d| raw_trade(&format!("{}/01/2025", d), "10:00", "NIFTY", 100.0))
            .collect();
        let (status, json) = post_json("/api/ai-insights", json!({ "data": data })).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["success"], true);
        assert_eq!(json["metadata"]["mode"], "mock");
        assert_eq!(json["metadata"]["totalAICost"], 0.0);
        assert_eq!(json["results"]["direction"]["source"], "mock");
    }
}
