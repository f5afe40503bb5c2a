use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;
use std::collections::BTreeMap;
use std::time::Instant;
use tracing::{info, warn};

use crate::ai::client::{AiClient, GenerationRequest, TextGenerator, TokenUsage};
use crate::ai::mock::canned_response;
use crate::ai::parser::{parse_response, ParsedInsights};
use crate::ai::prompts::{build_prompt, SYSTEM_PROMPT};
use crate::error::InputError;
use crate::insights::{run_insight, InsightOptions};
use crate::models::InsightKind;
use crate::processing::process_raw_trading_data;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum InsightSource {
    Live,
    Mock,
    /// Canned text served after a failed live request.
    Fallback,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AiInsight {
    pub domain: InsightKind,
    pub title: String,
    pub source: InsightSource,
    #[serde(flatten)]
    pub parsed: ParsedInsights,
    pub raw_text: String,
    pub usage: TokenUsage,
    pub cost: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AiFailure {
    pub domain: InsightKind,
    pub error: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AiRunMetadata {
    pub analysis_date: DateTime<Utc>,
    pub total_trades: usize,
    pub valid_trades: usize,
    pub completed_insights: usize,
    pub failed_insights: usize,
    /// Domains that were answered with canned text after a live failure.
    pub fallback_insights: usize,
    #[serde(rename = "totalAICost")]
    pub total_ai_cost: f64,
    pub model: String,
    pub mode: String,
    pub processing_time_ms: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AiAnalysisResults {
    /// True when at least one domain produced commentary.
    pub success: bool,
    pub results: BTreeMap<InsightKind, AiInsight>,
    pub summaries: BTreeMap<InsightKind, String>,
    pub errors: Vec<AiFailure>,
    pub metadata: AiRunMetadata,
}

fn summarize(parsed: &ParsedInsights) -> String {
    let mut parts: Vec<&str> = Vec::new();
    parts.extend(parsed.insights.first().map(String::as_str));
    parts.extend(parsed.recommendations.first().map(String::as_str));
    parts.join(" ")
}

/// Runs the deterministic calculators, then asks the text generator for
/// commentary on each domain in turn. A failed generation falls back to
/// canned text; a failed calculator skips its domain.
pub async fn run_all_ai_insights(
    raw: &Value,
    client: &AiClient,
    options: &InsightOptions,
    min_trades: usize,
) -> Result<AiAnalysisResults, InputError> {
    let started = Instant::now();
    let items = raw.as_array().ok_or(InputError::NotAnArray)?;
    if items.is_empty() {
        return Err(InputError::Empty);
    }

    let batch = process_raw_trading_data(raw)?;
    if batch.valid_count() < min_trades {
        return Err(InputError::InsufficientTrades {
            required: min_trades,
            found: batch.valid_count(),
        });
    }

    info!(
        "Generating AI insights for {} trades ({} mode)",
        batch.valid_count(),
        client.mode()
    );

    let base_source = if client.is_live() {
        InsightSource::Live
    } else {
        InsightSource::Mock
    };

    let mut results = BTreeMap::new();
    let mut summaries = BTreeMap::new();
    let mut errors = Vec::new();
    let mut fallbacks = 0;
    let mut total_cost = 0.0;

    for kind in InsightKind::ALL {
        let report = match run_insight(kind, &batch.trades, options).into_result() {
            Ok(report) => report,
            Err(error) => {
                warn!("AI {} skipped, no table: {}", kind, error);
                errors.push(AiFailure {
                    domain: kind,
                    error,
                });
                continue;
            }
        };

        let request = GenerationRequest {
            domain: kind,
            system: SYSTEM_PROMPT.to_string(),
            prompt: build_prompt(&report, batch.valid_count()),
        };

        let (text, usage, cost, source) = match client.generate(&request).await {
            Ok(generation) => (generation.text, generation.usage, generation.cost, base_source),
            Err(e) => {
                if e.is_expected() {
                    info!("AI {} using fallback: {}", kind, e);
                } else {
                    warn!("AI {} request failed, using fallback: {}", kind, e);
                }
                fallbacks += 1;
                (
                    canned_response(kind),
                    TokenUsage::default(),
                    0.0,
                    InsightSource::Fallback,
                )
            }
        };

        let mut parsed = parse_response(&text);
        if parsed.is_empty() {
            parsed.insights.push(text.trim().to_string());
        }
        total_cost += cost;
        summaries.insert(kind, summarize(&parsed));
        results.insert(
            kind,
            AiInsight {
                domain: kind,
                title: kind.title().to_string(),
                source,
                parsed,
                raw_text: text,
                usage,
                cost,
            },
        );
    }

    let elapsed = started.elapsed().as_millis() as u64;
    info!(
        "AI insights complete: {} generated, {} failed, {} fallback, cost ${:.6}",
        results.len(),
        errors.len(),
        fallbacks,
        total_cost
    );

    Ok(AiAnalysisResults {
        success: !results.is_empty(),
        metadata: AiRunMetadata {
            analysis_date: Utc::now(),
            total_trades: batch.total_records,
            valid_trades: batch.valid_count(),
            completed_insights: results.len(),
            failed_insights: errors.len(),
            fallback_insights: fallbacks,
            total_ai_cost: total_cost,
            model: client.model_name().to_string(),
            mode: client.mode().to_string(),
            processing_time_ms: elapsed,
        },
        results,
        summaries,
        errors,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai::client::{GeminiClient, MockClient};
    use crate::test_helpers::{default_test_config, raw_trade};
    use serde_json::json;
    use wiremock::matchers::method;
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn five_trades() -> Value {
        json!([
            raw_trade("13/01/2025", "09:20", "BANKNIFTY", 1200.0),
            raw_trade("13/01/2025", "11:05", "NIFTY 23500 CE", -300.0),
            raw_trade("14/01/2025", "14:30", "RELIANCE", 450.0),
            raw_trade("15/01/2025", "10:00", "NIFTY", -150.0),
            raw_trade("16/01/2025", "12:40", "BANKNIFTY", 80.0),
        ])
    }

    #[tokio::test]
    async fn requires_minimum_trades() {
        let raw = json!([raw_trade("13/01/2025", "09:20", "NIFTY", 10.0)]);
        let client = AiClient::Mock(MockClient);
        let err = run_all_ai_insights(&raw, &client, &InsightOptions::default(), 5)
            .await
            .unwrap_err();
        assert_eq!(
            err,
            InputError::InsufficientTrades {
                required: 5,
                found: 1
            }
        );
    }

    #[tokio::test]
    async fn mock_client_covers_every_domain() {
        let client = AiClient::Mock(MockClient);
        let results = run_all_ai_insights(&five_trades(), &client, &InsightOptions::default(), 5)
            .await
            .unwrap();
        assert!(results.success);
        assert_eq!(results.results.len(), 7);
        assert_eq!(results.metadata.mode, "mock");
        assert_eq!(results.metadata.total_ai_cost, 0.0);
        assert!(results
            .results
            .values()
            .all(|r| r.source == InsightSource::Mock && !r.parsed.insights.is_empty()));
    }

    #[tokio::test]
    async fn quota_errors_fall_back_to_canned_text() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(
                ResponseTemplate::new(429)
                    .set_body_string(r#"{"error":{"status":"RESOURCE_EXHAUSTED"}}"#),
            )
            .mount(&server)
            .await;

        let mut cfg = default_test_config();
        cfg.google_api_key = Some("k".to_string());
        cfg.gemini_base_url = server.uri();
        let client = AiClient::Live(GeminiClient::new(&cfg.ai()).unwrap());

        let results = run_all_ai_insights(&five_trades(), &client, &InsightOptions::default(), 5)
            .await
            .unwrap();
        assert!(results.success);
        assert_eq!(results.metadata.fallback_insights, 7);
        assert_eq!(results.metadata.mode, "live");
        let day = &results.results[&InsightKind::DayOfWeek];
        assert_eq!(day.source, InsightSource::Fallback);
        assert_eq!(day.raw_text, canned_response(InsightKind::DayOfWeek));
    }

    #[tokio::test]
    async fn live_costs_accumulate() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "candidates": [{"content": {"parts": [{"text": "Insights\n- steady\nRecommendations\n- keep going"}]}}],
                "usageMetadata": {"promptTokenCount": 100_000, "candidatesTokenCount": 0}
            })))
            .mount(&server)
            .await;

        let mut cfg = default_test_config();
        cfg.google_api_key = Some("k".to_string());
        cfg.gemini_base_url = server.uri();
        let client = AiClient::Live(GeminiClient::new(&cfg.ai()).unwrap());

        let results = run_all_ai_insights(&five_trades(), &client, &InsightOptions::default(), 5)
            .await
            .unwrap();
        // 7 requests x 0.1M input tokens x $0.075
        assert!((results.metadata.total_ai_cost - 0.0525).abs() < 1e-9);
        assert_eq!(results.summaries[&InsightKind::Duration], "steady keep going");
    }
}
