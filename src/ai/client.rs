use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::ai::mock::canned_response;
use crate::config::AiConfig;
use crate::error::AiError;
use crate::models::InsightKind;

#[derive(Debug, Clone)]
pub struct GenerationRequest {
    pub domain: InsightKind,
    pub system: String,
    pub prompt: String,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenUsage {
    pub input_tokens: u64,
    pub output_tokens: u64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Generation {
    pub text: String,
    pub usage: TokenUsage,
    /// USD, from the configured per-million-token prices.
    pub cost: f64,
}

#[async_trait]
pub trait TextGenerator: Send + Sync {
    async fn generate(&self, request: &GenerationRequest) -> Result<Generation, AiError>;
    fn model_name(&self) -> &str;
}

// Wire types for the generateContent endpoint.

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest<'a> {
    system_instruction: Content<'a>,
    contents: Vec<Content<'a>>,
    generation_config: GenerationConfig,
}

#[derive(Debug, Serialize)]
struct Content<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    role: Option<&'a str>,
    parts: Vec<Part<'a>>,
}

#[derive(Debug, Serialize)]
struct Part<'a> {
    text: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    max_output_tokens: u32,
    temperature: f32,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    usage_metadata: Option<UsageMetadata>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Debug, Deserialize)]
struct ResponsePart {
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UsageMetadata {
    #[serde(default)]
    prompt_token_count: u64,
    #[serde(default)]
    candidates_token_count: u64,
}

pub struct GeminiClient {
    client: Client,
    api_key: String,
    model: String,
    base_url: String,
    max_output_tokens: u32,
    temperature: f32,
    input_cost_per_mtok: f64,
    output_cost_per_mtok: f64,
}

impl GeminiClient {
    pub fn new(cfg: &AiConfig) -> Result<Self, AiError> {
        let api_key = cfg.api_key.clone().ok_or(AiError::MissingApiKey)?;
        let client = Client::builder().timeout(cfg.timeout).build()?;
        Ok(Self {
            client,
            api_key,
            model: cfg.model.clone(),
            base_url: cfg.base_url.clone(),
            max_output_tokens: cfg.max_output_tokens,
            temperature: cfg.temperature,
            input_cost_per_mtok: cfg.input_cost_per_mtok,
            output_cost_per_mtok: cfg.output_cost_per_mtok,
        })
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/v1beta/models/{}:generateContent",
            self.base_url, self.model
        )
    }

    fn cost(&self, usage: TokenUsage) -> f64 {
        usage.input_tokens as f64 / 1_000_000.0 * self.input_cost_per_mtok
            + usage.output_tokens as f64 / 1_000_000.0 * self.output_cost_per_mtok
    }
}

#[async_trait]
impl TextGenerator for GeminiClient {
    async fn generate(&self, request: &GenerationRequest) -> Result<Generation, AiError> {
        let body = GenerateContentRequest {
            system_instruction: Content {
                role: None,
                parts: vec![Part {
                    text: &request.system,
                }],
            },
            contents: vec![Content {
                role: Some("user"),
                parts: vec![Part {
                    text: &request.prompt,
                }],
            }],
            generation_config: GenerationConfig {
                max_output_tokens: self.max_output_tokens,
                temperature: self.temperature,
            },
        };

        debug!(
            "Requesting {} insight from {} ({} prompt chars)",
            request.domain,
            self.model,
            request.prompt.len()
        );

        let resp = self
            .client
            .post(self.endpoint())
            .query(&[("key", self.api_key.as_str())])
            .json(&body)
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            if status == StatusCode::TOO_MANY_REQUESTS || body.contains("RESOURCE_EXHAUSTED") {
                return Err(AiError::QuotaExceeded(body));
            }
            return Err(AiError::Api {
                status: status.as_u16(),
                body,
            });
        }

        let data: GenerateContentResponse = resp.json().await?;
        let text: String = data
            .candidates
            .into_iter()
            .next()
            .and_then(|c| c.content)
            .map(|c| c.parts.into_iter().filter_map(|p| p.text).collect())
            .unwrap_or_default();
        if text.trim().is_empty() {
            return Err(AiError::EmptyResponse);
        }

        let usage = data
            .usage_metadata
            .map(|u| TokenUsage {
                input_tokens: u.prompt_token_count,
                output_tokens: u.candidates_token_count,
            })
            .unwrap_or_default();

        Ok(Generation {
            text,
            usage,
            cost: self.cost(usage),
        })
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}

/// Returns the canned text for each domain. Used when no API key is set.
#[derive(Debug, Clone, Copy, Default)]
pub struct MockClient;

#[async_trait]
impl TextGenerator for MockClient {
    async fn generate(&self, request: &GenerationRequest) -> Result<Generation, AiError> {
        Ok(Generation {
            text: canned_response(request.domain),
            usage: TokenUsage::default(),
            cost: 0.0,
        })
    }

    fn model_name(&self) -> &str {
        "mock"
    }
}

/// The text generator the service runs with, chosen once at startup.
pub enum AiClient {
    Live(GeminiClient),
    Mock(MockClient),
}

impl AiClient {
    pub fn from_config(cfg: &AiConfig) -> Self {
        match GeminiClient::new(cfg) {
            Ok(client) => {
                info!("AI insights enabled with model {}", cfg.model);
                AiClient::Live(client)
            }
            Err(e) => {
                warn!("AI insights running on canned responses: {}", e);
                AiClient::Mock(MockClient)
            }
        }
    }

    pub fn mode(&self) -> &'static str {
        match self {
            AiClient::Live(_) => "live",
            AiClient::Mock(_) => "mock",
        }
    }

    pub fn is_live(&self) -> bool {
        matches!(self, AiClient::Live(_))
    }
}

#[async_trait]
impl TextGenerator for AiClient {
    async fn generate(&self, request: &GenerationRequest) -> Result<Generation, AiError> {
        match self {
            AiClient::Live(c) => c.generate(request).await,
            AiClient::Mock(c) => c.generate(request).await,
        }
    }

    fn model_name(&self) -> &str {
        match self {
            AiClient::Live(c) => c.model_name(),
            AiClient::Mock(c) => c.model_name(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::default_test_config;
    use serde_json::json;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn live_client(base_url: &str) -> GeminiClient {
        let mut cfg = default_test_config();
        cfg.google_api_key = Some("test-key".to_string());
        cfg.gemini_base_url = base_url.to_string();
        GeminiClient::new(&cfg.ai()).unwrap()
    }

    fn request() -> GenerationRequest {
        GenerationRequest {
            domain: InsightKind::DayOfWeek,
            system: "system".to_string(),
            prompt: "prompt".to_string(),
        }
    }

    #[test]
    fn missing_key_selects_mock() {
        let client = AiClient::from_config(&default_test_config().ai());
        assert_eq!(client.mode(), "mock");
        assert_eq!(client.model_name(), "mock");
    }

    #[tokio::test]
    async fn reads_text_and_usage() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1beta/models/gemini-1.5-flash:generateContent"))
            .and(query_param("key", "test-key"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "candidates": [{"content": {"parts": [{"text": "## Insights\n"}, {"text": "- Mondays win"}]}}],
                "usageMetadata": {"promptTokenCount": 1_000_000, "candidatesTokenCount": 1_000_000}
            })))
            .mount(&server)
            .await;

        let generation = live_client(&server.uri()).generate(&request()).await.unwrap();
        assert_eq!(generation.text, "## Insights\n- Mondays win");
        assert_eq!(generation.usage.input_tokens, 1_000_000);
        assert!((generation.cost - 0.375).abs() < 1e-9);
    }

    #[tokio::test]
    async fn rate_limit_maps_to_quota_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(429).set_body_string("quota"))
            .mount(&server)
            .await;

        let err = live_client(&server.uri()).generate(&request()).await.unwrap_err();
        assert!(matches!(err, AiError::QuotaExceeded(_)));
        assert!(err.is_expected());
    }

    #[tokio::test]
    async fn other_failures_keep_status() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
            .mount(&server)
            .await;

        let err = live_client(&server.uri()).generate(&request()).await.unwrap_err();
        match err {
            AiError::Api { status, body } => {
                assert_eq!(status, 500);
                assert_eq!(body, "boom");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn empty_candidates_are_an_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"candidates": []})))
            .mount(&server)
            .await;

        let err = live_client(&server.uri()).generate(&request()).await.unwrap_err();
        assert!(matches!(err, AiError::EmptyResponse));
    }
}
