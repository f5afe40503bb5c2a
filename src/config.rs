use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::insights::InsightOptions;

pub const DEFAULT_GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    // AI provider
    pub google_api_key: Option<String>,
    pub gemini_model: String,
    pub gemini_base_url: String,
    pub ai_max_output_tokens: u32,
    pub ai_temperature: f32,
    pub ai_timeout_secs: u64,

    // Pricing in USD per million tokens
    pub ai_input_cost_per_mtok: f64,
    pub ai_output_cost_per_mtok: f64,

    // Analysis
    pub min_ai_trades: usize,
    pub include_weekends: bool,
    pub top_n_symbols: usize,

    // Server
    pub bind_addr: String,
    pub log_level: String,
}

/// The slice of configuration the text-generation client needs.
#[derive(Debug, Clone)]
pub struct AiConfig {
    pub api_key: Option<String>,
    pub model: String,
    pub base_url: String,
    pub max_output_tokens: u32,
    pub temperature: f32,
    pub timeout: Duration,
    pub input_cost_per_mtok: f64,
    pub output_cost_per_mtok: f64,
}

impl Config {
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();

        let env = |key: &str, default: &str| -> String {
            std::env::var(key).unwrap_or_else(|_| default.to_string())
        };

        let api_key = env("GOOGLE_API_KEY", "");

        Config {
            google_api_key: (!api_key.trim().is_empty()).then(|| api_key.trim().to_string()),
            gemini_model: env("GEMINI_MODEL", "gemini-1.5-flash"),
            gemini_base_url: env("GEMINI_BASE_URL", DEFAULT_GEMINI_BASE_URL),
            ai_max_output_tokens: env("AI_MAX_OUTPUT_TOKENS", "1024").parse().unwrap_or(1024),
            ai_temperature: env("AI_TEMPERATURE", "0.7").parse().unwrap_or(0.7),
            ai_timeout_secs: env("AI_TIMEOUT_SECS", "30").parse().unwrap_or(30),
            ai_input_cost_per_mtok: env("AI_INPUT_COST_PER_MTOK", "0.075")
                .parse()
                .unwrap_or(0.075),
            ai_output_cost_per_mtok: env("AI_OUTPUT_COST_PER_MTOK", "0.30")
                .parse()
                .unwrap_or(0.30),
            min_ai_trades: env("MIN_AI_TRADES", "5").parse().unwrap_or(5),
            include_weekends: env("INCLUDE_WEEKENDS", "false").to_lowercase() == "true",
            top_n_symbols: env("TOP_N_SYMBOLS", "5").parse().unwrap_or(5),
            bind_addr: env("BIND_ADDR", "0.0.0.0:3000"),
            log_level: env("LOG_LEVEL", "info"),
        }
    }

    pub fn ai(&self) -> AiConfig {
        AiConfig {
            api_key: self.google_api_key.clone(),
            model: self.gemini_model.clone(),
            base_url: self.gemini_base_url.trim_end_matches('/').to_string(),
            max_output_tokens: self.ai_max_output_tokens,
            temperature: self.ai_temperature,
            timeout: Duration::from_secs(self.ai_timeout_secs),
            input_cost_per_mtok: self.ai_input_cost_per_mtok,
            output_cost_per_mtok: self.ai_output_cost_per_mtok,
        }
    }

    pub fn insight_options(&self) -> InsightOptions {
        InsightOptions {
            include_weekends: self.include_weekends,
            top_n: self.top_n_symbols,
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::test_helpers::default_test_config;

    #[test]
    fn ai_slice_trims_base_url() {
        let mut cfg = default_test_config();
        cfg.gemini_base_url = "http://localhost:8080/".to_string();
        let ai = cfg.ai();
        assert_eq!(ai.base_url, "http://localhost:8080");
        assert_eq!(ai.timeout.as_secs(), 2);
        assert!(ai.api_key.is_none());
    }

    #[test]
    fn insight_options_follow_config() {
        let mut cfg = default_test_config();
        cfg.include_weekends = true;
        cfg.top_n_symbols = 3;
        let opts = cfg.insight_options();
        assert!(opts.include_weekends);
        assert_eq!(opts.top_n, 3);
    }
}
