pub mod client;
pub mod mock;
pub mod orchestrator;
pub mod parser;
pub mod prompts;

pub use client::{AiClient, GeminiClient, Generation, GenerationRequest, MockClient, TextGenerator};
pub use orchestrator::{run_all_ai_insights, AiAnalysisResults, InsightSource};
pub use parser::{parse_response, ParsedInsights};
