use anyhow::{bail, Context, Result};
use serde_json::Value;
use std::path::Path;
use tracing_subscriber::{fmt, EnvFilter};

use trade_insights::ai::{run_all_ai_insights, AiClient};
use trade_insights::config::Config;
use trade_insights::insights::run_all_trading_insights;
use trade_insights::processing::csv_import::read_csv_path;

/// Loads a journal export as an array of raw records. CSV rows become
/// objects keyed by the header row; anything else is parsed as JSON.
fn load_journal(path: &Path) -> Result<Value> {
    let is_csv = path
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("csv"));

    if is_csv {
        let records = read_csv_path(path)?;
        return Ok(Value::Array(
            records.into_iter().map(|r| Value::Object(r.0)).collect(),
        ));
    }

    let text = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    let value: Value = serde_json::from_str(&text)
        .with_context(|| format!("Failed to parse {} as JSON", path.display()))?;

    // Accept either a bare array or a request body with a `data` field.
    match value {
        Value::Object(mut map) if map.contains_key("data") => {
            Ok(map.remove("data").unwrap_or(Value::Null))
        }
        other => Ok(other),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cfg = Config::from_env();

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("warn"));

    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_timer(fmt::time::UtcTime::rfc_3339())
        .init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let with_ai = args.iter().any(|a| a == "--ai");
    let Some(path) = args.iter().find(|a| !a.starts_with("--")) else {
        bail!("usage: analyze <journal.csv|journal.json> [--ai]");
    };

    let data = load_journal(Path::new(path))?;
    let options = cfg.insight_options();

    let results = run_all_trading_insights(&data, &options)?;
    results.print_summary();

    if with_ai {
        let client = AiClient::from_config(&cfg.ai());
        let ai = run_all_ai_insights(&data, &client, &options, cfg.min_ai_trades).await?;

        println!();
        println!("  AI COMMENTARY ({} mode, {})", ai.metadata.mode, ai.metadata.model);
        println!("  ───────────────────────────────────");
        for (kind, insight) in &ai.results {
            println!("  {} [{:?}]", kind.title(), insight.source);
            for line in &insight.parsed.insights {
                println!("    * {}", line);
            }
            for line in &insight.parsed.recommendations {
                println!("    > {}", line);
            }
            for line in &insight.parsed.risk_warnings {
                println!("    ! {}", line);
            }
        }
        for failure in &ai.errors {
            println!("  {}: {}", failure.domain.title(), failure.error);
        }
        println!("  Cost: ${:.6}", ai.metadata.total_ai_cost);
    }

    Ok(())
}
