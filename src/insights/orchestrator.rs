use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::time::Instant;
use tracing::{info, warn};

use crate::error::InputError;
use crate::insights::summaries::{concise_summaries, consolidate, ConsolidatedInsights};
use crate::insights::{run_insight, InsightOptions, InsightReport};
use crate::models::{InsightKind, ProcessedTradeRecord};
use crate::processing::{process_raw_trading_data, ProcessedBatch};
use crate::stats::{
    calculate_expectancy, calculate_max_drawdown, calculate_profit_factor,
    calculate_sharpe_ratio, calculate_win_rate,
};

/// Whole-journal numbers that sit above the individual insights.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PerformanceOverview {
    pub total_trades: usize,
    pub total_pnl: f64,
    pub gross_profit: f64,
    pub gross_loss: f64,
    pub win_rate: f64,
    pub profit_factor: f64,
    pub max_drawdown: f64,
    /// Per-trade P&L Sharpe, not annualized.
    pub sharpe_ratio: f64,
    pub expectancy: f64,
    pub avg_trade: f64,
}

impl PerformanceOverview {
    pub fn from_trades(trades: &[ProcessedTradeRecord]) -> Self {
        let pnls: Vec<f64> = trades.iter().map(|t| t.pnl).collect();
        let total_pnl: f64 = pnls.iter().sum();
        Self {
            total_trades: trades.len(),
            total_pnl,
            gross_profit: pnls.iter().filter(|p| **p > 0.0).sum(),
            gross_loss: pnls.iter().filter(|p| **p < 0.0).sum(),
            win_rate: calculate_win_rate(trades),
            profit_factor: calculate_profit_factor(trades),
            max_drawdown: calculate_max_drawdown(&pnls),
            sharpe_ratio: calculate_sharpe_ratio(&pnls, 0.0),
            expectancy: calculate_expectancy(trades),
            avg_trade: if trades.is_empty() {
                0.0
            } else {
                total_pnl / trades.len() as f64
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InsightFailure {
    pub insight: InsightKind,
    pub error: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RunMetadata {
    pub analysis_date: DateTime<Utc>,
    pub total_trades: usize,
    pub valid_trades: usize,
    pub skipped_records: usize,
    pub completed_insights: usize,
    pub failed_insights: usize,
    pub processing_time_ms: u64,
    pub overview: PerformanceOverview,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CompleteAnalysisResults {
    /// True only when every calculator succeeded.
    pub success: bool,
    pub insights: BTreeMap<InsightKind, InsightReport>,
    pub errors: Vec<InsightFailure>,
    pub concise_summaries: BTreeMap<InsightKind, String>,
    pub consolidated_insights: ConsolidatedInsights,
    pub metadata: RunMetadata,
}

/// Validates an untyped request body, normalizes it and runs every
/// calculator. Only input-level problems are returned as `Err`.
pub fn run_all_trading_insights(
    raw: &Value,
    options: &InsightOptions,
) -> Result<CompleteAnalysisResults, InputError> {
    let items = raw.as_array().ok_or(InputError::NotAnArray)?;
    if items.is_empty() {
        return Err(InputError::Empty);
    }

    let batch = process_raw_trading_data(raw)?;
    if batch.trades.is_empty() {
        return Err(InputError::NoValidTrades {
            total: batch.total_records,
        });
    }
    Ok(run_trading_insights(&batch, options))
}

/// Runs the seven calculators over an already processed batch. A failing
/// calculator is recorded in `errors` and the rest still run.
pub fn run_trading_insights(batch: &ProcessedBatch, options: &InsightOptions) -> CompleteAnalysisResults {
    let started = Instant::now();
    info!(
        "Running {} insight calculators on {} trades",
        InsightKind::ALL.len(),
        batch.valid_count()
    );

    let mut insights = BTreeMap::new();
    let mut errors = Vec::new();
    for kind in InsightKind::ALL {
        match run_insight(kind, &batch.trades, options).into_result() {
            Ok(report) => {
                insights.insert(kind, report);
            }
            Err(error) => {
                warn!("{} skipped: {}", kind.title(), error);
                errors.push(InsightFailure {
                    insight: kind,
                    error,
                });
            }
        }
    }

    let overview = PerformanceOverview::from_trades(&batch.trades);
    let concise_summaries = concise_summaries(&insights);
    let consolidated_insights = consolidate(&insights, &overview);
    let elapsed = started.elapsed().as_millis() as u64;

    info!(
        "Trading insights complete: {} succeeded, {} failed in {}ms",
        insights.len(),
        errors.len(),
        elapsed
    );

    CompleteAnalysisResults {
        success: errors.is_empty(),
        metadata: RunMetadata {
            analysis_date: Utc::now(),
            total_trades: batch.total_records,
            valid_trades: batch.valid_count(),
            skipped_records: batch.skipped_count(),
            completed_insights: insights.len(),
            failed_insights: errors.len(),
            processing_time_ms: elapsed,
            overview,
        },
        insights,
        errors,
        concise_summaries,
        consolidated_insights,
    }
}
