use serde::{Deserialize, Serialize};

use crate::error::AnalysisError;
use crate::insights::format::{duration, inr, pct};
use crate::insights::into_result;
use crate::models::{
    AnalysisResult, BucketAggregate, DurationCategory, InsightData, InsightKind,
    ProcessedTradeRecord,
};
use crate::stats::aggregate::{aggregate_fixed, best_bucket, sort_by_total_pnl_desc, worst_bucket};
use crate::stats::{calculate_basic_stats, calculate_correlation};

/// Losers held this many times longer than winners triggers a warning.
const LOSER_HOLD_FACTOR: f64 = 1.2;
const CORRELATION_THRESHOLD: f64 = 0.3;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DurationSummary {
    pub optimal_duration: BucketAggregate,
    pub worst_duration: BucketAggregate,
    pub avg_holding_seconds: f64,
    pub median_holding_seconds: f64,
    pub avg_winner_seconds: f64,
    pub avg_loser_seconds: f64,
    pub duration_pnl_correlation: f64,
}

pub type DurationAnalysis = InsightData<BucketAggregate, DurationSummary>;

/// Buckets trades by holding time. Rows are ordered by total P&L, best first.
pub fn analyze_trade_duration(trades: &[ProcessedTradeRecord]) -> AnalysisResult<DurationAnalysis> {
    into_result(InsightKind::Duration, trades.len(), build(trades))
}

fn build(trades: &[ProcessedTradeRecord]) -> Result<(DurationAnalysis, usize), AnalysisError> {
    if trades.is_empty() {
        return Err(AnalysisError::NoTrades);
    }

    let mut table = aggregate_fixed(
        trades,
        &DurationCategory::ALL,
        |t| Some(t.duration_category),
        |c| c.label().to_string(),
    );
    sort_by_total_pnl_desc(&mut table);

    let (optimal, worst) = match (best_bucket(&table), worst_bucket(&table)) {
        (Some(b), Some(w)) => (b.clone(), w.clone()),
        _ => return Err(AnalysisError::NoTrades),
    };

    let seconds: Vec<f64> = trades.iter().map(|t| t.duration_seconds as f64).collect();
    let pnls: Vec<f64> = trades.iter().map(|t| t.pnl).collect();
    let holding = calculate_basic_stats(&seconds);

    let mean_seconds = |pred: fn(&ProcessedTradeRecord) -> bool| {
        let held: Vec<f64> = trades
            .iter()
            .filter(|t| pred(t))
            .map(|t| t.duration_seconds as f64)
            .collect();
        calculate_basic_stats(&held).mean
    };

    let summary = DurationSummary {
        optimal_duration: optimal,
        worst_duration: worst,
        avg_holding_seconds: holding.mean,
        median_holding_seconds: holding.median,
        avg_winner_seconds: mean_seconds(|t| t.is_profit),
        avg_loser_seconds: mean_seconds(|t| t.is_loss),
        duration_pnl_correlation: calculate_correlation(&seconds, &pnls),
    };

    let insights = generate_insights(&table, &summary);
    let recommendations = generate_recommendations(&table, &summary);

    Ok((
        InsightData {
            table,
            summary,
            insights,
            recommendations,
        },
        trades.len(),
    ))
}

fn generate_insights(table: &[BucketAggregate], summary: &DurationSummary) -> Vec<String> {
    let mut out = Vec::new();
    let best = &summary.optimal_duration;

    if best.total_pnl > 0.0 {
        out.push(format!(
            "Trades held {} perform best: {} across {} trades ({} win rate).",
            best.bucket,
            inr(best.total_pnl),
            best.trade_count,
            pct(best.win_rate)
        ));
    }
    if summary.worst_duration.total_pnl < 0.0 {
        out.push(format!(
            "Trades held {} lose the most: {} across {} trades.",
            summary.worst_duration.bucket,
            inr(summary.worst_duration.total_pnl),
            summary.worst_duration.trade_count
        ));
    }

    out.push(format!(
        "Average holding time is {} (median {}).",
        duration(summary.avg_holding_seconds),
        duration(summary.median_holding_seconds)
    ));

    if summary.avg_winner_seconds > 0.0
        && summary.avg_loser_seconds > summary.avg_winner_seconds * LOSER_HOLD_FACTOR
    {
        out.push(format!(
            "Losing trades are held longer than winners ({} vs {}).",
            duration(summary.avg_loser_seconds),
            duration(summary.avg_winner_seconds)
        ));
    }

    if summary.duration_pnl_correlation > CORRELATION_THRESHOLD {
        out.push("Longer holds tend to produce better results.".to_string());
    } else if summary.duration_pnl_correlation < -CORRELATION_THRESHOLD {
        out.push("Longer holds tend to produce worse results.".to_string());
    }

    if let Some(scalps) = table.iter().find(|r| r.bucket == DurationCategory::UnderOneMinute.label()) {
        if scalps.total_pnl < 0.0 {
            out.push(format!(
                "Sub-minute trades are net negative ({}), a sign of impulsive entries.",
                inr(scalps.total_pnl)
            ));
        }
    }

    out
}

fn generate_recommendations(table: &[BucketAggregate], summary: &DurationSummary) -> Vec<String> {
    let mut out = Vec::new();
    if summary.optimal_duration.total_pnl > 0.0 {
        out.push(format!(
            "Plan exits around the {} window where your edge is strongest.",
            summary.optimal_duration.bucket
        ));
    }
    if summary.avg_winner_seconds > 0.0
        && summary.avg_loser_seconds > summary.avg_winner_seconds * LOSER_HOLD_FACTOR
    {
        out.push("Use a time stop: cut trades that have not worked well before your average winner's holding time.".to_string());
    }
    let losing_buckets = table.iter().filter(|r| r.total_pnl < 0.0).count();
    if losing_buckets > table.len() / 2 {
        out.push("Most holding windows lose money; revisit entry criteria before adjusting exits.".to_string());
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::TradeBuilder;

    #[test]
    fn only_populated_buckets_appear() {
        let trades = vec![
            TradeBuilder::new("2025-01-13", 100.0).held(30).build(),
            TradeBuilder::new("2025-01-13", -50.0).held(240).build(),
            TradeBuilder::new("2025-01-14", 300.0).held(4000).build(),
            TradeBuilder::new("2025-01-14", 20.0).held(200).build(),
        ];
        let data = analyze_trade_duration(&trades).data.unwrap();
        assert_eq!(data.table.len(), 3);
        let labels: Vec<&str> = data.table.iter().map(|r| r.bucket.as_str()).collect();
        assert_eq!(labels, vec!["1-2h", "<1m", "1-5m"]);
        assert_eq!(data.summary.optimal_duration.bucket, "1-2h");
        assert_eq!(data.summary.worst_duration.bucket, "1-5m");
    }

    #[test]
    fn long_held_losers_are_flagged() {
        let trades = vec![
            TradeBuilder::new("2025-01-13", 100.0).held(120).build(),
            TradeBuilder::new("2025-01-13", 80.0).held(120).build(),
            TradeBuilder::new("2025-01-14", -90.0).held(1500).build(),
        ];
        let data = analyze_trade_duration(&trades).data.unwrap();
        assert_eq!(data.summary.avg_winner_seconds, 120.0);
        assert_eq!(data.summary.avg_loser_seconds, 1500.0);
        assert!(data
            .insights
            .iter()
            .any(|i| i.starts_with("Losing trades are held longer")));
        assert!(data.recommendations.iter().any(|r| r.contains("time stop")));
    }

    #[test]
    fn bucket_totals_sum_to_overall_pnl() {
        let trades = vec![
            TradeBuilder::new("2025-01-13", 12.5).held(10).build(),
            TradeBuilder::new("2025-01-13", -7.25).held(700).build(),
            TradeBuilder::new("2025-01-14", 40.0).held(9000).build(),
        ];
        let data = analyze_trade_duration(&trades).data.unwrap();
        let sum: f64 = data.table.iter().map(|r| r.total_pnl).sum();
        assert!((sum - 45.25).abs() < 1e-9);
    }

    #[test]
    fn empty_input_fails() {
        let result = analyze_trade_duration(&[]);
        assert!(!result.success);
        assert!(result.data.is_none());
    }
}
