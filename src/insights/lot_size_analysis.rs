use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::AnalysisError;
use crate::insights::format::{inr, pct};
use crate::insights::into_result;
use crate::models::{AnalysisResult, BucketAggregate, InsightData, InsightKind, ProcessedTradeRecord};
use crate::stats::aggregate::{best_by, compute_bucket, group_by, worst_by};
use crate::stats::calculations::DEFAULT_OUTLIER_MULTIPLIER;
use crate::stats::{calculate_basic_stats, calculate_correlation, find_outliers};

const SMALL_LIMIT: f64 = 50_000.0;
const MEDIUM_LIMIT: f64 = 100_000.0;
const LARGE_LIMIT: f64 = 200_000.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum LotSizeBucket {
    #[serde(rename = "Small (<₹50K)")]
    Small,
    #[serde(rename = "Medium (₹50K-₹1L)")]
    Medium,
    #[serde(rename = "Large (₹1L-₹2L)")]
    Large,
    #[serde(rename = "Very Large (>₹2L)")]
    VeryLarge,
}

impl LotSizeBucket {
    pub const ALL: [LotSizeBucket; 4] = [
        LotSizeBucket::Small,
        LotSizeBucket::Medium,
        LotSizeBucket::Large,
        LotSizeBucket::VeryLarge,
    ];

    pub fn from_value(position_value: f64) -> Self {
        if position_value < SMALL_LIMIT {
            LotSizeBucket::Small
        } else if position_value < MEDIUM_LIMIT {
            LotSizeBucket::Medium
        } else if position_value <= LARGE_LIMIT {
            LotSizeBucket::Large
        } else {
            LotSizeBucket::VeryLarge
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            LotSizeBucket::Small => "Small (<₹50K)",
            LotSizeBucket::Medium => "Medium (₹50K-₹1L)",
            LotSizeBucket::Large => "Large (₹1L-₹2L)",
            LotSizeBucket::VeryLarge => "Very Large (>₹2L)",
        }
    }
}

impl fmt::Display for LotSizeBucket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SizeBucketRow {
    #[serde(flatten)]
    pub stats: BucketAggregate,
    pub avg_position_value: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LotSizeSummary {
    pub optimal_size: SizeBucketRow,
    pub worst_size: SizeBucketRow,
    pub avg_position_value: f64,
    pub median_position_value: f64,
    pub max_position_value: f64,
    pub size_pnl_correlation: f64,
    /// Trades whose position value is unusually large or small by IQR.
    pub size_outliers: usize,
    pub trades_without_size: usize,
}

pub type LotSizeAnalysis = InsightData<SizeBucketRow, LotSizeSummary>;

pub fn analyze_lot_size(trades: &[ProcessedTradeRecord]) -> AnalysisResult<LotSizeAnalysis> {
    into_result(InsightKind::LotSize, trades.len(), build(trades))
}

fn build(trades: &[ProcessedTradeRecord]) -> Result<(LotSizeAnalysis, usize), AnalysisError> {
    if trades.is_empty() {
        return Err(AnalysisError::NoTrades);
    }

    let sized: Vec<&ProcessedTradeRecord> = trades
        .iter()
        .filter(|t| t.position_value() > 0.0)
        .collect();
    if sized.is_empty() {
        return Err(AnalysisError::NoValidTrades(
            "no trades carry a quantity and entry price".to_string(),
        ));
    }

    let mut groups = group_by(&sized, |t| Some(LotSizeBucket::from_value(t.position_value())));
    groups.sort_by_key(|(bucket, _)| *bucket);

    let mut table: Vec<SizeBucketRow> = groups
        .into_iter()
        .map(|(bucket, members)| {
            let values: Vec<f64> = members.iter().map(|t| t.position_value()).collect();
            SizeBucketRow {
                stats: compute_bucket(bucket.label(), &members),
                avg_position_value: calculate_basic_stats(&values).mean,
            }
        })
        .collect();
    table.sort_by(|a, b| b.stats.total_pnl.total_cmp(&a.stats.total_pnl));

    let (optimal, worst) = match (
        best_by(&table, |r| r.stats.total_pnl),
        worst_by(&table, |r| r.stats.total_pnl),
    ) {
        (Some(b), Some(w)) => (b.clone(), w.clone()),
        _ => return Err(AnalysisError::NoTrades),
    };

    let values: Vec<f64> = sized.iter().map(|t| t.position_value()).collect();
    let pnls: Vec<f64> = sized.iter().map(|t| t.pnl).collect();
    let value_stats = calculate_basic_stats(&values);

    let summary = LotSizeSummary {
        optimal_size: optimal,
        worst_size: worst,
        avg_position_value: value_stats.mean,
        median_position_value: value_stats.median,
        max_position_value: value_stats.max,
        size_pnl_correlation: calculate_correlation(&values, &pnls),
        size_outliers: find_outliers(&values, DEFAULT_OUTLIER_MULTIPLIER).indices.len(),
        trades_without_size: trades.len() - sized.len(),
    };

    let insights = generate_insights(&table, &summary);
    let recommendations = generate_recommendations(&summary);

    Ok((
        InsightData {
            table,
            summary,
            insights,
            recommendations,
        },
        sized.len(),
    ))
}

fn generate_insights(table: &[SizeBucketRow], summary: &LotSizeSummary) -> Vec<String> {
    let mut out = Vec::new();
    let best = &summary.optimal_size.stats;
    let worst = &summary.worst_size.stats;

    if best.total_pnl > 0.0 {
        out.push(format!(
            "{} positions are your most profitable: {} across {} trades ({} win rate).",
            best.bucket,
            inr(best.total_pnl),
            best.trade_count,
            pct(best.win_rate)
        ));
    }
    if worst.total_pnl < 0.0 && worst.bucket != best.bucket {
        out.push(format!(
            "{} positions lose the most: {} across {} trades.",
            worst.bucket,
            inr(worst.total_pnl),
            worst.trade_count
        ));
    }
    out.push(format!(
        "Average position value is {} (median {}, largest {}).",
        inr(summary.avg_position_value),
        inr(summary.median_position_value),
        inr(summary.max_position_value)
    ));

    let largest_loses = table
        .iter()
        .filter(|r| r.stats.total_pnl < 0.0)
        .any(|r| r.stats.bucket == LotSizeBucket::VeryLarge.label());
    if largest_loses {
        out.push("Your largest positions are net losers.".to_string());
    }
    if summary.size_outliers > 0 {
        out.push(format!(
            "{} trade(s) were sized far outside your normal range.",
            summary.size_outliers
        ));
    }
    if summary.trades_without_size > 0 {
        out.push(format!(
            "{} trade(s) had no quantity or entry price and were left out.",
            summary.trades_without_size
        ));
    }
    out
}

fn generate_recommendations(summary: &LotSizeSummary) -> Vec<String> {
    let mut out = Vec::new();
    let best = &summary.optimal_size.stats;
    let worst = &summary.worst_size.stats;
    if best.total_pnl > 0.0 {
        out.push(format!(
            "Keep most positions in the {} range.",
            best.bucket
        ));
    }
    if worst.total_pnl < 0.0 {
        out.push(format!(
            "Avoid {} positions until that size shows a positive edge.",
            worst.bucket
        ));
    }
    if summary.size_outliers > 0 {
        out.push("Use a fixed sizing rule so single trades cannot dominate the day.".to_string());
    }
    out
}
