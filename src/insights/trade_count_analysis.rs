use serde::{Deserialize, Serialize};

use crate::error::AnalysisError;
use crate::insights::format::inr;
use crate::insights::into_result;
use crate::models::{AnalysisResult, InsightData, InsightKind, ProcessedTradeRecord};
use crate::stats::aggregate::{best_by, group_by, total_pnl};
use crate::stats::{calculate_correlation, calculate_win_rate};

/// Days with more trades than this are counted as overtrading.
const OVERTRADING_THRESHOLD: usize = 5;
const CORRELATION_THRESHOLD: f64 = 0.3;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TradeCountRow {
    pub trades_per_day: usize,
    pub days: usize,
    pub total_trades: usize,
    pub total_pnl: f64,
    pub avg_daily_pnl: f64,
    pub profitable_days: usize,
    /// Share of days in this row that closed green.
    pub day_win_rate: f64,
    /// Share of individual trades that closed green.
    pub win_rate: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TradeCountSummary {
    pub optimal_trade_count: usize,
    pub optimal_avg_daily_pnl: f64,
    pub avg_trades_per_day: f64,
    pub max_trades_in_day: usize,
    pub trading_days: usize,
    pub count_pnl_correlation: f64,
    pub overtrading_days: usize,
    pub overtrading_pnl: f64,
}

pub type TradeCountAnalysis = InsightData<TradeCountRow, TradeCountSummary>;

struct DayTally<'a> {
    trades: Vec<&'a ProcessedTradeRecord>,
    pnl: f64,
}

/// Groups calendar days by how many trades were taken on them.
pub fn analyze_trade_count(trades: &[ProcessedTradeRecord]) -> AnalysisResult<TradeCountAnalysis> {
    into_result(InsightKind::TradeCount, trades.len(), build(trades))
}

fn build(trades: &[ProcessedTradeRecord]) -> Result<(TradeCountAnalysis, usize), AnalysisError> {
    if trades.is_empty() {
        return Err(AnalysisError::NoTrades);
    }

    let days: Vec<DayTally> = group_by(trades, |t| Some(t.date))
        .into_iter()
        .map(|(_, trades)| DayTally {
            pnl: total_pnl(&trades),
            trades,
        })
        .collect();

    let mut by_count = group_by(&days, |d| Some(d.trades.len()));
    by_count.sort_by_key(|(count, _)| *count);

    let table: Vec<TradeCountRow> = by_count
        .into_iter()
        .map(|(count, tallies)| {
            let all: Vec<&ProcessedTradeRecord> = tallies
                .iter()
                .flat_map(|d| d.trades.iter().copied())
                .collect();
            let total: f64 = tallies.iter().map(|d| d.pnl).sum();
            let profitable_days = tallies.iter().filter(|d| d.pnl > 0.0).count();
            TradeCountRow {
                trades_per_day: count,
                days: tallies.len(),
                total_trades: all.len(),
                total_pnl: total,
                avg_daily_pnl: total / tallies.len() as f64,
                profitable_days,
                day_win_rate: profitable_days as f64 / tallies.len() as f64 * 100.0,
                win_rate: calculate_win_rate(&all),
            }
        })
        .collect();

    let optimal = best_by(&table, |r| r.avg_daily_pnl).ok_or(AnalysisError::NoTrades)?;
    let counts: Vec<f64> = days.iter().map(|d| d.trades.len() as f64).collect();
    let day_pnls: Vec<f64> = days.iter().map(|d| d.pnl).collect();
    let overtraded: Vec<&DayTally> = days
        .iter()
        .filter(|d| d.trades.len() > OVERTRADING_THRESHOLD)
        .collect();

    let summary = TradeCountSummary {
        optimal_trade_count: optimal.trades_per_day,
        optimal_avg_daily_pnl: optimal.avg_daily_pnl,
        avg_trades_per_day: trades.len() as f64 / days.len() as f64,
        max_trades_in_day: days.iter().map(|d| d.trades.len()).max().unwrap_or(0),
        trading_days: days.len(),
        count_pnl_correlation: calculate_correlation(&counts, &day_pnls),
        overtrading_days: overtraded.len(),
        overtrading_pnl: overtraded.iter().map(|d| d.pnl).sum(),
    };

    let insights = generate_insights(&summary);
    let recommendations = generate_recommendations(&summary);

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

fn generate_insights(summary: &TradeCountSummary) -> Vec<String> {
    let mut out = vec![format!(
        "You average {:.1} trades per day over {} trading days (max {} in a day).",
        summary.avg_trades_per_day, summary.trading_days, summary.max_trades_in_day
    )];

    if summary.optimal_avg_daily_pnl > 0.0 {
        out.push(format!(
            "Days with {} trade(s) are your best, averaging {} per day.",
            summary.optimal_trade_count,
            inr(summary.optimal_avg_daily_pnl)
        ));
    }
    if summary.overtrading_days > 0 {
        out.push(format!(
            "{} day(s) had more than {} trades, netting {}.",
            summary.overtrading_days,
            OVERTRADING_THRESHOLD,
            inr(summary.overtrading_pnl)
        ));
    }
    if summary.count_pnl_correlation < -CORRELATION_THRESHOLD {
        out.push(format!(
            "More trades per day tends to mean lower daily P&L (correlation {:.2}).",
            summary.count_pnl_correlation
        ));
    } else if summary.count_pnl_correlation > CORRELATION_THRESHOLD {
        out.push("Busier days have tended to be more profitable.".to_string());
    }
    out
}

fn generate_recommendations(summary: &TradeCountSummary) -> Vec<String> {
    let mut out = Vec::new();
    if summary.optimal_avg_daily_pnl > 0.0 {
        out.push(format!(
            "Set a daily cap near {} trade(s), where your results are strongest.",
            summary.optimal_trade_count
        ));
    }
    if summary.overtrading_days > 0 && summary.overtrading_pnl < 0.0 {
        out.push("Stop trading for the day after your planned number of trades.".to_string());
    }
    if summary.count_pnl_correlation < -CORRELATION_THRESHOLD {
        out.push("Focus on fewer, higher-quality setups.".to_string());
    }
    out
}
