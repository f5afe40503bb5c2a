use chrono::{Datelike, Weekday};
use serde::{Deserialize, Serialize};

use crate::error::AnalysisError;
use crate::insights::format::{inr, pct};
use crate::insights::into_result;
use crate::models::{AnalysisResult, BucketAggregate, InsightData, InsightKind, ProcessedTradeRecord};
use crate::stats::aggregate::{aggregate_fixed, best_bucket, worst_bucket};

const WEEKDAYS: [Weekday; 5] = [
    Weekday::Mon,
    Weekday::Tue,
    Weekday::Wed,
    Weekday::Thu,
    Weekday::Fri,
];
const WEEKEND: [Weekday; 2] = [Weekday::Sat, Weekday::Sun];

const HIGH_WIN_RATE: f64 = 60.0;
const LOW_WIN_RATE: f64 = 40.0;
const MIN_DAY_SAMPLE: usize = 3;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DayAnalysisOptions {
    /// Saturday and Sunday trades are ignored unless set.
    pub include_weekends: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DaySummary {
    pub best_day: BucketAggregate,
    pub worst_day: BucketAggregate,
    pub profitable_days: usize,
    pub loss_days: usize,
    pub total_pnl: f64,
    pub total_trades: usize,
    pub excluded_trades: usize,
}

pub type DayOfWeekAnalysis = InsightData<BucketAggregate, DaySummary>;

pub fn day_name(day: Weekday) -> &'static str {
    match day {
        Weekday::Mon => "Monday",
        Weekday::Tue => "Tuesday",
        Weekday::Wed => "Wednesday",
        Weekday::Thu => "Thursday",
        Weekday::Fri => "Friday",
        Weekday::Sat => "Saturday",
        Weekday::Sun => "Sunday",
    }
}

/// P&L per day of the week, Monday first.
pub fn analyze_day_of_week_pnl(
    trades: &[ProcessedTradeRecord],
    options: &DayAnalysisOptions,
) -> AnalysisResult<DayOfWeekAnalysis> {
    into_result(InsightKind::DayOfWeek, trades.len(), build(trades, options))
}

fn build(
    trades: &[ProcessedTradeRecord],
    options: &DayAnalysisOptions,
) -> Result<(DayOfWeekAnalysis, usize), AnalysisError> {
    if trades.is_empty() {
        return Err(AnalysisError::NoTrades);
    }

    let mut days = WEEKDAYS.to_vec();
    if options.include_weekends {
        days.extend(WEEKEND);
    }

    let considered: Vec<&ProcessedTradeRecord> = trades
        .iter()
        .filter(|t| days.contains(&t.date.weekday()))
        .collect();
    if considered.is_empty() {
        return Err(AnalysisError::NoValidTrades(
            "no trades fall on the analyzed days".to_string(),
        ));
    }

    let table = aggregate_fixed(
        &considered,
        &days,
        |t| Some(t.date.weekday()),
        |d| day_name(*d).to_string(),
    );

    let (best, worst) = match (best_bucket(&table), worst_bucket(&table)) {
        (Some(b), Some(w)) => (b.clone(), w.clone()),
        _ => return Err(AnalysisError::NoTrades),
    };

    let summary = DaySummary {
        profitable_days: table.iter().filter(|r| r.total_pnl > 0.0).count(),
        loss_days: table.iter().filter(|r| r.total_pnl < 0.0).count(),
        total_pnl: table.iter().map(|r| r.total_pnl).sum(),
        total_trades: considered.len(),
        excluded_trades: trades.len() - considered.len(),
        best_day: best,
        worst_day: worst,
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
        considered.len(),
    ))
}

fn generate_insights(table: &[BucketAggregate], summary: &DaySummary) -> Vec<String> {
    let mut out = Vec::new();
    let best = &summary.best_day;
    let worst = &summary.worst_day;

    if best.total_pnl > 0.0 {
        out.push(format!(
            "{} is your most profitable day with {} total P&L across {} trades ({} win rate).",
            best.bucket,
            inr(best.total_pnl),
            best.trade_count,
            pct(best.win_rate)
        ));
    }
    if worst.total_pnl < 0.0 && worst.bucket != best.bucket {
        out.push(format!(
            "{} is your weakest day, losing {} across {} trades.",
            worst.bucket,
            inr(worst.total_pnl.abs()),
            worst.trade_count
        ));
    }

    for row in table.iter().filter(|r| r.trade_count >= MIN_DAY_SAMPLE) {
        if row.win_rate >= HIGH_WIN_RATE {
            out.push(format!(
                "High win rate on {}: {} of trades closed in profit.",
                row.bucket,
                pct(row.win_rate)
            ));
        } else if row.win_rate <= LOW_WIN_RATE {
            out.push(format!(
                "Low win rate on {}: only {} of trades closed in profit.",
                row.bucket,
                pct(row.win_rate)
            ));
        }
    }

    if summary.loss_days == 0 {
        out.push("Every traded day of the week is net profitable.".to_string());
    } else if summary.profitable_days == 0 {
        out.push("No day of the week is net profitable yet.".to_string());
    }

    out
}

fn generate_recommendations(summary: &DaySummary) -> Vec<String> {
    let mut out = Vec::new();
    if summary.best_day.total_pnl > 0.0 {
        out.push(format!(
            "Prioritize {}: it has produced your strongest results.",
            summary.best_day.bucket
        ));
    }
    if summary.worst_day.total_pnl < 0.0 {
        out.push(format!(
            "Reduce position size or sit out on {} until its results improve.",
            summary.worst_day.bucket
        ));
    }
    if summary.loss_days > summary.profitable_days {
        out.push(
            "Losing days outnumber winning days; review setup selection before adding size."
                .to_string(),
        );
    }
    out
}
