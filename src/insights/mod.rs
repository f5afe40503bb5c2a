pub mod day_analysis;
pub mod direction_analysis;
pub mod duration_analysis;
pub mod format;
pub mod lot_size_analysis;
pub mod orchestrator;
pub mod report;
pub mod summaries;
pub mod time_instrument_analysis;
pub mod trade_count_analysis;
pub mod trade_sequence_analysis;

pub use day_analysis::{analyze_day_of_week_pnl, DayAnalysisOptions, DayOfWeekAnalysis};
pub use direction_analysis::{analyze_trade_direction, DirectionAnalysis};
pub use duration_analysis::{analyze_trade_duration, DurationAnalysis};
pub use lot_size_analysis::{analyze_lot_size, LotSizeAnalysis};
pub use orchestrator::{run_all_trading_insights, run_trading_insights, CompleteAnalysisResults};
pub use time_instrument_analysis::{analyze_time_instrument, TimeInstrumentAnalysis};
pub use trade_count_analysis::{analyze_trade_count, TradeCountAnalysis};
pub use trade_sequence_analysis::{analyze_trade_sequence, TradeSequenceAnalysis};

use serde::Serialize;
use tracing::{debug, warn};

use crate::error::AnalysisError;
use crate::models::{AnalysisMetadata, AnalysisResult, InsightData, InsightKind, ProcessedTradeRecord};

pub const DEFAULT_TOP_N: usize = 5;

/// Knobs shared by the calculators; everything else is fixed policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InsightOptions {
    pub include_weekends: bool,
    pub top_n: usize,
}

impl Default for InsightOptions {
    fn default() -> Self {
        Self {
            include_weekends: false,
            top_n: DEFAULT_TOP_N,
        }
    }
}

/// The output of any one calculator.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum InsightReport {
    DayOfWeek(DayOfWeekAnalysis),
    Duration(DurationAnalysis),
    LotSize(LotSizeAnalysis),
    TradeCount(TradeCountAnalysis),
    TradeSequence(TradeSequenceAnalysis),
    TimeInstrument(TimeInstrumentAnalysis),
    Direction(DirectionAnalysis),
}

impl InsightReport {
    pub fn kind(&self) -> InsightKind {
        match self {
            InsightReport::DayOfWeek(_) => InsightKind::DayOfWeek,
            InsightReport::Duration(_) => InsightKind::Duration,
            InsightReport::LotSize(_) => InsightKind::LotSize,
            InsightReport::TradeCount(_) => InsightKind::TradeCount,
            InsightReport::TradeSequence(_) => InsightKind::TradeSequence,
            InsightReport::TimeInstrument(_) => InsightKind::TimeInstrument,
            InsightReport::Direction(_) => InsightKind::Direction,
        }
    }

    pub fn insights(&self) -> &[String] {
        match self {
            InsightReport::DayOfWeek(d) => &d.insights,
            InsightReport::Duration(d) => &d.insights,
            InsightReport::LotSize(d) => &d.insights,
            InsightReport::TradeCount(d) => &d.insights,
            InsightReport::TradeSequence(d) => &d.insights,
            InsightReport::TimeInstrument(d) => &d.insights,
            InsightReport::Direction(d) => &d.insights,
        }
    }

    pub fn recommendations(&self) -> &[String] {
        match self {
            InsightReport::DayOfWeek(d) => &d.recommendations,
            InsightReport::Duration(d) => &d.recommendations,
            InsightReport::LotSize(d) => &d.recommendations,
            InsightReport::TradeCount(d) => &d.recommendations,
            InsightReport::TradeSequence(d) => &d.recommendations,
            InsightReport::TimeInstrument(d) => &d.recommendations,
            InsightReport::Direction(d) => &d.recommendations,
        }
    }

    /// One line per table row, used for prompts and the console report.
    pub fn table_lines(&self) -> Vec<String> {
        match self {
            InsightReport::DayOfWeek(d) => d.table.iter().map(summaries::bucket_line).collect(),
            InsightReport::Duration(d) => d.table.iter().map(summaries::bucket_line).collect(),
            InsightReport::LotSize(d) => d
                .table
                .iter()
                .map(|r| {
                    format!(
                        "{} | avg size {}",
                        summaries::bucket_line(&r.stats),
                        format::inr(r.avg_position_value)
                    )
                })
                .collect(),
            InsightReport::TradeCount(d) => d
                .table
                .iter()
                .map(|r| {
                    format!(
                        "{} trade(s)/day: {} days | total {} | avg/day {} | win rate {}",
                        r.trades_per_day,
                        r.days,
                        format::inr(r.total_pnl),
                        format::inr(r.avg_daily_pnl),
                        format::pct(r.win_rate)
                    )
                })
                .collect(),
            InsightReport::TradeSequence(d) => d.table.iter().map(summaries::bucket_line).collect(),
            InsightReport::TimeInstrument(d) => d
                .table
                .iter()
                .map(|c| summaries::bucket_line(&c.stats))
                .collect(),
            InsightReport::Direction(d) => d
                .table
                .iter()
                .map(|r| summaries::bucket_line(&r.stats))
                .collect(),
        }
    }
}

/// Runs a single calculator by kind. Both orchestrators go through here so
/// the AI layer reads exactly the tables the deterministic path produces.
pub fn run_insight(
    kind: InsightKind,
    trades: &[ProcessedTradeRecord],
    options: &InsightOptions,
) -> AnalysisResult<InsightReport> {
    match kind {
        InsightKind::DayOfWeek => analyze_day_of_week_pnl(
            trades,
            &DayAnalysisOptions {
                include_weekends: options.include_weekends,
            },
        )
        .map(InsightReport::DayOfWeek),
        InsightKind::Duration => analyze_trade_duration(trades).map(InsightReport::Duration),
        InsightKind::LotSize => analyze_lot_size(trades).map(InsightReport::LotSize),
        InsightKind::TradeCount => analyze_trade_count(trades).map(InsightReport::TradeCount),
        InsightKind::TradeSequence => {
            analyze_trade_sequence(trades).map(InsightReport::TradeSequence)
        }
        InsightKind::TimeInstrument => {
            analyze_time_instrument(trades).map(InsightReport::TimeInstrument)
        }
        InsightKind::Direction => {
            analyze_trade_direction(trades, options.top_n).map(InsightReport::Direction)
        }
    }
}

/// Wraps a calculator outcome in the result envelope. `Ok` carries the data
/// and the number of trades the calculator actually used.
pub(crate) fn into_result<R, S>(
    kind: InsightKind,
    total: usize,
    outcome: Result<(InsightData<R, S>, usize), AnalysisError>,
) -> AnalysisResult<InsightData<R, S>> {
    match outcome {
        Ok((data, valid)) => {
            debug!(
                "{}: {} rows from {} of {} trades",
                kind,
                data.table.len(),
                valid,
                total
            );
            let metadata = AnalysisMetadata::new(total, valid, data.table.len());
            AnalysisResult::ok(data, metadata)
        }
        Err(e) => {
            warn!("{} analysis failed: {}", kind, e);
            AnalysisResult::failed(&e, AnalysisMetadata::new(total, 0, 0))
        }
    }
}
