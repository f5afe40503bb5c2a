use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::AnalysisError;

/// Aggregate statistics for one categorical bucket of trades.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BucketAggregate {
    pub bucket: String,
    pub total_pnl: f64,
    pub trade_count: usize,
    pub winning_trades: usize,
    pub losing_trades: usize,
    pub avg_pnl: f64,
    /// Percentage, 0-100.
    pub win_rate: f64,
    /// Average win over average absolute loss; 0 when the bucket has no losses.
    pub profit_factor: f64,
    pub avg_win: f64,
    pub avg_loss: f64,
    pub best_trade: f64,
    pub worst_trade: f64,
}

/// The seven deterministic analyses, in the order they run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum InsightKind {
    DayOfWeek,
    Duration,
    LotSize,
    TradeCount,
    TradeSequence,
    TimeInstrument,
    Direction,
}

impl InsightKind {
    pub const ALL: [InsightKind; 7] = [
        InsightKind::DayOfWeek,
        InsightKind::Duration,
        InsightKind::LotSize,
        InsightKind::TradeCount,
        InsightKind::TradeSequence,
        InsightKind::TimeInstrument,
        InsightKind::Direction,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            InsightKind::DayOfWeek => "dayOfWeek",
            InsightKind::Duration => "duration",
            InsightKind::LotSize => "lotSize",
            InsightKind::TradeCount => "tradeCount",
            InsightKind::TradeSequence => "tradeSequence",
            InsightKind::TimeInstrument => "timeInstrument",
            InsightKind::Direction => "direction",
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            InsightKind::DayOfWeek => "Day of Week Performance",
            InsightKind::Duration => "Trade Duration",
            InsightKind::LotSize => "Position Sizing",
            InsightKind::TradeCount => "Daily Trade Count",
            InsightKind::TradeSequence => "Trade Sequence",
            InsightKind::TimeInstrument => "Time of Day x Instrument",
            InsightKind::Direction => "Direction Bias",
        }
    }
}

impl fmt::Display for InsightKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisMetadata {
    pub analysis_date: DateTime<Utc>,
    pub total_trades_processed: usize,
    pub valid_trades: usize,
    pub buckets: usize,
}

impl AnalysisMetadata {
    pub fn new(total_trades_processed: usize, valid_trades: usize, buckets: usize) -> Self {
        Self {
            analysis_date: Utc::now(),
            total_trades_processed,
            valid_trades,
            buckets,
        }
    }
}

/// Table, summary and rendered text produced by one calculator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InsightData<R, S> {
    pub table: Vec<R>,
    pub summary: S,
    pub insights: Vec<String>,
    pub recommendations: Vec<String>,
}

/// Uniform envelope every calculator returns. A failed analysis carries an
/// error message and no data; it never escapes as a panic or `Err`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisResult<T> {
    pub success: bool,
    pub data: Option<T>,
    pub error: Option<String>,
    pub metadata: AnalysisMetadata,
}

impl<T> AnalysisResult<T> {
    pub fn ok(data: T, metadata: AnalysisMetadata) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
            metadata,
        }
    }

    pub fn failed(error: &AnalysisError, metadata: AnalysisMetadata) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(error.to_string()),
            metadata,
        }
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> AnalysisResult<U> {
        AnalysisResult {
            success: self.success,
            data: self.data.map(f),
            error: self.error,
            metadata: self.metadata,
        }
    }

    pub fn into_result(self) -> Result<T, String> {
        match (self.success, self.data) {
            (true, Some(data)) => Ok(data),
            _ => Err(self
                .error
                .unwrap_or_else(|| "analysis returned no data".to_string())),
        }
    }
}
