use serde::Serialize;
use serde_json::Value;
use tracing::{info, warn};

use crate::error::{InputError, SkipReason};
use crate::models::trade::{
    DATE_KEYS, DURATION_KEYS, ENTRY_PRICE_KEYS, ENTRY_TIME_KEYS, EXIT_PRICE_KEYS, EXIT_TIME_KEYS,
    PNL_KEYS, QUANTITY_KEYS, SIDE_KEYS, SYMBOL_KEYS,
};
use crate::models::{
    Direction, DurationCategory, Instrument, ProcessedTradeRecord, RawTradeRecord,
};
use crate::processing::parsers::{
    parse_date, parse_duration_value, parse_number_value, parse_time,
};

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SkippedRecord {
    pub index: usize,
    pub reason: String,
}

/// Output of one processing pass: the valid trades in input order plus an
/// account of every record that was dropped.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProcessedBatch {
    pub trades: Vec<ProcessedTradeRecord>,
    pub total_records: usize,
    pub skipped: Vec<SkippedRecord>,
}

impl ProcessedBatch {
    pub fn valid_count(&self) -> usize {
        self.trades.len()
    }

    pub fn skipped_count(&self) -> usize {
        self.skipped.len()
    }
}

/// Entry point for untyped request bodies. Only a non-array input is a hard
/// failure; bad elements are skipped.
pub fn process_raw_trading_data(raw: &Value) -> Result<ProcessedBatch, InputError> {
    let items = raw.as_array().ok_or(InputError::NotAnArray)?;
    let outcomes = items.iter().map(|item| match item {
        Value::Object(map) => process_record(&RawTradeRecord::new(map.clone())),
        _ => Err(SkipReason::NotAnObject),
    });
    Ok(collect_batch(items.len(), outcomes))
}

pub fn process_records(records: &[RawTradeRecord]) -> ProcessedBatch {
    collect_batch(records.len(), records.iter().map(process_record))
}

fn collect_batch(
    total: usize,
    outcomes: impl Iterator<Item = Result<ProcessedTradeRecord, SkipReason>>,
) -> ProcessedBatch {
    let mut batch = ProcessedBatch {
        trades: Vec::with_capacity(total),
        total_records: total,
        skipped: Vec::new(),
    };

    for (index, outcome) in outcomes.enumerate() {
        match outcome {
            Ok(trade) => batch.trades.push(trade),
            Err(reason) => {
                warn!("Skipping trade record {}: {}", index, reason);
                batch.skipped.push(SkippedRecord {
                    index,
                    reason: reason.to_string(),
                });
            }
        }
    }

    info!(
        "Processed {} valid trades out of {} records",
        batch.valid_count(),
        total
    );
    batch
}

pub fn process_record(raw: &RawTradeRecord) -> Result<ProcessedTradeRecord, SkipReason> {
    let date_text = raw.text(DATE_KEYS).ok_or(SkipReason::MissingDate)?;
    let date = parse_date(&date_text).ok_or_else(|| SkipReason::InvalidDate(date_text.clone()))?;

    let pnl_value = raw.field(PNL_KEYS).ok_or(SkipReason::MissingPnl)?;
    let pnl = parse_number_value(pnl_value)
        .ok_or_else(|| SkipReason::InvalidPnl(value_text(pnl_value)))?;

    let entry = raw.text(ENTRY_TIME_KEYS).and_then(|t| parse_time(&t));
    let exit = raw.text(EXIT_TIME_KEYS).and_then(|t| parse_time(&t));

    let symbol = raw
        .text(SYMBOL_KEYS)
        .map(|s| s.to_uppercase())
        .unwrap_or_else(|| "UNKNOWN".to_string());

    let number = |aliases: &[&str]| raw.field(aliases).and_then(parse_number_value).unwrap_or(0.0);
    let quantity = number(QUANTITY_KEYS);
    let entry_price = number(ENTRY_PRICE_KEYS);
    let exit_price = number(EXIT_PRICE_KEYS);

    let duration_seconds = raw.field(DURATION_KEYS).map_or(0, parse_duration_value);

    let side = raw
        .text(SIDE_KEYS)
        .and_then(|s| Direction::parse(&s))
        .unwrap_or_else(|| infer_side(quantity, entry_price, exit_price, pnl));

    Ok(ProcessedTradeRecord {
        date,
        day_of_week: date.format("%A").to_string(),
        entry_time: entry.unwrap_or_default(),
        exit_time: exit.unwrap_or_default(),
        time_recorded: entry.is_some(),
        instrument: Instrument::classify(&symbol),
        symbol,
        pnl,
        duration_seconds,
        duration_category: DurationCategory::from_seconds(duration_seconds),
        quantity,
        entry_price,
        exit_price,
        side,
        is_profit: pnl > 0.0,
        is_loss: pnl < 0.0,
    })
}

/// Without an explicit side, a negative quantity marks a short. Otherwise the
/// price move is compared with the P&L sign: a falling price with a profit
/// means the trade was short.
fn infer_side(quantity: f64, entry_price: f64, exit_price: f64, pnl: f64) -> Direction {
    if quantity < 0.0 {
        return Direction::Short;
    }
    let price_move = exit_price - entry_price;
    if entry_price > 0.0 && exit_price > 0.0 && price_move != 0.0 && pnl != 0.0 {
        if (price_move > 0.0) == (pnl > 0.0) {
            Direction::Long
        } else {
            Direction::Short
        }
    } else {
        Direction::Long
    }
}

fn value_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
