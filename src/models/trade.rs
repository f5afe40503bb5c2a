use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;

use crate::models::{Direction, Instrument};

/// Column aliases seen across broker exports, compared after lowercasing and
/// dropping everything that is not a letter or digit (`P&L` becomes `pl`).
pub const DATE_KEYS: &[&str] = &["date", "tradedate", "tradingdate", "entrydate"];
pub const ENTRY_TIME_KEYS: &[&str] = &["entrytime", "time", "buytime", "opentime", "starttime"];
pub const EXIT_TIME_KEYS: &[&str] = &["exittime", "selltime", "closetime", "endtime"];
pub const SYMBOL_KEYS: &[&str] = &["symbol", "instrument", "scrip", "ticker", "tradingsymbol"];
pub const PNL_KEYS: &[&str] = &[
    "pl",
    "pnl",
    "netpl",
    "netpnl",
    "realizedpl",
    "realizedpnl",
    "profitloss",
    "profit",
];
pub const DURATION_KEYS: &[&str] = &["duration", "holdingtime", "holdtime", "holdingduration"];
pub const QUANTITY_KEYS: &[&str] = &["quantity", "qty", "lotsize", "lots", "size"];
pub const ENTRY_PRICE_KEYS: &[&str] = &["entryprice", "buyprice", "avgbuyprice", "openprice", "entry"];
pub const EXIT_PRICE_KEYS: &[&str] = &["exitprice", "sellprice", "avgsellprice", "closeprice", "exit"];
pub const SIDE_KEYS: &[&str] = &["side", "direction", "type", "tradetype", "position", "buysell"];

/// One row of a broker export as it arrived: loosely typed, inconsistently
/// named keys, currency and durations encoded as strings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RawTradeRecord(pub Map<String, Value>);

impl RawTradeRecord {
    pub fn new(fields: Map<String, Value>) -> Self {
        Self(fields)
    }

    /// First non-null value whose normalized key matches one of `aliases`.
    /// Aliases are tried in order so the preferred spelling wins.
    pub fn field(&self, aliases: &[&str]) -> Option<&Value> {
        for alias in aliases {
            let hit = self
                .0
                .iter()
                .find(|(key, value)| !value.is_null() && normalize_key(key) == *alias);
            if let Some((_, value)) = hit {
                return Some(value);
            }
        }
        None
    }

    /// Field rendered as trimmed text; numbers are stringified. Empty strings
    /// count as missing.
    pub fn text(&self, aliases: &[&str]) -> Option<String> {
        let text = match self.field(aliases)? {
            Value::String(s) => s.trim().to_string(),
            Value::Number(n) => n.to_string(),
            Value::Bool(b) => b.to_string(),
            _ => return None,
        };
        if text.is_empty() {
            None
        } else {
            Some(text)
        }
    }
}

impl From<Map<String, Value>> for RawTradeRecord {
    fn from(fields: Map<String, Value>) -> Self {
        Self(fields)
    }
}

pub fn normalize_key(key: &str) -> String {
    key.chars()
        .filter(|c| c.is_alphanumeric())
        .flat_map(char::to_lowercase)
        .collect()
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ClockTime {
    pub hour: u32,
    pub minute: u32,
    pub second: u32,
}

impl ClockTime {
    pub fn new(hour: u32, minute: u32, second: u32) -> Self {
        Self {
            hour,
            minute,
            second,
        }
    }

    pub fn minutes_since_midnight(&self) -> u32 {
        self.hour * 60 + self.minute
    }

    pub fn seconds_since_midnight(&self) -> u32 {
        self.minutes_since_midnight() * 60 + self.second
    }
}

impl fmt::Display for ClockTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:{:02}:{:02}", self.hour, self.minute, self.second)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum DurationCategory {
    #[serde(rename = "<1m")]
    UnderOneMinute,
    #[serde(rename = "1-5m")]
    OneToFiveMinutes,
    #[serde(rename = "5-15m")]
    FiveToFifteenMinutes,
    #[serde(rename = "15-30m")]
    FifteenToThirtyMinutes,
    #[serde(rename = "30m-1h")]
    ThirtyMinutesToOneHour,
    #[serde(rename = "1-2h")]
    OneToTwoHours,
    #[serde(rename = ">2h")]
    OverTwoHours,
}

impl DurationCategory {
    pub const ALL: [DurationCategory; 7] = [
        DurationCategory::UnderOneMinute,
        DurationCategory::OneToFiveMinutes,
        DurationCategory::FiveToFifteenMinutes,
        DurationCategory::FifteenToThirtyMinutes,
        DurationCategory::ThirtyMinutesToOneHour,
        DurationCategory::OneToTwoHours,
        DurationCategory::OverTwoHours,
    ];

    pub fn from_seconds(seconds: u64) -> Self {
        match seconds {
            s if s < 60 => DurationCategory::UnderOneMinute,
            s if s < 300 => DurationCategory::OneToFiveMinutes,
            s if s < 900 => DurationCategory::FiveToFifteenMinutes,
            s if s < 1800 => DurationCategory::FifteenToThirtyMinutes,
            s if s < 3600 => DurationCategory::ThirtyMinutesToOneHour,
            s if s < 7200 => DurationCategory::OneToTwoHours,
            _ => DurationCategory::OverTwoHours,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            DurationCategory::UnderOneMinute => "<1m",
            DurationCategory::OneToFiveMinutes => "1-5m",
            DurationCategory::FiveToFifteenMinutes => "5-15m",
            DurationCategory::FifteenToThirtyMinutes => "15-30m",
            DurationCategory::ThirtyMinutesToOneHour => "30m-1h",
            DurationCategory::OneToTwoHours => "1-2h",
            DurationCategory::OverTwoHours => ">2h",
        }
    }
}

impl fmt::Display for DurationCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A normalized trade. Built once by the data processor and never mutated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProcessedTradeRecord {
    pub date: NaiveDate,
    pub day_of_week: String,
    pub entry_time: ClockTime,
    pub exit_time: ClockTime,
    /// False when the entry time was missing or malformed and `entry_time`
    /// holds the midnight default.
    pub time_recorded: bool,
    pub symbol: String,
    pub instrument: Instrument,
    pub pnl: f64,
    pub duration_seconds: u64,
    pub duration_category: DurationCategory,
    pub quantity: f64,
    pub entry_price: f64,
    pub exit_price: f64,
    pub side: Direction,
    pub is_profit: bool,
    pub is_loss: bool,
}

impl ProcessedTradeRecord {
    /// Notional exposure of the trade: entry price times absolute quantity.
    pub fn position_value(&self) -> f64 {
        self.entry_price * self.quantity.abs()
    }
}

/// Anything that carries a realized P&L.
pub trait HasPnl {
    fn pnl(&self) -> f64;
}

impl HasPnl for ProcessedTradeRecord {
    fn pnl(&self) -> f64 {
        self.pnl
    }
}

impl<T: HasPnl + ?Sized> HasPnl for &T {
    fn pnl(&self) -> f64 {
        (**self).pnl()
    }
}

impl HasPnl for f64 {
    fn pnl(&self) -> f64 {
        *self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn raw(value: Value) -> RawTradeRecord {
        match value {
            Value::Object(map) => RawTradeRecord(map),
            _ => panic!("expected object"),
        }
    }

    #[test]
    fn field_lookup_ignores_case_and_punctuation() {
        let r = raw(json!({"P&L": "₹1,500", "Trade Date": "15/01/2025"}));
        assert_eq!(r.text(PNL_KEYS).as_deref(), Some("₹1,500"));
        assert_eq!(r.text(DATE_KEYS).as_deref(), Some("15/01/2025"));
    }

    #[test]
    fn preferred_alias_wins_and_nulls_are_skipped() {
        let r = raw(json!({"profit": 10, "pnl": null, "Net P&L": 25}));
        assert_eq!(r.text(PNL_KEYS).as_deref(), Some("25"));
    }

    #[test]
    fn empty_text_counts_as_missing() {
        let r = raw(json!({"symbol": "   "}));
        assert!(r.text(SYMBOL_KEYS).is_none());
    }

    #[test]
    fn duration_category_thresholds() {
        assert_eq!(DurationCategory::from_seconds(0), DurationCategory::UnderOneMinute);
        assert_eq!(DurationCategory::from_seconds(59), DurationCategory::UnderOneMinute);
        assert_eq!(DurationCategory::from_seconds(60), DurationCategory::OneToFiveMinutes);
        assert_eq!(DurationCategory::from_seconds(899), DurationCategory::FiveToFifteenMinutes);
        assert_eq!(DurationCategory::from_seconds(1800), DurationCategory::ThirtyMinutesToOneHour);
        assert_eq!(DurationCategory::from_seconds(7199), DurationCategory::OneToTwoHours);
        assert_eq!(DurationCategory::from_seconds(7200), DurationCategory::OverTwoHours);
    }

    #[test]
    fn duration_category_serializes_as_label() {
        let json = serde_json::to_string(&DurationCategory::ThirtyMinutesToOneHour).unwrap();
        assert_eq!(json, "\"30m-1h\"");
    }
}
