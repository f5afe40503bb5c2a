use chrono::NaiveDate;
use serde_json::{json, Value};

use crate::config::Config;
use crate::models::{ClockTime, Direction, DurationCategory, Instrument, ProcessedTradeRecord};

/// Builds a normalized trade with sensible defaults: 09:30 entry, five
/// minute hold, 50 units at ₹100, long.
pub struct TradeBuilder {
    trade: ProcessedTradeRecord,
}

impl TradeBuilder {
    pub fn new(date: &str, pnl: f64) -> Self {
        let date = NaiveDate::parse_from_str(date, "%Y-%m-%d").unwrap();
        let trade = ProcessedTradeRecord {
            date,
            day_of_week: date.format("%A").to_string(),
            entry_time: ClockTime::new(9, 30, 0),
            exit_time: ClockTime::new(9, 35, 0),
            time_recorded: true,
            symbol: "NIFTY".to_string(),
            instrument: Instrument::Nifty,
            pnl,
            duration_seconds: 300,
            duration_category: DurationCategory::from_seconds(300),
            quantity: 50.0,
            entry_price: 100.0,
            exit_price: 100.0 + pnl / 50.0,
            side: Direction::Long,
            is_profit: pnl > 0.0,
            is_loss: pnl < 0.0,
        };
        Self { trade }
    }

    pub fn symbol(mut self, symbol: &str) -> Self {
        self.trade.symbol = symbol.to_uppercase();
        self.trade.instrument = Instrument::classify(symbol);
        self
    }

    pub fn side(mut self, side: Direction) -> Self {
        self.trade.side = side;
        self
    }

    pub fn at(mut self, hour: u32, minute: u32) -> Self {
        self.trade.entry_time = ClockTime::new(hour, minute, 0);
        self.trade.time_recorded = true;
        self
    }

    /// Marks the entry time as never recorded.
    pub fn untimed(mut self) -> Self {
        self.trade.entry_time = ClockTime::default();
        self.trade.time_recorded = false;
        self
    }

    pub fn held(mut self, seconds: u64) -> Self {
        self.trade.duration_seconds = seconds;
        self.trade.duration_category = DurationCategory::from_seconds(seconds);
        self
    }

    pub fn size(mut self, quantity: f64, entry_price: f64) -> Self {
        self.trade.quantity = quantity;
        self.trade.entry_price = entry_price;
        self
    }

    pub fn build(self) -> ProcessedTradeRecord {
        self.trade
    }
}

/// A broker-style raw row as it would arrive in a request body.
pub fn raw_trade(date: &str, time: &str, symbol: &str, pnl: f64) -> Value {
    json!({
        "Date": date,
        "Entry Time": time,
        "Symbol": symbol,
        "P&L": pnl,
        "Duration": "5m",
        "Quantity": 25,
        "Entry Price": 150.0,
        "Side": "BUY",
    })
}

/// Config with no API key, so the AI layer runs against the canned client.
pub fn default_test_config() -> Config {
    Config {
        google_api_key: None,
        gemini_model: "gemini-1.5-flash".to_string(),
        gemini_base_url: "http://127.0.0.1:9".to_string(),
        ai_max_output_tokens: 256,
        ai_temperature: 0.7,
        ai_timeout_secs: 2,
        ai_input_cost_per_mtok: 0.075,
        ai_output_cost_per_mtok: 0.30,
        min_ai_trades: 5,
        include_weekends: false,
        top_n_symbols: 5,
        bind_addr: "127.0.0.1:0".to_string(),
        log_level: "debug".to_string(),
    }
}
