use serde_json::{json, Value};

use trade_insights::config::Config;

/// A journal row as a broker export would carry it.
pub fn journal_row(date: &str, time: &str, symbol: &str, side: &str, pnl: f64) -> Value {
    json!({
        "Trade Date": date,
        "Entry Time": time,
        "Symbol": symbol,
        "Side": side,
        "P&L": pnl,
        "Duration": "5m 30s",
        "Quantity": 50,
        "Entry Price": 240.0,
    })
}

/// Same row with an explicit holding period.
pub fn timed_row(date: &str, duration: &str, pnl: f64) -> Value {
    let mut row = journal_row(date, "10:15", "NIFTY", "BUY", pnl);
    row["Duration"] = json!(duration);
    row
}

/// A row with no entry or exit time at all.
pub fn untimed_row(date: &str, symbol: &str, pnl: f64) -> Value {
    json!({
        "Date": date,
        "Symbol": symbol,
        "P&L": pnl,
        "Quantity": 25,
        "Entry Price": 180.0,
    })
}

/// Five trades: three winning long BANKNIFTY on a Monday, two losing short
/// NIFTY on the Tuesday after.
pub fn monday_tuesday_journal() -> Value {
    json!([
        journal_row("13/01/2025", "09:20", "BANKNIFTY", "BUY", 1500.0),
        journal_row("13/01/2025", "10:45", "BANKNIFTY", "BUY", 800.0),
        journal_row("13/01/2025", "13:10", "BANKNIFTY", "BUY", 350.0),
        journal_row("14/01/2025", "09:40", "NIFTY", "SELL", -600.0),
        journal_row("14/01/2025", "14:05", "NIFTY", "SELL", -250.0),
    ])
}

/// A varied two-week journal touching every calculator.
pub fn mixed_journal() -> Value {
    json!([
        journal_row("13/01/2025", "09:16", "NIFTY 23500 CE", "BUY", 1200.0),
        journal_row("13/01/2025", "09:50", "NIFTY 23500 PE", "BUY", -450.0),
        journal_row("13/01/2025", "11:30", "RELIANCE", "BUY", 320.5),
        journal_row("14/01/2025", "10:05", "BANKNIFTY", "SELL", -980.0),
        journal_row("15/01/2025", "12:20", "FINNIFTY", "BUY", 75.25),
        journal_row("15/01/2025", "14:45", "TCS", "SELL", 410.0),
        journal_row("16/01/2025", "09:25", "BANKNIFTY 48000 CE", "BUY", -130.0),
        journal_row("17/01/2025", "15:05", "NIFTY", "SELL", 660.0),
        journal_row("20/01/2025", "09:30", "INFY", "BUY", -210.75),
        journal_row("20/01/2025", "10:10", "INFY", "BUY", -90.0),
        journal_row("20/01/2025", "11:55", "NIFTY 23400 CE", "BUY", 540.0),
        journal_row("20/01/2025", "13:40", "NIFTY", "BUY", 130.0),
        journal_row("20/01/2025", "14:20", "NIFTY", "SELL", -60.0),
        journal_row("20/01/2025", "15:00", "NIFTY", "SELL", 25.0),
    ])
}

pub fn test_config() -> Config {
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

pub fn approx_eq(a: f64, b: f64) -> bool {
    (a - b).abs() < 1e-6
}
