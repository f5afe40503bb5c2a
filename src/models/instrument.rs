use serde::{Deserialize, Serialize};
use std::fmt;

/// Index names in match priority. BANKNIFTY must come first because it
/// contains NIFTY as a substring; FINNIFTY is caught by the NIFTY entry.
const INDEX_LOOKUP: &[(&str, Instrument)] = &[
    ("BANKNIFTY", Instrument::BankNifty),
    ("NIFTY", Instrument::Nifty),
    ("SENSEX", Instrument::Sensex),
];

const KNOWN_STOCKS: &[&str] = &[
    "RELIANCE",
    "TCS",
    "INFY",
    "HDFCBANK",
    "ICICIBANK",
    "SBIN",
    "AXISBANK",
    "KOTAKBANK",
    "TATAMOTORS",
    "TATASTEEL",
    "ITC",
    "LT",
    "WIPRO",
    "BHARTIARTL",
    "HINDUNILVR",
    "MARUTI",
    "BAJFINANCE",
    "ADANIENT",
    "ASIANPAINT",
    "SUNPHARMA",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Instrument {
    BankNifty,
    Nifty,
    Sensex,
    Stocks,
    Other,
}

impl fmt::Display for Instrument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Instrument {
    pub fn as_str(&self) -> &'static str {
        match self {
            Instrument::BankNifty => "BANKNIFTY",
            Instrument::Nifty => "NIFTY",
            Instrument::Sensex => "SENSEX",
            Instrument::Stocks => "STOCKS",
            Instrument::Other => "OTHER",
        }
    }

    pub fn classify(symbol: &str) -> Self {
        let upper = symbol.trim().to_uppercase();
        if upper.is_empty() {
            return Instrument::Other;
        }

        for (needle, instrument) in INDEX_LOOKUP {
            if upper.contains(needle) {
                return *instrument;
            }
        }

        // Option and futures contracts are prefixed with the underlying ticker
        if KNOWN_STOCKS.iter().any(|ticker| is_ticker_prefix(&upper, ticker)) {
            return Instrument::Stocks;
        }

        Instrument::Other
    }
}

/// `LT` must match `LT` and `LT24JAN3500CE`, but not `LTIM`.
fn is_ticker_prefix(symbol: &str, ticker: &str) -> bool {
    match symbol.strip_prefix(ticker) {
        Some(rest) => rest
            .chars()
            .next()
            .map_or(true, |c| !c.is_ascii_alphabetic()),
        None => false,
    }
}

/// Leading alphabetic run of a symbol, e.g. `BANKNIFTY` for
/// `BANKNIFTY24JAN48000CE`.
pub fn base_symbol(symbol: &str) -> String {
    let upper = symbol.trim().to_uppercase();
    let base: String = upper
        .chars()
        .take_while(|c| c.is_ascii_alphabetic() || *c == '&' || *c == '-')
        .collect();
    if base.is_empty() {
        upper
    } else {
        base
    }
}
