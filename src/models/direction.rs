use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Direction {
    Long,
    Short,
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Direction {
    pub const ALL: [Direction; 2] = [Direction::Long, Direction::Short];

    pub fn as_str(&self) -> &'static str {
        match self {
            Direction::Long => "LONG",
            Direction::Short => "SHORT",
        }
    }

    /// Broker exports spell the side many ways: BUY/SELL, B/S, LONG/SHORT.
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_uppercase().as_str() {
            "LONG" | "BUY" | "B" | "BOUGHT" => Some(Direction::Long),
            "SHORT" | "SELL" | "S" | "SOLD" => Some(Direction::Short),
            _ => None,
        }
    }

    pub fn opposite(self) -> Self {
        match self {
            Direction::Long => Direction::Short,
            Direction::Short => Direction::Long,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OptionType {
    CE,
    PE,
}

impl fmt::Display for OptionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OptionType::CE => write!(f, "CE"),
            OptionType::PE => write!(f, "PE"),
        }
    }
}

impl OptionType {
    /// Detects a call/put suffix. The character before the suffix must be a
    /// digit or whitespace so that tickers like RELIANCE are not read as calls.
    pub fn from_symbol(symbol: &str) -> Option<Self> {
        let upper = symbol.trim().to_uppercase();
        let (head, option) = if let Some(head) = upper.strip_suffix("CE") {
            (head, OptionType::CE)
        } else if let Some(head) = upper.strip_suffix("PE") {
            (head, OptionType::PE)
        } else {
            return None;
        };

        match head.chars().last() {
            Some(c) if c.is_ascii_digit() || c.is_whitespace() => Some(option),
            _ => None,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            OptionType::CE => "Call (CE)",
            OptionType::PE => "Put (PE)",
        }
    }
}
