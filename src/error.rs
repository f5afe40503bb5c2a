use thiserror::Error;

/// Request-level validation failures. These map to a 400 response.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InputError {
    #[error("trade data must be an array")]
    NotAnArray,
    #[error("trade data is empty")]
    Empty,
    #[error("no valid trades found in {total} records")]
    NoValidTrades { total: usize },
    #[error("at least {required} trades are required, found {found}")]
    InsufficientTrades { required: usize, found: usize },
}

/// Why a single raw record was dropped by the data processor.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SkipReason {
    #[error("record is not an object")]
    NotAnObject,
    #[error("missing date")]
    MissingDate,
    #[error("unparseable date '{0}'")]
    InvalidDate(String),
    #[error("missing P&L")]
    MissingPnl,
    #[error("unparseable P&L '{0}'")]
    InvalidPnl(String),
}

/// Failure of one insight calculator. Recorded by the orchestrators and
/// never allowed to abort sibling calculators.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AnalysisError {
    #[error("no trades to analyze")]
    NoTrades,
    #[error("no valid trades after filtering: {0}")]
    NoValidTrades(String),
}

/// Failures talking to the text-generation API.
#[derive(Debug, Error)]
pub enum AiError {
    #[error("no API key configured")]
    MissingApiKey,
    #[error("API quota exceeded: {0}")]
    QuotaExceeded(String),
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("API error {status}: {body}")]
    Api { status: u16, body: String },
    #[error("response contained no text")]
    EmptyResponse,
}

impl AiError {
    /// Quota and missing-key failures are expected in normal operation and
    /// are logged without alarm.
    pub fn is_expected(&self) -> bool {
        matches!(self, AiError::MissingApiKey | AiError::QuotaExceeded(_))
    }
}
