pub mod analysis;
pub mod direction;
pub mod instrument;
pub mod trade;

pub use analysis::{AnalysisMetadata, AnalysisResult, BucketAggregate, InsightData, InsightKind};
pub use direction::*;
pub use instrument::{base_symbol, Instrument};
pub use trade::{ClockTime, DurationCategory, HasPnl, ProcessedTradeRecord, RawTradeRecord};
