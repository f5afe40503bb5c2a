pub mod csv_import;
pub mod data_processor;
pub mod parsers;

pub use data_processor::{
    process_raw_trading_data, process_record, process_records, ProcessedBatch, SkippedRecord,
};
