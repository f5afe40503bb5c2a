use anyhow::{Context, Result};
use serde_json::{Map, Value};
use std::fs::File;
use std::io::Read;
use std::path::Path;

use crate::models::RawTradeRecord;

/// Reads a broker CSV export into raw records, one per row, keyed by the
/// header row. Cells stay strings; empty cells are left out so that field
/// aliases can fall through to another column.
pub fn read_csv<R: Read>(reader: R) -> Result<Vec<RawTradeRecord>> {
    let mut rdr = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .flexible(true)
        .from_reader(reader);

    let headers = rdr.headers().context("Failed to read CSV header row")?.clone();

    let mut records = Vec::new();
    for (line, row) in rdr.records().enumerate() {
        let row = row.with_context(|| format!("Malformed CSV row {}", line + 2))?;
        let mut fields = Map::new();
        for (header, cell) in headers.iter().zip(row.iter()) {
            if header.is_empty() || cell.is_empty() {
                continue;
            }
            fields.insert(header.to_string(), Value::String(cell.to_string()));
        }
        if !fields.is_empty() {
            records.push(RawTradeRecord::new(fields));
        }
    }

    Ok(records)
}

pub fn read_csv_path(path: &Path) -> Result<Vec<RawTradeRecord>> {
    let file = File::open(path).with_context(|| format!("Failed to open {}", path.display()))?;
    read_csv(file)
}
