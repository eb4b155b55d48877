// CSV reading and writing.
//
// Headers are written explicitly rather than inferred by serde so an empty
// sample still produces a worksheet with the full column layout.

use std::fs::File;
use std::path::Path;

use anyhow::{Context, Result};
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::db::models::{QuoteTweet, FULL_DATA_HEADER};
use crate::worksheet::{CodingRow, CODING_HEADER};

/// Create the parent directory of an output path if it's missing.
pub fn ensure_parent_dir(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory {}", parent.display()))?;
        }
    }
    Ok(())
}

/// Write `rows` under `header`, returning the number of data rows written.
pub fn write_csv<T: Serialize>(path: &Path, header: &[&str], rows: &[T]) -> Result<usize> {
    ensure_parent_dir(path)?;
    let file =
        File::create(path).with_context(|| format!("Failed to create {}", path.display()))?;
    let mut writer = csv::WriterBuilder::new().has_headers(false).from_writer(file);

    writer.write_record(header)?;
    for row in rows {
        writer
            .serialize(row)
            .with_context(|| format!("Failed to write a row to {}", path.display()))?;
    }
    writer
        .flush()
        .with_context(|| format!("Failed to flush {}", path.display()))?;

    Ok(rows.len())
}

/// Read every record of a headed CSV into `T`. Extra columns are ignored.
pub fn read_csv<T: DeserializeOwned>(path: &Path) -> Result<Vec<T>> {
    let mut reader = csv::Reader::from_path(path)
        .with_context(|| format!("Failed to open {}", path.display()))?;

    let mut records = Vec::new();
    for (i, result) in reader.deserialize().enumerate() {
        // +2: one for the header line, one for 1-based numbering
        let record: T =
            result.with_context(|| format!("Bad record on line {} of {}", i + 2, path.display()))?;
        records.push(record);
    }
    Ok(records)
}

/// Write the unfiltered query result.
pub fn write_full_data(path: &Path, tweets: &[QuoteTweet]) -> Result<usize> {
    write_csv(path, &FULL_DATA_HEADER, tweets)
}

pub fn read_full_data(path: &Path) -> Result<Vec<QuoteTweet>> {
    read_csv(path)
}

pub fn write_worksheet(path: &Path, rows: &[CodingRow]) -> Result<usize> {
    write_csv(path, &CODING_HEADER, rows)
}
