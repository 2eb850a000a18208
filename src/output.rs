//! Output of chart specifications and derived series.
//!
//! Charts are emitted as JSON for the rendering surface; smoothed case
//! series can also be written as CSV.

use anyhow::Result;
use csv::WriterBuilder;
use serde::Serialize;
use std::fs;
use std::io::Write;
use std::path::Path;
use tracing::{debug, info};

use crate::series::SmoothedCases;

/// Writes `value` as pretty JSON to stdout.
pub fn print_json(value: &impl Serialize) -> Result<()> {
    let mut stdout = std::io::stdout().lock();
    serde_json::to_writer_pretty(&mut stdout, value)?;
    writeln!(stdout)?;
    Ok(())
}

/// Writes `value` as compact JSON to `path`, creating parent directories.
pub fn write_json(path: &Path, value: &impl Serialize) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let body = serde_json::to_vec(value)?;
    fs::write(path, &body)?;
    info!(path = %path.display(), bytes = body.len(), "JSON written");
    Ok(())
}

/// Writes `value` to `path` when given, otherwise to stdout.
pub fn emit_json(path: Option<&Path>, value: &impl Serialize) -> Result<()> {
    match path {
        Some(path) => write_json(path, value),
        None => print_json(value),
    }
}

#[derive(Serialize)]
struct SeriesRecord {
    date: chrono::NaiveDate,
    new_cases: i64,
    smoothed: i64,
}

/// Writes index-aligned daily and smoothed cases as `date,new_cases,smoothed`.
pub fn write_series_csv<W: Write>(writer: W, cases: &SmoothedCases) -> Result<()> {
    let mut writer = WriterBuilder::new().has_headers(true).from_writer(writer);

    for (original, smoothed) in cases.original.iter().zip(&cases.smoothed) {
        writer.serialize(SeriesRecord {
            date: original.date,
            new_cases: original.value,
            smoothed: smoothed.value,
        })?;
    }
    writer.flush()?;

    debug!(rows = cases.len(), "Series CSV written");
    Ok(())
}
