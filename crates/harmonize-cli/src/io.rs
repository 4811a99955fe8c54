//! CSV input and output for survey tables.
//!
//! Reading goes through Polars so column types are inferred (integer codes
//! stay integers). Writing goes through the `csv` crate because collapsed
//! multi-answer families are list columns, which are flattened into one cell
//! joined by a separator.

use std::path::Path;

use anyhow::{Context, Result};
use harmonize_common::any_to_string_with;
use polars::prelude::*;
use tracing::debug;

/// Read a headered CSV file into a DataFrame.
pub fn read_table(path: &Path) -> Result<DataFrame> {
    let df = CsvReadOptions::default()
        .with_has_header(true)
        .try_into_reader_with_file_path(Some(path.to_path_buf()))
        .with_context(|| format!("Failed to create CSV reader: {}", path.display()))?
        .finish()
        .with_context(|| format!("Failed to read CSV: {}", path.display()))?;
    debug!(
        path = %path.display(),
        rows = df.height(),
        columns = df.width(),
        "table loaded"
    );
    Ok(df)
}

/// Prepend a 0-based row number column so output rows can be traced back to
/// input rows after filtering.
pub fn with_row_index(df: &DataFrame, name: &str) -> Result<DataFrame> {
    df.with_row_index(name.into(), None)
        .with_context(|| format!("Failed to add row index column {name}"))
}

/// Write `df` as CSV, joining list cells with `list_separator`.
///
/// Nulls are written as empty fields.
pub fn write_table(df: &DataFrame, path: &Path, list_separator: &str) -> Result<()> {
    let mut writer = csv::Writer::from_path(path)
        .with_context(|| format!("Failed to create output file: {}", path.display()))?;
    writer
        .write_record(df.get_column_names().iter().map(|name| name.as_str()))
        .with_context(|| format!("Failed to write header: {}", path.display()))?;

    let columns = df.get_columns();
    for row in 0..df.height() {
        let record: Vec<String> = columns
            .iter()
            .map(|column| {
                column
                    .get(row)
                    .map(|value| any_to_string_with(value, list_separator))
                    .unwrap_or_default()
            })
            .collect();
        writer
            .write_record(&record)
            .with_context(|| format!("Failed to write row {row}: {}", path.display()))?;
    }
    writer
        .flush()
        .with_context(|| format!("Failed to flush output: {}", path.display()))?;
    Ok(())
}
