//! Per-column value recoding.

use harmonize_model::RecodeSpec;
use polars::prelude::*;
use tracing::debug;

use crate::cells::{column_values, values_to_column_as};
use crate::error::Result;

/// Replace mapped values in every column named by `spec`.
///
/// Unmapped values and nulls pass through. Columns absent from the table are
/// skipped, and a column is only rewritten when at least one cell changed.
///
/// # Returns
///
/// Number of cells whose value changed.
pub fn apply_recode(df: &mut DataFrame, spec: &RecodeSpec) -> Result<usize> {
    let mut total = 0;
    for (name, map) in spec.iter() {
        let Ok(column) = df.column(name) else {
            debug!(column = name, "recode skipped: column not present");
            continue;
        };
        let dtype = column.dtype().clone();
        let mut values = column_values(column);
        let mut changed = 0;
        for value in &mut values {
            if let Some(target) = map.get(value) {
                if target != value {
                    changed += 1;
                }
                *value = target.clone();
            }
        }
        if changed > 0 {
            df.with_column(values_to_column_as(name, &values, Some(&dtype)))?;
            total += changed;
        }
    }
    Ok(total)
}
