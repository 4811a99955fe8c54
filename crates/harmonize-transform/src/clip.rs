//! Numeric saturation of columns into bounds.

use harmonize_model::ClipSpec;
use polars::prelude::*;
use tracing::debug;

use crate::cells::numeric_values;
use crate::error::Result;

/// Clip each column named by `spec` into its bounds.
///
/// Values are coerced to numbers first; anything unparseable becomes null.
/// Clipped columns are always written back as `Float64`.
///
/// # Returns
///
/// Number of cells moved onto a bound.
pub fn clip_columns(df: &mut DataFrame, spec: &ClipSpec) -> Result<usize> {
    let mut total = 0;
    for (name, bounds) in spec.iter() {
        let Ok(column) = df.column(name) else {
            debug!(column = name, "clip skipped: column not present");
            continue;
        };
        let mut clipped_cells = 0;
        let clipped: Vec<Option<f64>> = numeric_values(column)
            .into_iter()
            .map(|value| {
                value.map(|v| {
                    let out = bounds.apply(v);
                    if out != v {
                        clipped_cells += 1;
                    }
                    out
                })
            })
            .collect();
        df.with_column(Series::new(name.into(), clipped))?;
        total += clipped_cells;
    }
    Ok(total)
}
