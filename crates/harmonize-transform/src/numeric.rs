//! Parse-or-null numeric casting.

use polars::prelude::*;
use tracing::debug;

use crate::cells::numeric_values;
use crate::error::Result;

/// Cast each listed column to `Float64`, nulling values that do not parse.
///
/// Absent columns and list columns (collapsed families) are skipped.
///
/// # Returns
///
/// Number of columns cast.
pub fn cast_numeric<S: AsRef<str>>(df: &mut DataFrame, columns: &[S]) -> Result<usize> {
    let mut cast = 0;
    for name in columns.iter().map(AsRef::as_ref) {
        let Ok(column) = df.column(name) else {
            debug!(column = name, "numeric cast skipped: column not present");
            continue;
        };
        if matches!(column.dtype(), DataType::List(_)) {
            debug!(column = name, "numeric cast skipped: list column");
            continue;
        }
        let before = column.null_count();
        let values = numeric_values(column);
        let after = values.iter().filter(|v| v.is_none()).count();
        if after > before {
            debug!(column = name, nulled = after - before, "unparseable values set to null");
        }
        df.with_column(Series::new(name.into(), values))?;
        cast += 1;
    }
    Ok(cast)
}
