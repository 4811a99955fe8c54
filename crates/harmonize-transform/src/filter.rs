//! Row filtering by conjunctive conditions.

use harmonize_model::Condition;
use polars::prelude::*;
use tracing::debug;

use crate::cells::cell_at;
use crate::error::Result;

/// Per-row result of `condition`, or `None` when its column is absent.
pub fn condition_mask(df: &DataFrame, condition: &Condition) -> Option<Vec<bool>> {
    let column = df.column(&condition.column).ok()?;
    Some(
        (0..column.len())
            .map(|idx| condition.matches(&cell_at(column, idx)))
            .collect(),
    )
}

/// Keep the rows satisfying every condition whose column exists.
///
/// Conditions on absent columns are dropped from the conjunction; with no
/// applicable condition the table is unchanged. Row order is preserved.
///
/// # Returns
///
/// Number of rows removed.
pub fn filter_rows(df: &mut DataFrame, conditions: &[Condition]) -> Result<usize> {
    let mut mask = vec![true; df.height()];
    for condition in conditions {
        let Some(hits) = condition_mask(df, condition) else {
            debug!(%condition, "filter skipped: column not present");
            continue;
        };
        for (keep, hit) in mask.iter_mut().zip(hits) {
            *keep &= hit;
        }
    }

    let removed = mask.iter().filter(|keep| !**keep).count();
    if removed == 0 {
        return Ok(0);
    }
    let mask = BooleanChunked::new("mask".into(), mask);
    *df = df.filter(&mask)?;
    Ok(removed)
}
