//! Conditional column assignment.

use harmonize_model::{ConditionalRule, Value};
use polars::prelude::*;
use tracing::debug;

use crate::cells::{column_values, has_column, values_to_column_as};
use crate::error::Result;
use crate::filter::condition_mask;

/// Write `rule.set` on every row satisfying `rule.when`.
///
/// The rule is skipped when its condition column or any `requires` column is
/// absent. Target columns that do not exist yet are created, null outside the
/// matching rows.
///
/// # Returns
///
/// Number of matching rows.
pub fn conditional_set(df: &mut DataFrame, rule: &ConditionalRule) -> Result<usize> {
    if let Some(missing) = rule.requires.iter().find(|name| !has_column(df, name)) {
        debug!(condition = %rule.when, column = %missing, "conditional skipped: required column not present");
        return Ok(0);
    }
    let Some(mask) = condition_mask(df, &rule.when) else {
        debug!(condition = %rule.when, "conditional skipped: column not present");
        return Ok(0);
    };
    for (column, value) in &rule.set {
        set_where(df, column, &mask, value)?;
    }
    Ok(mask.iter().filter(|hit| **hit).count())
}

/// Set `column` to `value` where `mask` is true, creating the column if absent.
pub(crate) fn set_where(
    df: &mut DataFrame,
    column: &str,
    mask: &[bool],
    value: &Value,
) -> Result<()> {
    let existing = df.column(column).ok();
    if existing.is_some() && !mask.contains(&true) {
        return Ok(());
    }
    let dtype = existing.map(|column| column.dtype().clone());
    let mut values = existing.map_or_else(|| vec![Value::Null; df.height()], column_values);
    for (cell, hit) in values.iter_mut().zip(mask) {
        if *hit {
            cell.clone_from(value);
        }
    }
    df.with_column(values_to_column_as(column, &values, dtype.as_ref()))?;
    Ok(())
}
