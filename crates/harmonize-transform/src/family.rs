//! Collapsing split indicator columns into a single column.
//!
//! Survey exports often encode one categorical answer as a family of
//! indicator columns (`V21_01`, `V21_02`, ...). A one-of family becomes the
//! suffix of its winning member; a multi-any family becomes the list of
//! suffixes of every active member. Member columns are left in place.

use harmonize_model::{CollapseMode, FamilyGroup};
use polars::prelude::*;
use tracing::debug;

use crate::cells::numeric_values;
use crate::error::Result;

struct Members {
    suffixes: Vec<String>,
    /// Numeric values per member, indexed `[member][row]`; null reads as 0.
    values: Vec<Vec<f64>>,
}

impl Members {
    fn collect(df: &DataFrame, family: &FamilyGroup) -> Option<Self> {
        let mut suffixes = Vec::new();
        let mut values = Vec::new();
        for column in df.get_columns() {
            let Some(suffix) = family.suffix_of(column.name().as_str()) else {
                continue;
            };
            suffixes.push(suffix.to_string());
            values.push(
                numeric_values(column)
                    .into_iter()
                    .map(|v| v.unwrap_or(0.0))
                    .collect(),
            );
        }
        if suffixes.is_empty() {
            debug!(prefix = family.prefix(), "collapse skipped: no member columns");
            return None;
        }
        Some(Self { suffixes, values })
    }

    /// Member with the greatest positive value; ties go to the earliest.
    fn strongest(&self, row: usize) -> Option<usize> {
        let mut best: Option<(usize, f64)> = None;
        for (idx, values) in self.values.iter().enumerate() {
            let value = values[row];
            if value > best.map_or(0.0, |(_, top)| top) {
                best = Some((idx, value));
            }
        }
        best.map(|(idx, _)| idx)
    }

    fn first_active(&self, row: usize) -> Option<usize> {
        self.values.iter().position(|values| values[row] > 0.0)
    }

    fn active(&self, row: usize) -> Vec<&str> {
        self.suffixes
            .iter()
            .zip(&self.values)
            .filter(|(_, values)| values[row] > 0.0)
            .map(|(suffix, _)| suffix.as_str())
            .collect()
    }
}

/// Collapse `family` according to its mode.
///
/// # Returns
///
/// Number of rows with at least one active member.
pub fn collapse_family(df: &mut DataFrame, family: &FamilyGroup) -> Result<usize> {
    match family.mode() {
        CollapseMode::OneOf | CollapseMode::OneOfPreferFirst => collapse_one_of(df, family),
        CollapseMode::MultiAny => collapse_multi_any(df, family),
    }
}

/// Write the suffix of each row's winning member into the destination column.
///
/// With [`CollapseMode::OneOfPreferFirst`] the first positive member wins,
/// otherwise the member with the greatest positive value. Rows without a
/// positive member get null. No member columns means no change.
pub fn collapse_one_of(df: &mut DataFrame, family: &FamilyGroup) -> Result<usize> {
    let Some(members) = Members::collect(df, family) else {
        return Ok(0);
    };
    let prefer_first = family.mode() == CollapseMode::OneOfPreferFirst;
    let chosen: Vec<Option<String>> = (0..df.height())
        .map(|row| {
            let winner = if prefer_first {
                members.first_active(row)
            } else {
                members.strongest(row)
            };
            winner.map(|idx| members.suffixes[idx].clone())
        })
        .collect();
    let active = chosen.iter().filter(|c| c.is_some()).count();
    df.with_column(Series::new(family.into_column().into(), chosen))?;
    Ok(active)
}

/// Write the list of active member suffixes into the destination column.
///
/// Rows without an active member get an empty list. No member columns means
/// no change.
pub fn collapse_multi_any(df: &mut DataFrame, family: &FamilyGroup) -> Result<usize> {
    let Some(members) = Members::collect(df, family) else {
        return Ok(0);
    };
    let mut active_rows = 0;
    let lists: Vec<Series> = (0..df.height())
        .map(|row| {
            let active = members.active(row);
            if !active.is_empty() {
                active_rows += 1;
            }
            Series::new("".into(), active)
        })
        .collect();
    let mut collapsed = Series::new(family.into_column().into(), lists);
    if collapsed.is_empty() {
        collapsed = Series::new_empty(
            family.into_column().into(),
            &DataType::List(Box::new(DataType::String)),
        );
    }
    df.with_column(collapsed)?;
    Ok(active_rows)
}
