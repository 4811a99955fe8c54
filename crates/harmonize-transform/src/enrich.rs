//! Lookup-table enrichment and manual overrides.

use std::collections::HashMap;
use std::collections::hash_map::Entry;

use harmonize_model::{LookupJoin, OverrideRule, Value};
use polars::prelude::*;
use tracing::debug;

use crate::cells::{cell_at, column_values, values_to_column_as};
use crate::conditional::set_where;
use crate::error::Result;

/// Left-join `join.take` from `lookup` onto `df` by the `join.on` key.
///
/// Row count and order of `df` are preserved. Keys compare by their
/// canonical text so `33`, `33.0` and `"33"` meet. Duplicate lookup keys keep
/// their first row. When the destination column already exists, unmatched
/// rows keep their current value. A key column missing on either side, or a
/// missing `take` column, skips the join.
///
/// # Returns
///
/// Number of rows that found a lookup match.
pub fn join_lookup(df: &mut DataFrame, lookup: &DataFrame, join: &LookupJoin) -> Result<usize> {
    let (Ok(keys), Ok(lookup_keys), Ok(lookup_values)) = (
        df.column(&join.on),
        lookup.column(&join.on),
        lookup.column(&join.take),
    ) else {
        debug!(on = %join.on, take = %join.take, "enrichment skipped: join columns not present");
        return Ok(0);
    };

    let mut table: HashMap<String, Value> = HashMap::with_capacity(lookup.height());
    let mut duplicates = 0;
    for idx in 0..lookup.height() {
        let Some(key) = cell_at(lookup_keys, idx).key_text() else {
            continue;
        };
        match table.entry(key) {
            Entry::Occupied(_) => duplicates += 1,
            Entry::Vacant(slot) => {
                slot.insert(cell_at(lookup_values, idx));
            }
        }
    }
    if duplicates > 0 {
        debug!(on = %join.on, duplicates, "duplicate lookup keys ignored");
    }

    let destination = join.destination();
    let existing = df.column(destination).ok();
    let dtype = existing.map(|column| column.dtype().clone());
    let mut values = existing.map_or_else(|| vec![Value::Null; df.height()], column_values);
    let mut matched = 0;
    for (idx, cell) in values.iter_mut().enumerate() {
        let found = cell_at(keys, idx)
            .key_text()
            .and_then(|key| table.get(&key));
        if let Some(found) = found {
            cell.clone_from(found);
            matched += 1;
        }
    }
    df.with_column(values_to_column_as(destination, &values, dtype.as_ref()))?;
    Ok(matched)
}

fn override_mask(df: &DataFrame, rule: &OverrideRule) -> Vec<bool> {
    let mut mask = vec![true; df.height()];
    for (name, expected) in &rule.when {
        let Ok(column) = df.column(name) else {
            debug!(column = %name, "override matches nothing: column not present");
            mask.fill(false);
            break;
        };
        for (idx, keep) in mask.iter_mut().enumerate() {
            if *keep && !cell_at(column, idx).loose_eq(expected) {
                *keep = false;
            }
        }
    }
    mask
}

/// Apply overrides in order; later rules see earlier rules' writes.
///
/// # Returns
///
/// Total number of rows matched across all rules.
pub fn apply_overrides(df: &mut DataFrame, rules: &[OverrideRule]) -> Result<usize> {
    let mut total = 0;
    for rule in rules {
        let mask = override_mask(df, rule);
        for (column, value) in &rule.set {
            set_where(df, column, &mask, value)?;
        }
        total += mask.iter().filter(|hit| **hit).count();
    }
    Ok(total)
}
