//! Column renaming through a crosswalk.

use std::collections::HashSet;

use harmonize_model::Crosswalk;
use polars::prelude::*;
use tracing::{debug, warn};

use crate::error::Result;

/// Rename every column that appears as a crosswalk source.
///
/// Columns absent from the crosswalk keep their names and crosswalk sources
/// absent from the table are ignored. A rename whose destination is already
/// taken (by an existing column or an earlier rename) is skipped so column
/// names stay unique.
///
/// # Returns
///
/// Number of columns renamed.
pub fn rename_columns(df: &mut DataFrame, crosswalk: &Crosswalk) -> Result<usize> {
    let current: Vec<String> = df
        .get_column_names()
        .iter()
        .map(|name| name.to_string())
        .collect();
    let mut planned: Vec<String> = current
        .iter()
        .map(|name| crosswalk.get(name).unwrap_or(name).to_string())
        .collect();

    // A reverted column takes back its original name, which another rename
    // may have claimed; repeat until stable.
    loop {
        let mut claimed: HashSet<String> = current
            .iter()
            .zip(&planned)
            .filter(|(from, to)| from == to)
            .map(|(name, _)| name.clone())
            .collect();
        let mut reverted = false;
        for (from, to) in current.iter().zip(planned.iter_mut()) {
            if *from == *to {
                continue;
            }
            if !claimed.insert(to.clone()) {
                warn!(column = %from, target = %to, "rename skipped: target column already present");
                to.clone_from(from);
                reverted = true;
            }
        }
        if !reverted {
            break;
        }
    }

    let unused = crosswalk
        .iter()
        .filter(|(from, _)| !current.iter().any(|name| name.as_str() == *from))
        .count();
    if unused > 0 {
        debug!(unused, "crosswalk entries without a source column");
    }

    let renamed = current
        .iter()
        .zip(&planned)
        .filter(|(from, to)| from != to)
        .count();
    if renamed == 0 {
        return Ok(0);
    }

    let columns: Vec<Column> = df
        .get_columns()
        .iter()
        .zip(&planned)
        .map(|(column, name)| column.clone().with_name(name.as_str().into()))
        .collect();
    *df = DataFrame::new(columns)?;

    Ok(renamed)
}
