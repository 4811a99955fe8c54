//! Required-column validation, the one strict check in a pipeline.

use polars::prelude::*;

use crate::cells::has_column;
use crate::error::SchemaError;

/// Fail with every missing column when any of `required` is absent.
pub fn validate_required<S: AsRef<str>>(
    df: &DataFrame,
    required: &[S],
    stage: &str,
) -> std::result::Result<(), SchemaError> {
    let missing: Vec<String> = required
        .iter()
        .map(AsRef::as_ref)
        .filter(|name| !has_column(df, name))
        .map(str::to_string)
        .collect();
    if missing.is_empty() {
        Ok(())
    } else {
        Err(SchemaError {
            stage: stage.to_string(),
            missing,
        })
    }
}
