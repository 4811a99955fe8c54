use polars::prelude::PolarsError;
use thiserror::Error;

/// Required columns absent at a validation stage.
///
/// The only failure the harmonization engine reports for schema drift; every
/// other operation skips missing columns.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("missing required columns at {stage}: {}", .missing.join(", "))]
pub struct SchemaError {
    pub stage: String,
    pub missing: Vec<String>,
}

#[derive(Debug, Error)]
pub enum TransformError {
    #[error(transparent)]
    Schema(#[from] SchemaError),
    #[error("polars error: {0}")]
    Polars(#[from] PolarsError),
}

pub type Result<T> = std::result::Result<T, TransformError>;
