//! Rule primitives for survey schema harmonization.
//!
//! Every primitive mutates a Polars [`DataFrame`](polars::prelude::DataFrame)
//! in place and returns how much it touched:
//!
//! - **rename**: crosswalk column renaming
//! - **family**: one-of and multi-any collapsing of indicator families
//! - **recode**: per-column value mapping
//! - **clip**: numeric saturation into bounds
//! - **filter**: conjunctive row filtering
//! - **conditional**: conditional column assignment
//! - **enrich**: lookup joins and manual overrides
//! - **numeric**: parse-or-null numeric casting
//! - **validate**: required-column checks
//!
//! All primitives skip silently (with a `debug` event) when their columns are
//! absent. Only [`validate_required`] fails.

pub mod cells;
pub mod clip;
pub mod conditional;
pub mod enrich;
pub mod error;
pub mod family;
pub mod filter;
pub mod numeric;
pub mod recode;
pub mod rename;
pub mod validate;

pub use clip::clip_columns;
pub use conditional::conditional_set;
pub use enrich::{apply_overrides, join_lookup};
pub use error::{Result, SchemaError, TransformError};
pub use family::{collapse_family, collapse_multi_any, collapse_one_of};
pub use filter::{condition_mask, filter_rows};
pub use numeric::cast_numeric;
pub use recode::apply_recode;
pub use rename::rename_columns;
pub use validate::validate_required;
