//! Shared utilities for the harmonization crates.
//!
//! This crate provides the Polars `AnyValue` helpers used across the
//! workspace, most importantly the single parse-or-null numeric coercion.

pub mod any_value;

pub use any_value::{
    DEFAULT_LIST_SEPARATOR, any_to_f64, any_to_string, any_to_string_with, format_numeric,
    parse_f64,
};
