//! Conversions between Polars columns and rule [`Value`]s.
//!
//! Rules compare and write cells as [`Value`]s so one code path serves
//! integer-coded, decimal and text columns alike. Writing a column back picks
//! the narrowest dtype that holds every value.

use harmonize_common::{any_to_f64, any_to_string};
use harmonize_model::Value;
use polars::prelude::*;

/// View a single Polars cell as a [`Value`].
pub fn cell_value(value: AnyValue<'_>) -> Value {
    match value {
        AnyValue::Null => Value::Null,
        AnyValue::Boolean(b) => Value::Bool(b),
        AnyValue::Int8(v) => Value::Int(i64::from(v)),
        AnyValue::Int16(v) => Value::Int(i64::from(v)),
        AnyValue::Int32(v) => Value::Int(i64::from(v)),
        AnyValue::Int64(v) => Value::Int(v),
        AnyValue::UInt8(v) => Value::Int(i64::from(v)),
        AnyValue::UInt16(v) => Value::Int(i64::from(v)),
        AnyValue::UInt32(v) => Value::Int(i64::from(v)),
        AnyValue::UInt64(v) => i64::try_from(v).map_or(Value::Float(v as f64), Value::Int),
        AnyValue::Float32(v) => Value::Float(f64::from(v)),
        AnyValue::Float64(v) => Value::Float(v),
        AnyValue::String(s) => Value::Str(s.to_string()),
        AnyValue::StringOwned(s) => Value::Str(s.to_string()),
        AnyValue::List(items) => Value::List(
            (0..items.len())
                .filter_map(|idx| items.get(idx).ok())
                .map(cell_value)
                .collect(),
        ),
        other => Value::Str(any_to_string(other)),
    }
}

/// Cell `idx` of `column`, null when out of range.
pub fn cell_at(column: &Column, idx: usize) -> Value {
    column.get(idx).map(cell_value).unwrap_or(Value::Null)
}

/// Every cell of `column` as a [`Value`].
pub fn column_values(column: &Column) -> Vec<Value> {
    (0..column.len()).map(|idx| cell_at(column, idx)).collect()
}

/// Parse-or-null numeric view of every cell of `column`.
pub fn numeric_values(column: &Column) -> Vec<Option<f64>> {
    (0..column.len())
        .map(|idx| column.get(idx).ok().and_then(any_to_f64))
        .collect()
}

pub fn has_column(df: &DataFrame, name: &str) -> bool {
    df.column(name).is_ok()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Shape {
    Empty,
    Bool,
    Int,
    Float,
    List,
    Text,
}

fn infer_shape(values: &[Value]) -> Shape {
    let mut shape = Shape::Empty;
    for value in values {
        let next = match value {
            Value::Null => continue,
            Value::Bool(_) => Shape::Bool,
            Value::Int(_) => Shape::Int,
            Value::Float(_) => Shape::Float,
            Value::List(_) => Shape::List,
            Value::Str(_) => Shape::Text,
        };
        shape = match (shape, next) {
            (Shape::Empty, next) => next,
            (current, next) if current == next => current,
            (Shape::Int, Shape::Float) | (Shape::Float, Shape::Int) => Shape::Float,
            _ => Shape::Text,
        };
    }
    shape
}

/// Build a column named `name` from `values`.
///
/// Integers stay `Int64`, integers mixed with decimals become `Float64`,
/// lists become `List(String)` and any other mix falls back to text. Narrow
/// integer dtypes are not known here; use [`values_to_column_as`] to keep them.
pub fn values_to_column(name: &str, values: &[Value]) -> Column {
    let series = match infer_shape(values) {
        Shape::Empty => Series::full_null(name.into(), values.len(), &DataType::String),
        Shape::Bool => {
            let data: Vec<Option<bool>> = values
                .iter()
                .map(|value| match value {
                    Value::Bool(b) => Some(*b),
                    _ => None,
                })
                .collect();
            Series::new(name.into(), data)
        }
        Shape::Int => {
            let data: Vec<Option<i64>> = values
                .iter()
                .map(|value| match value {
                    Value::Int(v) => Some(*v),
                    _ => None,
                })
                .collect();
            Series::new(name.into(), data)
        }
        Shape::Float => {
            let data: Vec<Option<f64>> = values.iter().map(Value::as_f64).collect();
            Series::new(name.into(), data)
        }
        Shape::List => {
            let data: Vec<Series> = values
                .iter()
                .map(|value| {
                    let items: Vec<String> = match value {
                        Value::List(items) => items.iter().map(ToString::to_string).collect(),
                        _ => Vec::new(),
                    };
                    Series::new("".into(), items)
                })
                .collect();
            Series::new(name.into(), data)
        }
        Shape::Text => {
            let data: Vec<Option<String>> = values
                .iter()
                .map(|value| (!value.is_null()).then(|| value.to_string()))
                .collect();
            Series::new(name.into(), data)
        }
    };
    series.into_column()
}

/// Like [`values_to_column`], keeping an integer `original` dtype (`Int32`,
/// `UInt8`, ...) when every rebuilt value still fits in it.
pub fn values_to_column_as(name: &str, values: &[Value], original: Option<&DataType>) -> Column {
    let column = values_to_column(name, values);
    match original {
        Some(dtype)
            if dtype.is_integer() && column.dtype().is_integer() && column.dtype() != dtype =>
        {
            column.strict_cast(dtype).unwrap_or(column)
        }
        _ => column,
    }
}
