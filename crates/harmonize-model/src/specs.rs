//! Column-level specifications: crosswalks, recode tables and clip bounds.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::value::Value;

/// Source column name → destination column name.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Crosswalk(BTreeMap<String, String>);

impl Crosswalk {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from paired name lists, e.g. one survey's names against the
    /// other's in the same order.
    pub fn from_pairs<I, S, T>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (S, T)>,
        S: Into<String>,
        T: Into<String>,
    {
        Self(
            pairs
                .into_iter()
                .map(|(from, to)| (from.into(), to.into()))
                .collect(),
        )
    }

    pub fn insert(&mut self, from: impl Into<String>, to: impl Into<String>) {
        self.0.insert(from.into(), to.into());
    }

    pub fn get(&self, from: &str) -> Option<&str> {
        self.0.get(from).map(String::as_str)
    }

    /// The crosswalk pointing the other way.
    pub fn reversed(&self) -> Self {
        Self(
            self.0
                .iter()
                .map(|(from, to)| (to.clone(), from.clone()))
                .collect(),
        )
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Partial value mapping for one column.
///
/// Serialized as a table with textual keys (`"1" = 6`); keys that look like
/// numbers are matched numerically. Entries are kept in key-text order.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(from = "BTreeMap<String, Value>", into = "BTreeMap<String, Value>")]
pub struct RecodeMap {
    entries: Vec<(Value, Value)>,
}

impl RecodeMap {
    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<Value>,
        V: Into<Value>,
    {
        let mut entries: Vec<(Value, Value)> = pairs
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .collect();
        entries.sort_by_cached_key(|(key, _)| key.to_string());
        Self { entries }
    }

    /// Target for `value`, or `None` when unmapped. Null is never looked up.
    pub fn get(&self, value: &Value) -> Option<&Value> {
        if value.is_null() {
            return None;
        }
        self.entries
            .iter()
            .find(|(key, _)| key.loose_eq(value))
            .map(|(_, target)| target)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// True when no two keys share a target, i.e. the map can be inverted.
    pub fn is_injective(&self) -> bool {
        self.entries.iter().enumerate().all(|(idx, (_, target))| {
            self.entries[idx + 1..]
                .iter()
                .all(|(_, other)| !other.loose_eq(target))
        })
    }
}

impl From<BTreeMap<String, Value>> for RecodeMap {
    fn from(raw: BTreeMap<String, Value>) -> Self {
        Self {
            entries: raw
                .into_iter()
                .map(|(key, target)| (Value::parse_key(&key), target))
                .collect(),
        }
    }
}

impl From<RecodeMap> for BTreeMap<String, Value> {
    fn from(map: RecodeMap) -> Self {
        map.entries
            .into_iter()
            .map(|(key, target)| (key.to_string(), target))
            .collect()
    }
}

/// Recode tables keyed by column name.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RecodeSpec(BTreeMap<String, RecodeMap>);

impl RecodeSpec {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with(mut self, column: impl Into<String>, map: RecodeMap) -> Self {
        self.0.insert(column.into(), map);
        self
    }

    pub fn get(&self, column: &str) -> Option<&RecodeMap> {
        self.0.get(column)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &RecodeMap)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Optional lower and upper saturation bounds.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Bounds {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max: Option<f64>,
}

impl Bounds {
    pub fn between(min: f64, max: f64) -> Self {
        Self {
            min: Some(min),
            max: Some(max),
        }
    }

    pub fn at_least(min: f64) -> Self {
        Self {
            min: Some(min),
            max: None,
        }
    }

    pub fn at_most(max: f64) -> Self {
        Self {
            min: None,
            max: Some(max),
        }
    }

    /// Saturate `value` into the bounds, one side at a time.
    pub fn apply(&self, value: f64) -> f64 {
        let mut out = value;
        if let Some(min) = self.min
            && out < min
        {
            out = min;
        }
        if let Some(max) = self.max
            && out > max
        {
            out = max;
        }
        out
    }
}

/// Clip bounds keyed by column name.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ClipSpec(BTreeMap<String, Bounds>);

impl ClipSpec {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with(mut self, column: impl Into<String>, bounds: Bounds) -> Self {
        self.0.insert(column.into(), bounds);
        self
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Bounds)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}
