//! Row-level rules: conditions, conditional setters, overrides and lookups.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::value::Value;

/// Comparison operator of a `(column, op, literal)` condition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ComparisonOp {
    #[serde(rename = "==")]
    Eq,
    #[serde(rename = "!=")]
    Ne,
    #[serde(rename = "<")]
    Lt,
    #[serde(rename = "<=")]
    Le,
    #[serde(rename = ">")]
    Gt,
    #[serde(rename = ">=")]
    Ge,
    /// Membership: the literal is a list and the cell must equal one element.
    #[serde(rename = "in")]
    In,
}

impl ComparisonOp {
    pub fn symbol(self) -> &'static str {
        match self {
            Self::Eq => "==",
            Self::Ne => "!=",
            Self::Lt => "<",
            Self::Le => "<=",
            Self::Gt => ">",
            Self::Ge => ">=",
            Self::In => "in",
        }
    }

    /// Evaluate `cell <op> literal`.
    ///
    /// A null cell satisfies only `!=`.
    pub fn evaluate(self, cell: &Value, literal: &Value) -> bool {
        match self {
            Self::Eq => cell.loose_eq(literal),
            Self::Ne => !cell.loose_eq(literal),
            Self::Lt => cell.loose_cmp(literal).is_some_and(|o| o.is_lt()),
            Self::Le => cell.loose_cmp(literal).is_some_and(|o| o.is_le()),
            Self::Gt => cell.loose_cmp(literal).is_some_and(|o| o.is_gt()),
            Self::Ge => cell.loose_cmp(literal).is_some_and(|o| o.is_ge()),
            Self::In => match literal {
                Value::List(options) => options.iter().any(|option| cell.loose_eq(option)),
                other => cell.loose_eq(other),
            },
        }
    }
}

impl fmt::Display for ComparisonOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

impl FromStr for ComparisonOp {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "==" => Ok(Self::Eq),
            "!=" => Ok(Self::Ne),
            "<" => Ok(Self::Lt),
            "<=" => Ok(Self::Le),
            ">" => Ok(Self::Gt),
            ">=" => Ok(Self::Ge),
            "in" => Ok(Self::In),
            other => Err(ConfigError::UnknownOperator(other.to_string())),
        }
    }
}

/// A `(column, operator, literal)` triple.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Condition {
    pub column: String,
    pub op: ComparisonOp,
    pub value: Value,
}

impl Condition {
    pub fn new(column: impl Into<String>, op: ComparisonOp, value: impl Into<Value>) -> Self {
        Self {
            column: column.into(),
            op,
            value: value.into(),
        }
    }

    pub fn matches(&self, cell: &Value) -> bool {
        self.op.evaluate(cell, &self.value)
    }
}

impl fmt::Display for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {}", self.column, self.op, self.value)
    }
}

/// Overwrite columns on rows satisfying a condition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConditionalRule {
    /// Columns that must all exist for the rule to apply at all.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub requires: Vec<String>,
    pub when: Condition,
    pub set: BTreeMap<String, Value>,
}

impl ConditionalRule {
    pub fn new(when: Condition) -> Self {
        Self {
            requires: Vec::new(),
            when,
            set: BTreeMap::new(),
        }
    }

    #[must_use]
    pub fn set(mut self, column: impl Into<String>, value: impl Into<Value>) -> Self {
        self.set.insert(column.into(), value.into());
        self
    }

    #[must_use]
    pub fn requires(mut self, column: impl Into<String>) -> Self {
        self.requires.push(column.into());
        self
    }
}

/// Manual correction applied after enrichment.
///
/// `when` is a conjunction of field equalities; a field missing from the
/// table makes the whole rule match nothing.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct OverrideRule {
    #[serde(rename = "match")]
    pub when: BTreeMap<String, Value>,
    pub set: BTreeMap<String, Value>,
}

impl OverrideRule {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn matching(mut self, column: impl Into<String>, value: impl Into<Value>) -> Self {
        self.when.insert(column.into(), value.into());
        self
    }

    #[must_use]
    pub fn set(mut self, column: impl Into<String>, value: impl Into<Value>) -> Self {
        self.set.insert(column.into(), value.into());
        self
    }
}

/// Left-join enrichment: take `take` from the lookup table keyed on `on`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LookupJoin {
    pub on: String,
    pub take: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub into: Option<String>,
}

impl LookupJoin {
    pub fn new(on: impl Into<String>, take: impl Into<String>) -> Self {
        Self {
            on: on.into(),
            take: take.into(),
            into: None,
        }
    }

    #[must_use]
    pub fn into_column(mut self, into: impl Into<String>) -> Self {
        self.into = Some(into.into());
        self
    }

    /// Column the joined value is written to.
    pub fn destination(&self) -> &str {
        self.into.as_deref().unwrap_or(&self.take)
    }
}
