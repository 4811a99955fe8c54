//! Split-column families (`V21_01`, `V21_02`, ...) and how to collapse them.

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Suffix pattern used when a family does not specify one.
pub const DEFAULT_SUFFIX_PATTERN: &str = r"\w+";

/// How a family reduces to one column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CollapseMode {
    /// Suffix of the member with the greatest positive value.
    #[default]
    OneOf,
    /// Suffix of the first member with a positive value.
    OneOfPreferFirst,
    /// List of every suffix with a positive value.
    MultiAny,
}

/// A group of indicator columns sharing a prefix.
///
/// Members are the table columns named `{prefix}_{suffix}` where the suffix
/// matches the suffix pattern in full. The destination column is never a
/// member, so collapsing twice is stable.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(try_from = "FamilyGroupDef", into = "FamilyGroupDef")]
pub struct FamilyGroup {
    prefix: String,
    into: String,
    mode: CollapseMode,
    suffix_pattern: String,
    matcher: Regex,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct FamilyGroupDef {
    prefix: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    into: Option<String>,
    #[serde(default)]
    mode: CollapseMode,
    #[serde(default = "default_suffix_pattern")]
    suffix: String,
}

fn default_suffix_pattern() -> String {
    DEFAULT_SUFFIX_PATTERN.to_string()
}

impl FamilyGroup {
    /// Family with the default suffix pattern.
    pub fn new(
        prefix: impl Into<String>,
        into: impl Into<String>,
        mode: CollapseMode,
    ) -> Result<Self, ConfigError> {
        Self::with_suffix_pattern(prefix, into, mode, DEFAULT_SUFFIX_PATTERN)
    }

    pub fn with_suffix_pattern(
        prefix: impl Into<String>,
        into: impl Into<String>,
        mode: CollapseMode,
        suffix_pattern: &str,
    ) -> Result<Self, ConfigError> {
        let prefix = prefix.into();
        let matcher = Regex::new(&format!(
            "^{}_({suffix_pattern})$",
            regex::escape(&prefix)
        ))
        .map_err(|source| ConfigError::InvalidPattern {
            prefix: prefix.clone(),
            source,
        })?;
        Ok(Self {
            prefix,
            into: into.into(),
            mode,
            suffix_pattern: suffix_pattern.to_string(),
            matcher,
        })
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    pub fn into_column(&self) -> &str {
        &self.into
    }

    pub fn mode(&self) -> CollapseMode {
        self.mode
    }

    pub fn suffix_pattern(&self) -> &str {
        &self.suffix_pattern
    }

    /// Suffix of `column` when it is a member of this family.
    pub fn suffix_of<'a>(&self, column: &'a str) -> Option<&'a str> {
        if column == self.into {
            return None;
        }
        self.matcher
            .captures(column)
            .and_then(|caps| caps.get(1))
            .map(|m| m.as_str())
    }
}

impl PartialEq for FamilyGroup {
    fn eq(&self, other: &Self) -> bool {
        self.prefix == other.prefix
            && self.into == other.into
            && self.mode == other.mode
            && self.suffix_pattern == other.suffix_pattern
    }
}

impl TryFrom<FamilyGroupDef> for FamilyGroup {
    type Error = ConfigError;

    fn try_from(def: FamilyGroupDef) -> Result<Self, Self::Error> {
        let into = def.into.unwrap_or_else(|| def.prefix.clone());
        Self::with_suffix_pattern(def.prefix, into, def.mode, &def.suffix)
    }
}

impl From<FamilyGroup> for FamilyGroupDef {
    fn from(group: FamilyGroup) -> Self {
        let into = (group.into != group.prefix).then_some(group.into);
        Self {
            prefix: group.prefix,
            into,
            mode: group.mode,
            suffix: group.suffix_pattern,
        }
    }
}
