//! Classification of engine operations by failure policy.

use std::fmt;

use serde::{Deserialize, Serialize};

/// What an operation does when the columns it needs are absent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorMode {
    /// Skip silently; the table passes through unchanged.
    Tolerant,
    /// Abort the pipeline with a schema error.
    Strict,
}

/// Every operation the engine performs on a table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Operation {
    Filter,
    Rename,
    CollapseOneOf,
    CollapseMultiAny,
    Recode,
    Clip,
    ConditionalSet,
    Enrich,
    Override,
    CastNumeric,
    ValidateRequired,
}

impl Operation {
    pub const ALL: [Operation; 11] = [
        Self::Filter,
        Self::Rename,
        Self::CollapseOneOf,
        Self::CollapseMultiAny,
        Self::Recode,
        Self::Clip,
        Self::ConditionalSet,
        Self::Enrich,
        Self::Override,
        Self::CastNumeric,
        Self::ValidateRequired,
    ];

    pub fn error_mode(self) -> ErrorMode {
        match self {
            Self::ValidateRequired => ErrorMode::Strict,
            _ => ErrorMode::Tolerant,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Filter => "filter",
            Self::Rename => "rename",
            Self::CollapseOneOf => "collapse_one_of",
            Self::CollapseMultiAny => "collapse_multi_any",
            Self::Recode => "recode",
            Self::Clip => "clip",
            Self::ConditionalSet => "conditional_set",
            Self::Enrich => "enrich",
            Self::Override => "override",
            Self::CastNumeric => "cast_numeric",
            Self::ValidateRequired => "validate_required",
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
