//! Pipeline profiles: every rule a pipeline run consumes, loadable from TOML.
//!
//! A profile is plain configuration. Every field defaults to empty, so a
//! profile file only has to name the rules it uses:
//!
//! ```toml
//! stage = "eph_to_censo_household"
//! required = ["IX_TOT", "CONDACT"]
//!
//! [[filters]]
//! column = "IV1"
//! op = "!="
//! value = 9
//!
//! [recode.H13]
//! "1" = 1
//! "3" = 2
//! ```

use std::collections::BTreeSet;
use std::path::Path;

use harmonize_model::{
    ClipSpec, Condition, ConditionalRule, Crosswalk, FamilyGroup, LookupJoin, OverrideRule,
    RecodeSpec,
};
use serde::{Deserialize, Serialize};

use crate::error::ProfileError;

/// Rules for one pipeline run.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineProfile {
    /// Label reported by validation failures; the pipeline name when empty.
    #[serde(skip_serializing_if = "String::is_empty")]
    pub stage: String,
    /// Skip enrichment, overrides included, when the table lacks the lookup
    /// key column.
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub enrich_requires_key: bool,
    /// Columns cast to numbers, parse-or-null.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub numeric: Vec<String>,
    /// Columns that must exist at the end of the run.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub required: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub filters: Vec<Condition>,
    #[serde(skip_serializing_if = "Crosswalk::is_empty")]
    pub crosswalk: Crosswalk,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub families: Vec<FamilyGroup>,
    #[serde(skip_serializing_if = "RecodeSpec::is_empty")]
    pub recode: RecodeSpec,
    #[serde(skip_serializing_if = "ClipSpec::is_empty")]
    pub clip: ClipSpec,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub conditionals: Vec<ConditionalRule>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lookup: Option<LookupJoin>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub overrides: Vec<OverrideRule>,
}

impl PipelineProfile {
    /// Parse and validate a profile from TOML text.
    pub fn from_toml_str(contents: &str) -> Result<Self, ProfileError> {
        let profile: Self = toml::from_str(contents).map_err(ProfileError::Parse)?;
        profile.validate()?;
        Ok(profile)
    }

    pub fn to_toml_string(&self) -> Result<String, ProfileError> {
        Ok(toml::to_string(self)?)
    }

    /// Reject rule sets that cannot be applied unambiguously.
    pub fn validate(&self) -> Result<(), ProfileError> {
        let mut destinations = BTreeSet::new();
        for family in &self.families {
            if !destinations.insert(family.into_column()) {
                return Err(ProfileError::invalid(format!(
                    "column {} is produced by more than one family",
                    family.into_column()
                )));
            }
        }
        if let Some(rule) = self.conditionals.iter().find(|rule| rule.set.is_empty()) {
            return Err(ProfileError::invalid(format!(
                "conditional on `{}` sets no columns",
                rule.when
            )));
        }
        if self.overrides.iter().any(|rule| rule.set.is_empty()) {
            return Err(ProfileError::invalid("override sets no columns"));
        }
        if let Some(join) = &self.lookup
            && (join.on.trim().is_empty() || join.take.trim().is_empty())
        {
            return Err(ProfileError::invalid("lookup needs both `on` and `take`"));
        }
        if self.enrich_requires_key && self.lookup.is_none() {
            return Err(ProfileError::invalid(
                "`enrich_requires_key` needs a `lookup` to name the key column",
            ));
        }
        Ok(())
    }
}

/// Read, parse and validate a profile file.
pub fn load_profile(path: &Path) -> Result<PipelineProfile, ProfileError> {
    let contents = std::fs::read_to_string(path).map_err(|source| ProfileError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let profile: PipelineProfile =
        toml::from_str(&contents).map_err(|source| ProfileError::Toml {
            path: path.to_path_buf(),
            source,
        })?;
    profile.validate()?;
    Ok(profile)
}
