//! Fixed step orders for the four EPH ↔ Censo pipelines.
//!
//! # Step orders
//!
//! | Pipeline | Steps |
//! |---|---|
//! | `eph-to-censo-household` | filter, rename, collapse, recode, clip, enrich, cast, validate |
//! | `eph-to-censo-individual` | rename, collapse, recode, clip, conditional, enrich, cast, validate |
//! | `censo-to-eph-household` | recode, clip, rename, collapse, enrich, cast, validate |
//! | `censo-to-eph-individual` | recode, clip, rename, collapse, conditional, enrich, cast, validate |
//!
//! Each run works on a copy of the input table; the caller's table is never
//! modified.
//!
//! # Example
//!
//! ```ignore
//! use harmonize_core::{Harmonizer, PipelineKind};
//!
//! let harmonizer = Harmonizer::new(PipelineKind::EphToCensoHousehold)?;
//! let aligned = harmonizer.run(&households, Some(&regions))?;
//! ```

use std::fmt;
use std::str::FromStr;
use std::time::Instant;

use harmonize_model::{ConfigError, Operation};
use harmonize_transform::{
    Result, apply_overrides, apply_recode, cast_numeric, clip_columns, collapse_family,
    conditional_set, filter_rows, join_lookup, rename_columns, validate_required,
};
use polars::prelude::DataFrame;
use serde::Serialize;
use tracing::{debug, info, info_span};

use crate::defaults;
use crate::error::ProfileError;
use crate::profile::PipelineProfile;

/// One stage of a pipeline, drawing its rules from the profile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Step {
    Filter,
    Rename,
    Collapse,
    Recode,
    Clip,
    ConditionalSet,
    /// Lookup join, when configured, followed by overrides. Skipped without a
    /// lookup table, or without the key column when the profile asks for it.
    Enrich,
    CastNumeric,
    Validate,
}

impl Step {
    pub fn name(self) -> &'static str {
        match self {
            Self::Filter => "filter",
            Self::Rename => "rename",
            Self::Collapse => "collapse",
            Self::Recode => "recode",
            Self::Clip => "clip",
            Self::ConditionalSet => "conditional_set",
            Self::Enrich => "enrich",
            Self::CastNumeric => "cast_numeric",
            Self::Validate => "validate",
        }
    }

    /// Primitive operations this step performs.
    pub fn operations(self) -> &'static [Operation] {
        match self {
            Self::Filter => &[Operation::Filter],
            Self::Rename => &[Operation::Rename],
            Self::Collapse => &[Operation::CollapseOneOf, Operation::CollapseMultiAny],
            Self::Recode => &[Operation::Recode],
            Self::Clip => &[Operation::Clip],
            Self::ConditionalSet => &[Operation::ConditionalSet],
            Self::Enrich => &[Operation::Enrich, Operation::Override],
            Self::CastNumeric => &[Operation::CastNumeric],
            Self::Validate => &[Operation::ValidateRequired],
        }
    }

    /// Apply this step to `df`.
    ///
    /// Returns the step's affected count: rows removed, columns renamed,
    /// active family rows, cells changed, rows matched or columns cast.
    pub fn apply(
        self,
        df: &mut DataFrame,
        lookup: Option<&DataFrame>,
        profile: &PipelineProfile,
        stage: &str,
    ) -> Result<usize> {
        match self {
            Self::Filter => filter_rows(df, &profile.filters),
            Self::Rename => rename_columns(df, &profile.crosswalk),
            Self::Collapse => profile
                .families
                .iter()
                .try_fold(0, |total, family| {
                    collapse_family(df, family).map(|n| total + n)
                }),
            Self::Recode => apply_recode(df, &profile.recode),
            Self::Clip => clip_columns(df, &profile.clip),
            Self::ConditionalSet => profile
                .conditionals
                .iter()
                .try_fold(0, |total, rule| {
                    conditional_set(df, rule).map(|n| total + n)
                }),
            Self::Enrich => {
                let Some(lookup) = lookup else {
                    debug!("enrichment skipped: no lookup table");
                    return Ok(0);
                };
                if profile.enrich_requires_key
                    && let Some(join) = &profile.lookup
                    && df.column(&join.on).is_err()
                {
                    debug!(on = %join.on, "enrichment skipped: key column not present");
                    return Ok(0);
                }
                let matched = match &profile.lookup {
                    Some(join) => join_lookup(df, lookup, join)?,
                    None => 0,
                };
                apply_overrides(df, &profile.overrides)?;
                Ok(matched)
            }
            Self::CastNumeric => cast_numeric(df, &profile.numeric),
            Self::Validate => {
                validate_required(df, &profile.required, stage)?;
                Ok(0)
            }
        }
    }
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Direction and unit of analysis of a harmonization run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum PipelineKind {
    EphToCensoHousehold,
    EphToCensoIndividual,
    CensoToEphHousehold,
    CensoToEphIndividual,
}

impl PipelineKind {
    pub const ALL: [Self; 4] = [
        Self::EphToCensoHousehold,
        Self::EphToCensoIndividual,
        Self::CensoToEphHousehold,
        Self::CensoToEphIndividual,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Self::EphToCensoHousehold => "eph-to-censo-household",
            Self::EphToCensoIndividual => "eph-to-censo-individual",
            Self::CensoToEphHousehold => "censo-to-eph-household",
            Self::CensoToEphIndividual => "censo-to-eph-individual",
        }
    }

    pub fn steps(self) -> &'static [Step] {
        use Step::{
            CastNumeric, Clip, Collapse, ConditionalSet, Enrich, Filter, Recode, Rename, Validate,
        };
        match self {
            Self::EphToCensoHousehold => &[
                Filter,
                Rename,
                Collapse,
                Recode,
                Clip,
                Enrich,
                CastNumeric,
                Validate,
            ],
            Self::EphToCensoIndividual => &[
                Rename,
                Collapse,
                Recode,
                Clip,
                ConditionalSet,
                Enrich,
                CastNumeric,
                Validate,
            ],
            Self::CensoToEphHousehold => &[
                Recode,
                Clip,
                Rename,
                Collapse,
                Enrich,
                CastNumeric,
                Validate,
            ],
            Self::CensoToEphIndividual => &[
                Recode,
                Clip,
                Rename,
                Collapse,
                ConditionalSet,
                Enrich,
                CastNumeric,
                Validate,
            ],
        }
    }

    /// The built-in alignment rules for this pipeline.
    pub fn default_profile(self) -> std::result::Result<PipelineProfile, ConfigError> {
        match self {
            Self::EphToCensoHousehold => defaults::eph_to_censo_household(),
            Self::EphToCensoIndividual => defaults::eph_to_censo_individual(),
            Self::CensoToEphHousehold => defaults::censo_to_eph_household(),
            Self::CensoToEphIndividual => defaults::censo_to_eph_individual(),
        }
    }
}

impl fmt::Display for PipelineKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for PipelineKind {
    type Err = ProfileError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase().replace('_', "-");
        Self::ALL
            .into_iter()
            .find(|kind| kind.name() == wanted)
            .ok_or_else(|| ProfileError::UnknownPipeline(s.to_string()))
    }
}

/// Affected count of one executed step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StepReport {
    pub step: Step,
    pub affected: usize,
}

/// What a run did, for summaries.
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub pipeline: PipelineKind,
    pub stage: String,
    pub input_rows: usize,
    pub input_columns: usize,
    pub output_rows: usize,
    pub output_columns: usize,
    pub steps: Vec<StepReport>,
    pub elapsed_ms: u128,
}

/// A pipeline kind bundled with the rules it runs.
#[derive(Debug, Clone)]
pub struct Harmonizer {
    kind: PipelineKind,
    profile: PipelineProfile,
}

impl Harmonizer {
    /// Harmonizer using the built-in profile for `kind`.
    pub fn new(kind: PipelineKind) -> std::result::Result<Self, ConfigError> {
        Ok(Self {
            kind,
            profile: kind.default_profile()?,
        })
    }

    pub fn with_profile(kind: PipelineKind, profile: PipelineProfile) -> Self {
        Self { kind, profile }
    }

    pub fn kind(&self) -> PipelineKind {
        self.kind
    }

    pub fn profile(&self) -> &PipelineProfile {
        &self.profile
    }

    /// Label used in validation errors.
    pub fn stage(&self) -> String {
        if self.profile.stage.is_empty() {
            self.kind.name().replace('-', "_")
        } else {
            self.profile.stage.clone()
        }
    }

    pub fn run(&self, df: &DataFrame, lookup: Option<&DataFrame>) -> Result<DataFrame> {
        self.run_with_report(df, lookup).map(|(out, _)| out)
    }

    /// Run every step in order on a copy of `df`.
    ///
    /// Fails only when validation finds required columns missing, or on an
    /// internal Polars error; no partial output is returned.
    pub fn run_with_report(
        &self,
        df: &DataFrame,
        lookup: Option<&DataFrame>,
    ) -> Result<(DataFrame, RunReport)> {
        let span = info_span!("harmonize", pipeline = self.kind.name());
        let _guard = span.enter();
        let started = Instant::now();
        let stage = self.stage();

        let mut out = df.clone();
        let mut steps = Vec::with_capacity(self.kind.steps().len());
        for step in self.kind.steps() {
            let affected = step.apply(&mut out, lookup, &self.profile, &stage)?;
            debug!(step = step.name(), affected, "step complete");
            steps.push(StepReport {
                step: *step,
                affected,
            });
        }

        let report = RunReport {
            pipeline: self.kind,
            stage,
            input_rows: df.height(),
            input_columns: df.width(),
            output_rows: out.height(),
            output_columns: out.width(),
            steps,
            elapsed_ms: started.elapsed().as_millis(),
        };
        info!(
            rows = report.output_rows,
            columns = report.output_columns,
            elapsed_ms = report.elapsed_ms as u64,
            "harmonization complete"
        );
        Ok((out, report))
    }
}

/// Run pipeline `kind` with `profile` on a copy of `df`.
pub fn harmonize(
    kind: PipelineKind,
    df: &DataFrame,
    lookup: Option<&DataFrame>,
    profile: &PipelineProfile,
) -> Result<DataFrame> {
    Harmonizer::with_profile(kind, profile.clone()).run(df, lookup)
}
