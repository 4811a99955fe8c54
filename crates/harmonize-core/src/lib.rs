//! EPH ↔ Censo harmonization pipelines.
//!
//! - **profile**: [`PipelineProfile`], the rule set a run consumes (TOML)
//! - **defaults**: built-in alignment tables for the four pipelines
//! - **pipeline**: [`PipelineKind`], [`Step`], [`Harmonizer`] and [`harmonize`]

pub mod defaults;
pub mod error;
pub mod pipeline;
pub mod profile;

pub use error::ProfileError;
pub use harmonize_transform::{SchemaError, TransformError};
pub use pipeline::{Harmonizer, PipelineKind, RunReport, Step, StepReport, harmonize};
pub use profile::{PipelineProfile, load_profile};
