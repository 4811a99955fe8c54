//! Configuration model for survey schema harmonization.
//!
//! Everything here is plain, immutable data: the rule engine in
//! `harmonize-transform` consumes these types by reference, and
//! `harmonize-core` bundles them into pipeline profiles.

pub mod error;
pub mod family;
pub mod operation;
pub mod rules;
pub mod specs;
pub mod value;

pub use error::ConfigError;
pub use family::{CollapseMode, DEFAULT_SUFFIX_PATTERN, FamilyGroup};
pub use operation::{ErrorMode, Operation};
pub use rules::{ComparisonOp, Condition, ConditionalRule, LookupJoin, OverrideRule};
pub use specs::{Bounds, ClipSpec, Crosswalk, RecodeMap, RecodeSpec};
pub use value::Value;
