use thiserror::Error;

/// Invalid rule configuration, caught when the configuration is built.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid suffix pattern for family {prefix}: {source}")]
    InvalidPattern {
        prefix: String,
        #[source]
        source: regex::Error,
    },
    #[error("unknown comparison operator: {0}")]
    UnknownOperator(String),
}
