//! CLI argument definitions for the survey harmonizer.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use clap_verbosity_flag::{Verbosity, WarnLevel};
use colorchoice_clap::Color;
use harmonize_cli::logging::LogFormat;
use harmonize_core::PipelineKind;
use tracing::level_filters::LevelFilter;

#[derive(Parser)]
#[command(
    name = "harmonize",
    version,
    about = "Align EPH survey and Censo tables onto a shared schema",
    long_about = "Align Argentine household survey (EPH) and national census (Censo)\n\
                  tables so their household and person records can be compared.\n\n\
                  Each pipeline renames columns, collapses indicator families,\n\
                  recodes answer codes and enriches rows with a region lookup."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Adjust log verbosity (-v for debug, -vv for trace, -q for errors only).
    #[command(flatten)]
    pub verbosity: Verbosity<WarnLevel>,

    /// Control ANSI color output (auto, always, never).
    #[command(flatten)]
    pub color: Color,

    /// Explicit log level (overrides -v/-q flags).
    #[arg(long = "log-level", value_enum, global = true)]
    pub log_level: Option<LogLevelArg>,

    /// Log output format (pretty for human, json for machine parsing).
    #[arg(
        long = "log-format",
        value_enum,
        default_value = "pretty",
        global = true
    )]
    pub log_format: LogFormatArg,

    /// Write logs to a file instead of stderr.
    #[arg(long = "log-file", value_name = "PATH", global = true)]
    pub log_file: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Command {
    /// Harmonize one CSV table.
    Run(RunArgs),

    /// List the pipelines and their step orders.
    Pipelines,

    /// Print the built-in profile of a pipeline as TOML.
    Profile(ProfileArgs),
}

#[derive(Parser)]
pub struct RunArgs {
    /// Pipeline to run.
    #[arg(value_enum, value_name = "PIPELINE")]
    pub pipeline: PipelineArg,

    /// Input CSV table.
    #[arg(value_name = "INPUT")]
    pub input: PathBuf,

    /// Output CSV path (default: <INPUT stem>_<pipeline>.csv next to the input).
    #[arg(short = 'o', long = "output", value_name = "PATH")]
    pub output: Option<PathBuf>,

    /// Region lookup CSV; enrichment is skipped without it.
    #[arg(long = "lookup", value_name = "PATH")]
    pub lookup: Option<PathBuf>,

    /// TOML profile replacing the pipeline's built-in rules.
    #[arg(long = "profile", value_name = "PATH")]
    pub profile: Option<PathBuf>,

    /// Add a 0-based row number column with this name before harmonizing.
    #[arg(long = "row-index", value_name = "NAME")]
    pub row_index: Option<String>,

    /// Separator used when writing multi-answer list cells.
    #[arg(long = "list-separator", value_name = "SEP", default_value = ";")]
    pub list_separator: String,

    /// How to print the run summary.
    #[arg(long = "summary", value_enum, default_value = "table")]
    pub summary: SummaryFormatArg,
}

#[derive(Parser)]
pub struct ProfileArgs {
    #[arg(value_enum, value_name = "PIPELINE")]
    pub pipeline: PipelineArg,
}

#[derive(Clone, Copy, ValueEnum)]
pub enum PipelineArg {
    EphToCensoHousehold,
    EphToCensoIndividual,
    CensoToEphHousehold,
    CensoToEphIndividual,
}

impl From<PipelineArg> for PipelineKind {
    fn from(arg: PipelineArg) -> Self {
        match arg {
            PipelineArg::EphToCensoHousehold => Self::EphToCensoHousehold,
            PipelineArg::EphToCensoIndividual => Self::EphToCensoIndividual,
            PipelineArg::CensoToEphHousehold => Self::CensoToEphHousehold,
            PipelineArg::CensoToEphIndividual => Self::CensoToEphIndividual,
        }
    }
}

#[derive(Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum SummaryFormatArg {
    Table,
    Json,
    /// Print nothing.
    None,
}

/// CLI log level choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum LogLevelArg {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<LogLevelArg> for LevelFilter {
    fn from(level: LogLevelArg) -> Self {
        match level {
            LogLevelArg::Error => Self::ERROR,
            LogLevelArg::Warn => Self::WARN,
            LogLevelArg::Info => Self::INFO,
            LogLevelArg::Debug => Self::DEBUG,
            LogLevelArg::Trace => Self::TRACE,
        }
    }
}

/// CLI log format choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum LogFormatArg {
    Pretty,
    Compact,
    Json,
}

impl From<LogFormatArg> for LogFormat {
    fn from(format: LogFormatArg) -> Self {
        match format {
            LogFormatArg::Pretty => Self::Pretty,
            LogFormatArg::Compact => Self::Compact,
            LogFormatArg::Json => Self::Json,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn run_arguments_parse() {
        let cli = Cli::parse_from([
            "harmonize",
            "run",
            "eph-to-censo-household",
            "hogares.csv",
            "--lookup",
            "regiones.csv",
            "--row-index",
            "row_id",
        ]);
        let Command::Run(args) = cli.command else {
            panic!("expected run command");
        };
        assert_eq!(
            PipelineKind::from(args.pipeline),
            PipelineKind::EphToCensoHousehold
        );
        assert_eq!(args.row_index.as_deref(), Some("row_id"));
        assert_eq!(args.list_separator, ";");
        assert!(args.summary == SummaryFormatArg::Table);
    }

    #[test]
    fn every_pipeline_has_a_value() {
        for kind in PipelineKind::ALL {
            let parsed = PipelineArg::from_str(kind.name(), false).unwrap();
            assert_eq!(PipelineKind::from(parsed), kind);
        }
    }
}
