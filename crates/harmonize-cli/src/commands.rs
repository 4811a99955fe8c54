use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use comfy_table::{Cell, Table};
use harmonize_cli::io::{read_table, with_row_index, write_table};
use harmonize_core::{Harmonizer, PipelineKind, RunReport, load_profile};
use tracing::{info, info_span};

use crate::cli::RunArgs;
use crate::summary::{apply_table_style, header_cell};

/// Result of a `run` invocation.
pub struct RunOutcome {
    pub output: PathBuf,
    pub report: RunReport,
}

pub fn run_harmonize(args: &RunArgs) -> Result<RunOutcome> {
    let kind = PipelineKind::from(args.pipeline);
    let span = info_span!("run", pipeline = kind.name(), input = %args.input.display());
    let _guard = span.enter();

    let mut input = read_table(&args.input)?;
    if let Some(name) = &args.row_index {
        input = with_row_index(&input, name)?;
    }
    let lookup = args
        .lookup
        .as_deref()
        .map(read_table)
        .transpose()
        .context("load lookup table")?;

    let harmonizer = match &args.profile {
        Some(path) => {
            let profile = load_profile(path)?;
            info!(profile = %path.display(), "using custom profile");
            Harmonizer::with_profile(kind, profile)
        }
        None => Harmonizer::new(kind).context("build built-in profile")?,
    };

    let (output_df, report) = harmonizer
        .run_with_report(&input, lookup.as_ref())
        .with_context(|| format!("harmonize {}", args.input.display()))?;

    let output = args
        .output
        .clone()
        .unwrap_or_else(|| default_output_path(&args.input, kind));
    write_table(&output_df, &output, &args.list_separator)?;
    info!(output = %output.display(), rows = output_df.height(), "output written");

    Ok(RunOutcome { output, report })
}

pub fn run_pipelines() -> Result<()> {
    let mut table = Table::new();
    table.set_header(vec![header_cell("Pipeline"), header_cell("Steps")]);
    apply_table_style(&mut table);
    for kind in PipelineKind::ALL {
        let steps: Vec<&str> = kind.steps().iter().map(|step| step.name()).collect();
        table.add_row(vec![Cell::new(kind), Cell::new(steps.join(" > "))]);
    }
    println!("{table}");
    Ok(())
}

pub fn run_profile(kind: PipelineKind) -> Result<()> {
    let profile = kind
        .default_profile()
        .with_context(|| format!("build profile for {kind}"))?;
    let text = profile.to_toml_string()?;
    print!("{text}");
    Ok(())
}

/// `<dir>/<stem>_<pipeline>.csv` next to the input file.
fn default_output_path(input: &Path, kind: PipelineKind) -> PathBuf {
    let stem = input
        .file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_else(|| "output".to_string());
    let file_name = format!("{stem}_{}.csv", kind.name().replace('-', "_"));
    input.with_file_name(file_name)
}
