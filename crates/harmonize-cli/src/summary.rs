use std::path::Path;

use anyhow::{Context, Result};
use comfy_table::modifiers::UTF8_ROUND_CORNERS;
use comfy_table::presets::UTF8_FULL_CONDENSED;
use comfy_table::{Attribute, Cell, CellAlignment, Color, ContentArrangement, Table};
use harmonize_core::RunReport;

use crate::cli::SummaryFormatArg;

pub fn print_summary(report: &RunReport, output: &Path, format: SummaryFormatArg) -> Result<()> {
    match format {
        SummaryFormatArg::Table => {
            println!("Pipeline: {}", report.pipeline);
            println!("Output: {}", output.display());
            println!("{}", summary_table(report));
        }
        SummaryFormatArg::Json => {
            let json = serde_json::to_string_pretty(report).context("serialize run summary")?;
            println!("{json}");
        }
        SummaryFormatArg::None => {}
    }
    Ok(())
}

pub fn summary_table(report: &RunReport) -> Table {
    let mut table = Table::new();
    table.set_header(vec![header_cell("Step"), header_cell("Affected")]);
    apply_table_style(&mut table);
    align_column(&mut table, 1, CellAlignment::Right);
    for step in &report.steps {
        table.add_row(vec![Cell::new(step.step), count_cell(step.affected)]);
    }
    table.add_row(vec![
        Cell::new("rows")
            .fg(Color::Cyan)
            .add_attribute(Attribute::Bold),
        Cell::new(format!("{} -> {}", report.input_rows, report.output_rows))
            .add_attribute(Attribute::Bold),
    ]);
    table.add_row(vec![
        Cell::new("columns")
            .fg(Color::Cyan)
            .add_attribute(Attribute::Bold),
        Cell::new(format!(
            "{} -> {}",
            report.input_columns, report.output_columns
        ))
        .add_attribute(Attribute::Bold),
    ]);
    table.add_row(vec![dim_cell("elapsed"), dim_cell(format!("{} ms", report.elapsed_ms))]);
    table
}

pub fn apply_table_style(table: &mut Table) {
    table
        .load_preset(UTF8_FULL_CONDENSED)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_width(120);
}

pub fn header_cell(label: &str) -> Cell {
    Cell::new(label)
        .fg(Color::Cyan)
        .add_attribute(Attribute::Bold)
}

fn count_cell(count: usize) -> Cell {
    if count > 0 {
        Cell::new(count).add_attribute(Attribute::Bold)
    } else {
        dim_cell(count)
    }
}

fn dim_cell<T: ToString>(value: T) -> Cell {
    Cell::new(value).fg(Color::DarkGrey)
}

fn align_column(table: &mut Table, index: usize, alignment: CellAlignment) {
    if let Some(column) = table.column_mut(index) {
        column.set_cell_alignment(alignment);
    }
}
