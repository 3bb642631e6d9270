use anyhow::{Context, Result};
use std::path::PathBuf;

use crate::chart::depot_status_chart;
use crate::excel::{Cell, Sheet, open_workbook, save_workbook};
use crate::merge::{
    assemble_output, attach_chart, build_sheet, copy_formatting, extract_rows, merge_rows,
};

/// Pipeline configuration. Sheet names are matched exactly, including any
/// incidental leading or trailing spaces in the source workbook.
#[derive(Clone, Debug)]
pub struct Config {
    pub input: PathBuf,
    pub output: PathBuf,
    pub depot_sheet: String,
    pub financial_sheet: String,
}

/// Run the whole merge: load the workbook, pull the depot and financial
/// sheets, concatenate their rows with a blank separator, attach the depot
/// status chart below the data, carry the depot sheet's layout over, and
/// write the output workbook with the report sheet first.
///
/// Any failure is fatal; a missing sheet aborts before the output file is
/// created or modified.
pub fn run(config: &Config) -> Result<()> {
    let workbook = open_workbook(&config.input)?;

    println!("Sheets found: {:?}", workbook.sheet_names());

    let depot = lookup_sheet(&workbook, &config.depot_sheet)?;
    let financial = lookup_sheet(&workbook, &config.financial_sheet)?;

    let depot_rows = extract_rows(depot);
    println!("\nDepot module rows:");
    trace_rows(&depot_rows);

    let financial_rows = extract_rows(financial);
    println!("\nFinancial table rows:");
    trace_rows(&financial_rows);

    let combined = merge_rows(financial_rows, depot_rows);
    let anchor_row = combined.len() as u32 + 2;

    let mut merged = build_sheet(&config.financial_sheet, combined);
    attach_chart(&mut merged, depot_status_chart(), anchor_row);
    copy_formatting(depot, &mut merged);

    let output = assemble_output(workbook, merged);
    save_workbook(&output, &config.output)?;

    println!("\nOutput sheets: {:?}", output.sheet_names());

    Ok(())
}

fn lookup_sheet<'a>(workbook: &'a crate::excel::Workbook, name: &str) -> Result<&'a Sheet> {
    workbook.sheet(name).with_context(|| {
        format!(
            "Worksheet {name:?} not found; available sheets: {:?}",
            workbook.sheet_names()
        )
    })
}

fn trace_rows(rows: &[Vec<Cell>]) {
    for row in rows {
        let values: Vec<&str> = row.iter().map(|c| c.value.as_str()).collect();
        println!("{values:?}");
    }
}
