use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;

use report_merge::report::{self, Config};

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Source workbook path
    #[arg(default_value = "depo.xlsx")]
    input: PathBuf,

    /// Destination workbook path (overwritten if it exists)
    #[arg(default_value = "depo_updated.xlsx")]
    output: PathBuf,

    /// Name of the depot module worksheet, matched exactly (including any
    /// leading or trailing spaces)
    #[arg(long, default_value = " Ana Sayfa depo modülü")]
    depot_sheet: String,

    /// Name of the financial table worksheet, matched exactly; the merged
    /// report sheet is written under this name
    #[arg(long, default_value = "Mali Tablo Modülü ")]
    financial_sheet: String,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    report::run(&Config {
        input: cli.input,
        output: cli.output,
        depot_sheet: cli.depot_sheet,
        financial_sheet: cli.financial_sheet,
    })
}
