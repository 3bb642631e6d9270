use anyhow::{Context, Result};
use rust_xlsxwriter::{
    Chart, ChartPoint, ChartSolidFill, ChartType, Format, Formula, Workbook as XlsxWorkbook,
    Worksheet,
};
use std::path::Path;

use crate::chart::ChartSpec;
use crate::excel::{CellType, Sheet, Workbook};

/// Serialize a workbook to disk. Cell values are written typed (numbers,
/// dates, booleans, formulas, strings), layout metadata is applied per
/// sheet, and chart drawings are inserted at their anchors. Shared strings
/// and zip compression are handled by the xlsx writer itself.
pub fn save_workbook(workbook: &Workbook, path: &Path) -> Result<()> {
    let mut output = XlsxWorkbook::new();

    for sheet in workbook.sheets() {
        let worksheet = output.add_worksheet().set_name(&sheet.name)?;

        write_merged_ranges(worksheet, sheet)?;
        write_cells(worksheet, sheet)?;
        write_layout(worksheet, sheet)?;

        for spec in &sheet.charts {
            insert_chart(worksheet, &sheet.name, spec)?;
        }
    }

    output
        .save(path)
        .with_context(|| format!("Unable to write workbook: {}", path.display()))?;

    Ok(())
}

/// Merged ranges are declared first with a blank placeholder; cell writes
/// afterwards fill in the top-left values. Single-cell ranges are invalid
/// in xlsx and skipped.
fn write_merged_ranges(worksheet: &mut Worksheet, sheet: &Sheet) -> Result<()> {
    let Some(merges) = &sheet.layout.merged_ranges else {
        return Ok(());
    };

    let blank = Format::new();
    for merge in merges {
        if merge.first_row == merge.last_row && merge.first_col == merge.last_col {
            continue;
        }
        worksheet.merge_range(
            merge.first_row,
            merge.first_col,
            merge.last_row,
            merge.last_col,
            "",
            &blank,
        )?;
    }

    Ok(())
}

fn write_cells(worksheet: &mut Worksheet, sheet: &Sheet) -> Result<()> {
    let number_format = Format::new().set_num_format("General");
    let date_format = Format::new().set_num_format("yyyy-mm-dd");

    for row in 1..sheet.data.len() {
        if row > sheet.max_rows {
            break;
        }
        for col in 1..sheet.data[0].len() {
            if col > sheet.max_cols {
                break;
            }
            let cell = &sheet.data[row][col];
            if cell.is_empty() {
                continue;
            }

            let row_idx = (row - 1) as u32;
            let col_idx = (col - 1) as u16;

            if cell.is_formula {
                worksheet.write_formula(row_idx, col_idx, Formula::new(&cell.value))?;
                continue;
            }

            match cell.cell_type {
                CellType::Number => {
                    if let Ok(num) = cell.value.parse::<f64>() {
                        worksheet.write_number_with_format(
                            row_idx,
                            col_idx,
                            num,
                            &number_format,
                        )?;
                    } else {
                        worksheet.write_string(row_idx, col_idx, &cell.value)?;
                    }
                }
                CellType::Date => {
                    worksheet.write_string_with_format(
                        row_idx,
                        col_idx,
                        &cell.value,
                        &date_format,
                    )?;
                }
                CellType::Boolean => {
                    let parsed = match cell.value.as_str() {
                        "TRUE" | "true" => Some(true),
                        "FALSE" | "false" => Some(false),
                        _ => None,
                    };
                    if let Some(b) = parsed {
                        worksheet.write_boolean(row_idx, col_idx, b)?;
                    } else {
                        worksheet.write_string(row_idx, col_idx, &cell.value)?;
                    }
                }
                CellType::Text => {
                    worksheet.write_string(row_idx, col_idx, &cell.value)?;
                }
                CellType::Empty => {}
            }
        }
    }

    Ok(())
}

fn write_layout(worksheet: &mut Worksheet, sheet: &Sheet) -> Result<()> {
    if let Some(widths) = &sheet.layout.column_widths {
        for span in widths {
            for col in span.first_col..=span.last_col {
                worksheet.set_column_width(col, span.width)?;
            }
        }
    }

    if let Some(heights) = &sheet.layout.row_heights {
        for rh in heights {
            worksheet.set_row_height(rh.row, rh.height)?;
        }
    }

    Ok(())
}

/// Charts in xlsx reference worksheet ranges rather than carrying literal
/// data, so the series is seeded into the two columns at the chart anchor;
/// the inserted chart overlays those cells.
fn insert_chart(worksheet: &mut Worksheet, sheet_name: &str, spec: &ChartSpec) -> Result<()> {
    if spec.labels.is_empty() {
        return Ok(());
    }

    for (i, (label, value)) in spec.labels.iter().zip(&spec.values).enumerate() {
        let row = spec.anchor_row + i as u32;
        worksheet.write_string(row, 0, label)?;
        worksheet.write_number(row, 1, *value)?;
    }

    let last_row = spec.anchor_row + spec.labels.len() as u32 - 1;

    let points: Vec<ChartPoint> = spec
        .colors
        .iter()
        .map(|color| ChartPoint::new().set_format(ChartSolidFill::new().set_color(*color)))
        .collect();

    let mut chart = Chart::new(ChartType::Column);
    chart
        .add_series()
        .set_categories((sheet_name, spec.anchor_row, 0, last_row, 0))
        .set_values((sheet_name, spec.anchor_row, 1, last_row, 1))
        .set_points(&points);
    chart.title().set_name(&spec.title);
    if !spec.show_legend {
        chart.legend().set_hidden();
    }

    worksheet.insert_chart(spec.anchor_row, 0, &chart)?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::excel::{Cell, MergedRange, open_workbook};
    use tempfile::TempDir;

    #[test]
    fn degenerate_merged_ranges_are_skipped() {
        let mut sheet = Sheet::from_rows("s", vec![vec![Cell::text("a"), Cell::text("b")]]);
        sheet.layout.merged_ranges = Some(vec![
            // Single-cell range; invalid in xlsx and must not reach the writer.
            MergedRange {
                first_row: 0,
                first_col: 0,
                last_row: 0,
                last_col: 0,
            },
            MergedRange {
                first_row: 2,
                first_col: 0,
                last_row: 2,
                last_col: 1,
            },
        ]);

        let dir = TempDir::new().unwrap();
        let path = dir.path().join("out.xlsx");

        save_workbook(&Workbook::new(vec![sheet]), &path).unwrap();

        // Only the real range survives the round trip.
        let reloaded = open_workbook(&path).unwrap();
        let merges = reloaded.sheet("s").unwrap().layout.merged_ranges.clone();
        assert_eq!(
            merges,
            Some(vec![MergedRange {
                first_row: 2,
                first_col: 0,
                last_row: 2,
                last_col: 1,
            }])
        );
    }
}
