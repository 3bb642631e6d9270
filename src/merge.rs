use crate::chart::ChartSpec;
use crate::excel::{Cell, Sheet, Workbook};

/// Header-less raw extraction: every grid row, including anything that looks
/// like a header, comes back as data in display-string form. Extraction
/// starts at the first populated row, so content below the top of the sheet
/// gains no leading blank rows; blank rows between populated ones are kept.
/// Never returns an empty sequence; a sheet with no content yields one
/// empty row.
pub fn extract_rows(sheet: &Sheet) -> Vec<Vec<Cell>> {
    let first_used = (1..=sheet.max_rows)
        .find(|&row| sheet.data[row][1..=sheet.max_cols].iter().any(|c| !c.is_empty()));

    let Some(first_used) = first_used else {
        return vec![Vec::new()];
    };

    let mut rows = Vec::with_capacity(sheet.max_rows - first_used + 1);
    for row in first_used..=sheet.max_rows {
        rows.push(sheet.data[row][1..=sheet.max_cols].to_vec());
    }

    rows
}

/// Concatenate the financial rows, one empty separator row, and the depot
/// rows. No deduplication and no column reconciliation: row sets with
/// different widths simply produce ragged output.
pub fn merge_rows(financial_rows: Vec<Vec<Cell>>, depot_rows: Vec<Vec<Cell>>) -> Vec<Vec<Cell>> {
    let mut combined = financial_rows;
    combined.push(Vec::new());
    combined.extend(depot_rows);
    combined
}

/// Build a grid-backed sheet from the combined rows, with no layout
/// metadata attached.
pub fn build_sheet(name: &str, rows: Vec<Vec<Cell>>) -> Sheet {
    Sheet::from_rows(name, rows)
}

/// Append a chart drawing to the sheet, anchored at the given row.
pub fn attach_chart(sheet: &mut Sheet, mut spec: ChartSpec, anchor_row: u32) {
    spec.anchor_row = anchor_row;
    sheet.charts.push(spec);
}

/// Copy layout metadata wholesale from one sheet onto another. Each field
/// present on the source replaces the target's field; fields absent on the
/// source leave the target untouched. Ranges are never revalidated against
/// the target's row count.
pub fn copy_formatting(source: &Sheet, target: &mut Sheet) {
    if let Some(widths) = &source.layout.column_widths {
        target.layout.column_widths = Some(widths.clone());
    }
    if let Some(heights) = &source.layout.row_heights {
        target.layout.row_heights = Some(heights.clone());
    }
    if let Some(merges) = &source.layout.merged_ranges {
        target.layout.merged_ranges = Some(merges.clone());
    }
}

/// Assemble the output workbook: the merged sheet first, then every other
/// original sheet in original order. The original sheet sharing the merged
/// sheet's name is replaced, not duplicated, so the output carries exactly
/// one sheet per distinct source name.
pub fn assemble_output(original: Workbook, merged: Sheet) -> Workbook {
    let merged_name = merged.name.clone();

    let mut sheets = vec![merged];
    for sheet in original.into_sheets() {
        if sheet.name != merged_name {
            sheets.push(sheet);
        }
    }

    Workbook::new(sheets)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chart::depot_status_chart;
    use crate::excel::{ColumnSpan, MergedRange, RowHeight};

    fn sheet_of(name: &str, rows: &[&[&str]]) -> Sheet {
        let rows = rows
            .iter()
            .map(|row| row.iter().map(|v| Cell::text(*v)).collect())
            .collect();
        Sheet::from_rows(name, rows)
    }

    fn values(rows: &[Vec<Cell>]) -> Vec<Vec<String>> {
        rows.iter()
            .map(|row| row.iter().map(|c| c.value.clone()).collect())
            .collect()
    }

    #[test]
    fn merge_rows_count_and_separator() {
        let financial = extract_rows(&sheet_of("fin", &[&["A"], &["B"], &["C"]]));
        let depot = extract_rows(&sheet_of("dep", &[&["X"], &["Y"]]));
        let fin_len = financial.len();

        let combined = merge_rows(financial, depot);

        assert_eq!(combined.len(), 3 + 1 + 2);
        assert_eq!(
            values(&combined),
            vec![
                vec!["A".to_string()],
                vec!["B".to_string()],
                vec!["C".to_string()],
                vec![],
                vec!["X".to_string()],
                vec!["Y".to_string()],
            ]
        );
        assert!(combined[fin_len].is_empty());
    }

    #[test]
    fn merge_rows_tolerates_ragged_widths() {
        let financial = extract_rows(&sheet_of("fin", &[&["a", "b", "c"]]));
        let depot = extract_rows(&sheet_of("dep", &[&["x"]]));

        let combined = merge_rows(financial, depot);

        assert_eq!(combined[0].len(), 3);
        assert_eq!(combined[2].len(), 1);

        let sheet = build_sheet("out", combined);
        assert_eq!(sheet.max_rows, 3);
        assert_eq!(sheet.max_cols, 3);
        // Shorter rows are right-padded with empty cells in the grid.
        assert!(sheet.data[3][2].is_empty());
    }

    #[test]
    fn extract_rows_never_empty_for_empty_sheet() {
        let empty = Sheet::from_rows("empty", Vec::new());
        let rows = extract_rows(&empty);
        assert_eq!(rows.len(), 1);
        assert!(rows[0].is_empty());
    }

    #[test]
    fn extract_rows_drops_leading_blank_rows_only() {
        let sheet = sheet_of("s", &[&[], &[], &["X"], &[], &["Y"]]);
        let rows = extract_rows(&sheet);
        assert_eq!(
            values(&rows),
            vec![
                vec!["X".to_string()],
                vec!["".to_string()],
                vec!["Y".to_string()],
            ]
        );
    }

    #[test]
    fn extract_rows_returns_headers_as_data() {
        let sheet = sheet_of("s", &[&["Header", "Col"], &["1", "2"]]);
        let rows = extract_rows(&sheet);
        assert_eq!(
            values(&rows),
            vec![
                vec!["Header".to_string(), "Col".to_string()],
                vec!["1".to_string(), "2".to_string()],
            ]
        );
    }

    #[test]
    fn attach_chart_anchors_below_data() {
        let mut sheet = sheet_of("s", &[&["A"], &["B"]]);
        let anchor = sheet.max_rows as u32 + 2;

        attach_chart(&mut sheet, depot_status_chart(), anchor);

        assert_eq!(sheet.charts.len(), 1);
        assert_eq!(sheet.charts[0].anchor_row, 4);
    }

    #[test]
    fn copy_formatting_moves_present_fields_only() {
        let mut source = sheet_of("src", &[&["x"]]);
        source.layout.column_widths = Some(vec![ColumnSpan {
            first_col: 0,
            last_col: 2,
            width: 20.0,
        }]);
        source.layout.merged_ranges = Some(vec![MergedRange {
            first_row: 0,
            first_col: 0,
            last_row: 0,
            last_col: 1,
        }]);

        let mut target = sheet_of("dst", &[&["y"]]);
        target.layout.row_heights = Some(vec![RowHeight {
            row: 0,
            height: 12.0,
        }]);
        target.layout.column_widths = Some(vec![ColumnSpan {
            first_col: 0,
            last_col: 0,
            width: 5.0,
        }]);

        copy_formatting(&source, &mut target);

        // Present source fields replace the target's wholesale.
        assert_eq!(target.layout.column_widths, source.layout.column_widths);
        assert_eq!(target.layout.merged_ranges, source.layout.merged_ranges);
        // Absent source fields leave the target untouched.
        assert_eq!(
            target.layout.row_heights,
            Some(vec![RowHeight {
                row: 0,
                height: 12.0,
            }])
        );
    }

    #[test]
    fn assemble_output_substitutes_merged_sheet() {
        let original = Workbook::new(vec![
            sheet_of("Depot", &[&["X"]]),
            sheet_of("Financial", &[&["A"]]),
            sheet_of("Other", &[&["O"]]),
        ]);
        let merged = sheet_of("Financial", &[&["A"], &[], &["X"]]);

        let output = assemble_output(original, merged);

        assert_eq!(output.sheet_names(), vec!["Financial", "Depot", "Other"]);
        assert_eq!(output.sheets().len(), 3);
        assert_eq!(output.sheet("Financial").unwrap().max_rows, 3);
        // Passed-through sheets keep their content untouched.
        assert_eq!(output.sheet("Other").unwrap().data[1][1].value, "O");
    }
}
