use anyhow::{Context, Result};
use calamine::{Data, Reader, open_workbook_auto};
use std::path::Path;

use crate::excel::layout::read_sheet_layouts;
use crate::excel::{Cell, CellType, DataTypeInfo, Sheet, SheetLayout};
use crate::utils::helpers::excel_date_to_iso_string;

/// An in-memory workbook: an ordered collection of uniquely named sheets.
#[derive(Clone, Debug)]
pub struct Workbook {
    sheets: Vec<Sheet>,
}

/// Load a workbook from disk. Every sheet is parsed eagerly: cell values
/// (dates rendered as ISO display strings), formulas, and — for xlsx
/// containers — the per-sheet layout metadata (column widths, row heights,
/// merged ranges).
pub fn open_workbook<P: AsRef<Path>>(path: P) -> Result<Workbook> {
    let path_ref = path.as_ref();

    let mut workbook = open_workbook_auto(path_ref)
        .with_context(|| format!("Unable to parse Excel file: {}", path_ref.display()))?;

    // Layout lives in the worksheet XML, which calamine does not expose;
    // read it in a separate pass over the zip container. Only zip-based
    // formats carry it.
    let extension = path_ref
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_lowercase());
    let mut layouts = if matches!(extension.as_deref(), Some("xlsx") | Some("xlsm")) {
        read_sheet_layouts(path_ref)?
    } else {
        Default::default()
    };

    let sheet_names = workbook.sheet_names().to_vec();
    let mut sheets = Vec::with_capacity(sheet_names.len());

    for name in &sheet_names {
        let range = workbook
            .worksheet_range(name)
            .with_context(|| format!("Unable to read worksheet: {name}"))?;

        let mut sheet = create_sheet_from_range(name, range);

        if let Ok(formulas) = workbook.worksheet_formula(name) {
            overlay_formulas(&mut sheet, &formulas);
        }

        if let Some(layout) = layouts.remove(name) {
            sheet.layout = layout;
        }

        sheets.push(sheet);
    }

    if sheets.is_empty() {
        anyhow::bail!("No worksheets found in file");
    }

    Ok(Workbook { sheets })
}

fn create_sheet_from_range(name: &str, range: calamine::Range<Data>) -> Sheet {
    let (height, width) = range.get_size();
    let (start_row, start_col) = range
        .start()
        .map(|(r, c)| (r as usize, c as usize))
        .unwrap_or((0, 0));

    let max_rows = start_row + height;
    let max_cols = start_col + width;

    // 1-indexed grid, row 0 / column 0 unused. Offsetting by the range start
    // keeps grid coordinates absolute so layout metadata lines up.
    let mut data = vec![vec![Cell::empty(); max_cols + 1]; max_rows + 1];

    for (row_idx, col_idx, cell) in range.used_cells() {
        let (value, cell_type, original_type) = match cell {
            Data::Empty => (String::new(), CellType::Empty, Some(DataTypeInfo::Empty)),

            Data::String(s) => (s.clone(), CellType::Text, Some(DataTypeInfo::String)),

            Data::Float(f) => {
                let value = if *f == (*f as i64) as f64 && f.abs() < 1e10 {
                    (*f as i64).to_string()
                } else {
                    f.to_string()
                };
                (value, CellType::Number, Some(DataTypeInfo::Float(*f)))
            }

            Data::Int(i) => (i.to_string(), CellType::Number, Some(DataTypeInfo::Int(*i))),

            Data::Bool(b) => (
                if *b {
                    "TRUE".to_string()
                } else {
                    "FALSE".to_string()
                },
                CellType::Boolean,
                Some(DataTypeInfo::Bool(*b)),
            ),

            Data::Error(e) => (
                format!("Error: {e:?}"),
                CellType::Text,
                Some(DataTypeInfo::Error),
            ),

            Data::DateTime(dt) => (
                excel_date_to_iso_string(dt.as_f64()),
                CellType::Date,
                Some(DataTypeInfo::DateTime(dt.as_f64())),
            ),

            Data::DateTimeIso(s) => (
                s.clone(),
                CellType::Date,
                Some(DataTypeInfo::DateTimeIso(s.clone())),
            ),

            Data::DurationIso(s) => (
                s.clone(),
                CellType::Text,
                Some(DataTypeInfo::DurationIso(s.clone())),
            ),
        };

        let is_formula = !value.is_empty() && value.starts_with('=');

        data[start_row + row_idx + 1][start_col + col_idx + 1] =
            Cell::new_with_type(value, is_formula, cell_type, original_type);
    }

    Sheet {
        name: name.to_string(),
        data,
        max_rows,
        max_cols,
        layout: SheetLayout::default(),
        charts: Vec::new(),
    }
}

/// Replace computed values with their formula text where the worksheet
/// defines one, so formulas survive the round trip to the output file.
fn overlay_formulas(sheet: &mut Sheet, formulas: &calamine::Range<String>) {
    let (start_row, start_col) = formulas
        .start()
        .map(|(r, c)| (r as usize, c as usize))
        .unwrap_or((0, 0));

    for (row_idx, col_idx, formula) in formulas.used_cells() {
        if formula.is_empty() {
            continue;
        }
        let row = start_row + row_idx + 1;
        let col = start_col + col_idx + 1;
        if row >= sheet.data.len() || col >= sheet.data[0].len() {
            continue;
        }

        let value = if formula.starts_with('=') {
            formula.clone()
        } else {
            format!("={formula}")
        };
        let cell_type = sheet.data[row][col].cell_type;
        let original_type = sheet.data[row][col].original_type.clone();
        sheet.data[row][col] = Cell::new_with_type(value, true, cell_type, original_type);
    }
}

impl Workbook {
    pub fn new(sheets: Vec<Sheet>) -> Self {
        Workbook { sheets }
    }

    pub fn sheets(&self) -> &[Sheet] {
        &self.sheets
    }

    pub fn into_sheets(self) -> Vec<Sheet> {
        self.sheets
    }

    /// Look up a sheet by exact name. Incidental leading or trailing
    /// whitespace in the stored name must match exactly.
    pub fn sheet(&self, name: &str) -> Option<&Sheet> {
        self.sheets.iter().find(|s| s.name == name)
    }

    pub fn sheet_names(&self) -> Vec<String> {
        self.sheets.iter().map(|s| s.name.clone()).collect()
    }
}
