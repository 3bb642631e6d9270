use crate::chart::ChartSpec;
use crate::excel::Cell;

/// One worksheet: a 1-indexed cell grid (row 0 and column 0 are unused
/// padding) plus optional layout metadata and attached chart drawings.
#[derive(Clone, Debug)]
pub struct Sheet {
    pub name: String,
    pub data: Vec<Vec<Cell>>,
    pub max_rows: usize,
    pub max_cols: usize,
    pub layout: SheetLayout,
    pub charts: Vec<ChartSpec>,
}

/// Layout metadata read from the worksheet XML. Each field is present only
/// when the source sheet actually defines it, so copy logic can move whole
/// fields without ad-hoc existence checks.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SheetLayout {
    pub column_widths: Option<Vec<ColumnSpan>>,
    pub row_heights: Option<Vec<RowHeight>>,
    pub merged_ranges: Option<Vec<MergedRange>>,
}

/// A run of columns sharing one custom width. Zero-based, inclusive.
#[derive(Clone, Debug, PartialEq)]
pub struct ColumnSpan {
    pub first_col: u16,
    pub last_col: u16,
    pub width: f64,
}

/// A single row with a custom height. Zero-based.
#[derive(Clone, Debug, PartialEq)]
pub struct RowHeight {
    pub row: u32,
    pub height: f64,
}

/// A rectangular merged cell range. Zero-based, inclusive.
#[derive(Clone, Debug, PartialEq)]
pub struct MergedRange {
    pub first_row: u32,
    pub first_col: u16,
    pub last_row: u32,
    pub last_col: u16,
}

impl SheetLayout {
    pub fn is_empty(&self) -> bool {
        self.column_widths.is_none() && self.row_heights.is_none() && self.merged_ranges.is_none()
    }
}

impl Sheet {
    /// Build a grid-backed sheet from a sequence of rows. Rows may be ragged;
    /// shorter rows are right-padded with empty cells to the widest row.
    /// No layout metadata is attached.
    pub fn from_rows(name: &str, rows: Vec<Vec<Cell>>) -> Self {
        let max_rows = rows.len();
        let max_cols = rows.iter().map(Vec::len).max().unwrap_or(0);

        let mut data = vec![vec![Cell::empty(); max_cols + 1]; max_rows + 1];
        for (row_idx, row) in rows.into_iter().enumerate() {
            for (col_idx, cell) in row.into_iter().enumerate() {
                data[row_idx + 1][col_idx + 1] = cell;
            }
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
}
