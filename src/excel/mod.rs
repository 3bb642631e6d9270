mod cell;
mod layout;
mod sheet;
mod workbook;
mod writer;

pub use cell::{Cell, CellType, DataTypeInfo};
pub use sheet::{ColumnSpan, MergedRange, RowHeight, Sheet, SheetLayout};
pub use workbook::{Workbook, open_workbook};
pub use writer::save_workbook;
