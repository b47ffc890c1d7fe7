//! Spreadsheet sheet reading.
//!
//! Workbook parsing is delegated to `calamine`; this module only turns one
//! sheet into a [`SourceTable`] so it flows through the same path as CSV.

use std::path::Path;

use calamine::{Data, Reader, open_workbook_auto};

use crate::error::{IngestError, Result};
use crate::table::{SourceTable, TableOptions, table_from_rows};

fn cell_to_string(cell: &Data) -> String {
    match cell {
        Data::Empty | Data::Error(_) => String::new(),
        Data::String(value) => value.clone(),
        // Integral floats render without a fractional part ("1073").
        Data::Float(value) => value.to_string(),
        Data::Int(value) => value.to_string(),
        Data::Bool(value) => value.to_string(),
        other => other.to_string(),
    }
}

fn ensure_exists(path: &Path) -> Result<()> {
    std::fs::metadata(path)
        .map(|_| ())
        .map_err(|e| IngestError::from_io(path, e))
}

/// Names of all sheets in the workbook, in workbook order.
pub fn list_sheets(path: &Path) -> Result<Vec<String>> {
    ensure_exists(path)?;
    let workbook = open_workbook_auto(path).map_err(|e| IngestError::WorkbookOpen {
        path: path.to_path_buf(),
        message: e.to_string(),
    })?;
    Ok(workbook.sheet_names())
}

/// Reads one sheet into a [`SourceTable`].
///
/// `options.header_row` counts physical sheet rows, so leading rows that the
/// sheet's used range does not cover are taken into account.
pub fn read_sheet_table(path: &Path, sheet: &str, options: TableOptions) -> Result<SourceTable> {
    ensure_exists(path)?;
    let mut workbook = open_workbook_auto(path).map_err(|e| IngestError::WorkbookOpen {
        path: path.to_path_buf(),
        message: e.to_string(),
    })?;
    let range = workbook
        .worksheet_range(sheet)
        .map_err(|e| IngestError::SheetRead {
            path: path.to_path_buf(),
            sheet: sheet.to_string(),
            message: e.to_string(),
        })?;

    let first_row = range.start().map(|(row, _)| row as usize).unwrap_or(0);
    let relative = TableOptions::with_header_row(options.header_row.saturating_sub(first_row));
    let rows = range
        .rows()
        .map(|row| row.iter().map(cell_to_string).collect::<Vec<_>>());

    let origin = format!("{}#{}", path.display(), sheet);
    let table = table_from_rows(origin, rows, relative).ok_or_else(|| IngestError::NoHeaderRow {
        path: path.to_path_buf(),
        header_row: options.header_row,
    })?;
    tracing::debug!(
        path = %path.display(),
        sheet,
        columns = table.headers.len(),
        rows = table.len(),
        "read workbook sheet"
    );
    Ok(table)
}
