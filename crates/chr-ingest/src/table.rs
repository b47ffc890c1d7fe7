//! Row-oriented tabular data shared by the CSV and workbook readers.

use std::fmt;

/// Where the true header row sits in a physical file.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TableOptions {
    /// Number of physical rows preceding the header (0 = first row).
    pub header_row: usize,
}

impl TableOptions {
    pub fn with_header_row(header_row: usize) -> Self {
        Self { header_row }
    }
}

/// A source table: trimmed headers and string cells, one `Vec` per row.
///
/// Rows are padded or truncated to the header width, so `row[idx]` is valid
/// for every header index.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SourceTable {
    /// Human-readable origin, e.g. a file path or `file.xlsx#Sheet`.
    pub origin: String,
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl SourceTable {
    pub fn new(origin: impl Into<String>, headers: Vec<String>) -> Self {
        Self {
            origin: origin.into(),
            headers,
            rows: Vec::new(),
        }
    }

    /// Appends a row, padding short rows with empty cells.
    pub fn push_row(&mut self, mut row: Vec<String>) {
        row.resize(self.headers.len(), String::new());
        self.rows.push(row);
    }

    /// Index of the first header equal to `name`, ignoring ASCII case.
    pub fn column_index(&self, name: &str) -> Option<usize> {
        let name = name.trim();
        self.headers
            .iter()
            .position(|header| header.eq_ignore_ascii_case(name))
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.column_index(name).is_some()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

impl fmt::Display for SourceTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} ({} columns, {} rows)",
            self.origin,
            self.headers.len(),
            self.rows.len()
        )
    }
}

/// Trims whitespace and a stray byte-order mark, and collapses inner runs of
/// whitespace to one space.
pub fn normalize_header(raw: &str) -> String {
    let trimmed = raw.trim().trim_matches('\u{feff}');
    trimmed.split_whitespace().collect::<Vec<_>>().join(" ")
}

pub fn normalize_cell(raw: &str) -> String {
    raw.trim().trim_matches('\u{feff}').to_string()
}

/// Builds a table from physical rows, honoring the header offset.
///
/// Blank rows after the header are skipped.
pub(crate) fn table_from_rows<I>(
    origin: String,
    rows: I,
    options: TableOptions,
) -> Option<SourceTable>
where
    I: IntoIterator<Item = Vec<String>>,
{
    let mut rows = rows.into_iter().skip(options.header_row);
    let header = rows.next()?;
    let headers = header.iter().map(|value| normalize_header(value)).collect();
    let mut table = SourceTable::new(origin, headers);
    for row in rows {
        if row.iter().all(|value| value.trim().is_empty()) {
            continue;
        }
        table.push_row(row.iter().map(|value| normalize_cell(value)).collect());
    }
    Some(table)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strings(values: &[&str]) -> Vec<String> {
        values.iter().map(|value| (*value).to_string()).collect()
    }

    #[test]
    fn test_normalize_header() {
        assert_eq!(normalize_header("  % Adults   with Obesity "), "% Adults with Obesity");
        assert_eq!(normalize_header("\u{feff}FIPS"), "FIPS");
    }

    #[test]
    fn test_header_offset_skips_title_row() {
        let rows = vec![
            strings(&["Title", "", ""]),
            strings(&["FIPS", "State", "County"]),
            strings(&["01073", "Alabama", "Jefferson"]),
            strings(&["", "", ""]),
            strings(&["01001", "Alabama"]),
        ];
        let table =
            table_from_rows("t".to_string(), rows, TableOptions::with_header_row(1)).unwrap();
        assert_eq!(table.headers, vec!["FIPS", "State", "County"]);
        assert_eq!(table.len(), 2);
        assert_eq!(table.rows[1], vec!["01001", "Alabama", ""]);
    }

    #[test]
    fn test_missing_header_row() {
        let rows = vec![strings(&["only"])];
        assert!(table_from_rows("t".to_string(), rows, TableOptions::with_header_row(3)).is_none());
    }

    #[test]
    fn test_column_index_ignores_case() {
        let table = SourceTable::new("t", strings(&["Measure", "Data_Value"]));
        assert_eq!(table.column_index("data_value"), Some(1));
        assert!(!table.has_column("LocationID"));
    }
}
