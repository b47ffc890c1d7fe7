//! CSV file reading with explicit header row configuration.

use std::path::Path;

use csv::{ByteRecord, ReaderBuilder};

use crate::error::{IngestError, Result};
use crate::table::{SourceTable, TableOptions, table_from_rows};

fn open_reader(path: &Path) -> Result<csv::Reader<std::fs::File>> {
    let file = std::fs::File::open(path).map_err(|e| IngestError::from_io(path, e))?;
    Ok(ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(file))
}

/// Invalid UTF-8 bytes become U+FFFD instead of failing the file.
fn record_to_row(record: &ByteRecord) -> Vec<String> {
    record
        .iter()
        .map(|field| String::from_utf8_lossy(field).into_owned())
        .collect()
}

/// Reads a whole CSV file into a [`SourceTable`].
///
/// - `header_row = 0`: the first physical row holds column names
/// - `header_row = n`: `n` leading rows (titles, label rows) are skipped
///
/// Fields are decoded leniently; stray non-UTF-8 bytes never abort a run.
pub fn read_csv_table(path: &Path, options: TableOptions) -> Result<SourceTable> {
    let mut reader = open_reader(path)?;
    let mut raw_rows = Vec::new();
    for record in reader.byte_records() {
        let record = record.map_err(|source| IngestError::CsvParse {
            path: path.to_path_buf(),
            source,
        })?;
        raw_rows.push(record_to_row(&record));
    }
    let table = table_from_rows(path.display().to_string(), raw_rows, options).ok_or_else(
        || IngestError::NoHeaderRow {
            path: path.to_path_buf(),
            header_row: options.header_row,
        },
    )?;
    tracing::debug!(
        path = %path.display(),
        columns = table.headers.len(),
        rows = table.len(),
        "read csv table"
    );
    Ok(table)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn create_temp_csv(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, "{}", content).unwrap();
        file
    }

    fn create_temp_bytes(content: &[u8]) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(content).unwrap();
        file
    }

    #[test]
    fn test_read_csv_table_with_bom() {
        let file = create_temp_csv("\u{feff}A,B,C\n1,2,3\n");
        let table = read_csv_table(file.path(), TableOptions::default()).unwrap();
        assert_eq!(table.headers, vec!["A", "B", "C"]);
    }

    #[test]
    fn test_read_csv_table_empty_file() {
        let file = create_temp_csv("");
        let result = read_csv_table(file.path(), TableOptions::default());
        assert!(matches!(result, Err(IngestError::NoHeaderRow { .. })));
    }

    #[test]
    fn test_read_csv_table_latin1_bytes_are_replaced() {
        // "Doña Ana" written as Latin-1.
        let file = create_temp_bytes(b"county,rawvalue\nDo\xf1a Ana,75.1\nOtero,74.0\n");
        let table = read_csv_table(file.path(), TableOptions::default()).unwrap();
        assert_eq!(table.len(), 2);
        assert_eq!(table.rows[0][0], "Do\u{fffd}a Ana");
        assert_eq!(table.rows[0][1], "75.1");
        assert_eq!(table.rows[1][0], "Otero");
    }

    #[test]
    fn test_read_csv_table_quoted_fields() {
        let file = create_temp_csv(
            "Measure,Data_Value\n\"Obesity among adults\",\"33.5\"\n\"Binge drinking, adults\",15\n",
        );
        let table = read_csv_table(file.path(), TableOptions::default()).unwrap();
        assert_eq!(table.len(), 2);
        assert_eq!(table.rows[1][0], "Binge drinking, adults");
        assert_eq!(table.rows[0][1], "33.5");
    }

    #[test]
    fn test_read_csv_table_header_offset() {
        let file = create_temp_csv("Label A,Label B\nA,B\n1,2\n3,4\n");
        let table = read_csv_table(file.path(), TableOptions::with_header_row(1)).unwrap();
        assert_eq!(table.headers, vec!["A", "B"]);
        assert_eq!(table.len(), 2);
    }

    #[test]
    fn test_read_csv_table_missing_file() {
        let result = read_csv_table(Path::new("does/not/exist.csv"), TableOptions::default());
        assert!(matches!(result, Err(IngestError::FileNotFound { .. })));
    }
}
