//! Error types for source ingestion.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while reading source files.
#[derive(Debug, Error)]
pub enum IngestError {
    // === File System Errors ===
    /// Directory not found or not readable.
    #[error("directory not found: {path}")]
    DirectoryNotFound { path: PathBuf },

    /// Input file not found.
    #[error("input file not found: {path}")]
    FileNotFound { path: PathBuf },

    /// Failed to read directory entries.
    #[error("failed to read directory {path}: {source}")]
    DirectoryRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Failed to read file.
    #[error("failed to read file {path}: {source}")]
    FileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // === Parsing Errors ===
    /// Malformed CSV record.
    #[error("failed to parse CSV {path}: {source}")]
    CsvParse {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    /// The file has fewer rows than the configured header offset.
    #[error("no header row at offset {header_row} in {path}")]
    NoHeaderRow { path: PathBuf, header_row: usize },

    // === Workbook Errors ===
    /// Workbook could not be opened.
    #[error("failed to open workbook {path}: {message}")]
    WorkbookOpen { path: PathBuf, message: String },

    /// Requested sheet is absent or unreadable.
    #[error("sheet '{sheet}' not readable in {path}: {message}")]
    SheetRead {
        path: PathBuf,
        sheet: String,
        message: String,
    },
}

/// Result type for ingestion operations.
pub type Result<T> = std::result::Result<T, IngestError>;

impl IngestError {
    /// Maps an I/O error on `path` to `FileNotFound` or `FileRead`.
    pub(crate) fn from_io(path: &std::path::Path, error: std::io::Error) -> Self {
        if error.kind() == std::io::ErrorKind::NotFound {
            IngestError::FileNotFound {
                path: path.to_path_buf(),
            }
        } else {
            IngestError::FileRead {
                path: path.to_path_buf(),
                source: error,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = IngestError::FileNotFound {
            path: PathBuf::from("data/chr_trends_csv_2025.csv"),
        };
        assert_eq!(
            err.to_string(),
            "input file not found: data/chr_trends_csv_2025.csv"
        );
    }

    #[test]
    fn test_from_io_not_found() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "gone");
        let err = IngestError::from_io(std::path::Path::new("x.csv"), io);
        assert!(matches!(err, IngestError::FileNotFound { .. }));
    }
}
