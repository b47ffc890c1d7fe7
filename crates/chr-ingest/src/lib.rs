//! Source reading for the county health pipeline.
//!
//! Loads CSV files and workbook sheets into row-oriented [`SourceTable`]s and
//! discovers the dated release files under the data directory.
//!
//! # Example
//!
//! ```ignore
//! use std::path::Path;
//! use chr_ingest::{DataLayout, TableOptions, read_csv_table, read_sheet_table};
//!
//! let layout = DataLayout::default();
//! let trends = read_csv_table(&layout.trends, TableOptions::default())?;
//!
//! // The workbook's true header is its second physical row.
//! let select = read_sheet_table(
//!     &layout.workbook,
//!     "Select Measure Data",
//!     TableOptions::with_header_row(1),
//! )?;
//! ```

mod csv;
mod discovery;
mod error;
mod table;
mod workbook;

// === Error Types ===
pub use error::{IngestError, Result};

// === Tables ===
pub use table::{SourceTable, TableOptions, normalize_cell, normalize_header};

// === Readers ===
pub use csv::read_csv_table;
pub use workbook::{list_sheets, read_sheet_table};

// === File Discovery ===
pub use discovery::{
    DEFAULT_DATA_DIR, DataLayout, OUTPUT_FILE_NAME, PLACES_PREFIX, ReleaseFile, TRENDS_FILE_NAME,
    WORKBOOK_FILE_NAME, discover_places_releases, list_csv_files, parse_places_release,
    parse_workbook_release,
};
