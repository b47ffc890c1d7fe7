//! Output generation: canonical CSV and JSON run report.
//!
//! Both files are written through a temp file in the destination directory
//! and persisted over the target, so a failed run never leaves a partial
//! file behind.

mod atomic;
mod csv_writer;
mod error;
mod report;

pub use atomic::{sha256_hex, write_atomic};
pub use csv_writer::{
    ID_COLUMNS, WriteSummary, canonical_header, render_csv, write_canonical_csv,
};
pub use error::{OutputError, Result};
pub use report::{ReportDocument, write_report_json};
