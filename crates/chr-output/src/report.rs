//! JSON run report.

use std::path::Path;

use chrono::{DateTime, Utc};
use chr_core::RunReport;
use serde::Serialize;
use tracing::info;

use crate::atomic::write_atomic;
use crate::csv_writer::WriteSummary;
use crate::error::{OutputError, Result};

/// The document written by `--report-json`.
#[derive(Debug, Serialize)]
pub struct ReportDocument<'a> {
    pub generated_at: DateTime<Utc>,
    pub version: &'static str,
    pub dry_run: bool,
    /// Absent on dry runs.
    pub output: Option<&'a WriteSummary>,
    #[serde(flatten)]
    pub report: &'a RunReport,
}

impl<'a> ReportDocument<'a> {
    pub fn new(report: &'a RunReport, output: Option<&'a WriteSummary>) -> Self {
        Self {
            generated_at: Utc::now(),
            version: env!("CARGO_PKG_VERSION"),
            dry_run: output.is_none(),
            output,
            report,
        }
    }

    pub fn with_generated_at(mut self, generated_at: DateTime<Utc>) -> Self {
        self.generated_at = generated_at;
        self
    }
}

/// Writes the report as pretty-printed JSON.
pub fn write_report_json(path: &Path, document: &ReportDocument<'_>) -> Result<()> {
    let mut bytes = serde_json::to_vec_pretty(document).map_err(|source| OutputError::Json {
        path: path.to_path_buf(),
        source,
    })?;
    bytes.push(b'\n');
    write_atomic(path, &bytes)?;
    info!(path = %path.display(), "wrote run report");
    Ok(())
}
