use std::path::PathBuf;

use chr_core::PipelineRun;
use chr_model::SourceId;
use chr_output::WriteSummary;

#[derive(Debug)]
pub struct RunResult {
    pub data_dir: PathBuf,
    pub run: PipelineRun,
    /// `None` on a dry run.
    pub written: Option<WriteSummary>,
    pub report_json: Option<PathBuf>,
}

/// Input files found for one source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceFiles {
    pub source: SourceId,
    pub files: Vec<DiscoveredFile>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiscoveredFile {
    pub path: PathBuf,
    /// For workbook sources: the file opens and holds the source's sheet.
    pub present: bool,
    pub release_year: Option<i32>,
    /// Data year from the release table; `None` for multi-year files or an
    /// unmapped release.
    pub data_year: Option<i32>,
}
