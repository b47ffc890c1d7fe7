use std::path::PathBuf;

use chr_ingest::IngestError;
use chr_transform::{TransformError, YearError};
use thiserror::Error;

/// Errors that abort a pipeline run.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("required input not found: {path}")]
    MissingInput { path: PathBuf },

    #[error("cannot determine the release year from workbook name {path}")]
    WorkbookRelease { path: PathBuf },

    #[error(transparent)]
    Ingest(#[from] IngestError),

    #[error(transparent)]
    Transform(#[from] TransformError),

    #[error(transparent)]
    Year(#[from] YearError),
}

pub type Result<T> = std::result::Result<T, PipelineError>;
