use chr_model::SourceId;
use thiserror::Error;

use crate::normalization::YearError;

/// Fatal extraction errors. Per-row problems are counted, not raised.
#[derive(Debug, Error)]
pub enum TransformError {
    #[error("{source_id} source {origin} is missing required columns: {}", columns.join(", "))]
    MissingColumns {
        source_id: SourceId,
        origin: String,
        columns: Vec<String>,
    },

    #[error(transparent)]
    Year(#[from] YearError),
}

pub type Result<T> = std::result::Result<T, TransformError>;
