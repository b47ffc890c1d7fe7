use thiserror::Error;

/// Errors raised when constructing model values.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ModelError {
    #[error("invalid county identifier '{0}': expected 5 ASCII digits")]
    InvalidFips(String),
    #[error("unknown metric key '{0}'")]
    UnknownMetric(String),
    #[error("invalid year bounds: {min} > {max}")]
    InvalidYearBounds { min: i32, max: i32 },
}

pub type Result<T> = std::result::Result<T, ModelError>;
