//! Normalization and extraction for the county health pipeline.
//!
//! # Overview
//!
//! - **Identifier normalization**: direct codes, split state/county codes and
//!   name/state composite keys
//! - **Metric mapping**: fixed per-source label tables and numeric coercion
//! - **Year resolution**: span midpoints and the release → data-year table
//! - **Extraction**: one shared path driven by a [`SourceSchema`]
//!
//! # Example
//!
//! ```ignore
//! use chr_ingest::{TableOptions, read_csv_table};
//! use chr_model::YearBounds;
//! use chr_transform::{SourceSchema, extract};
//!
//! let schema = SourceSchema::chr_trends();
//! let table = read_csv_table(path, TableOptions::with_header_row(schema.header_row))?;
//! let outcome = extract(&table, &schema, YearBounds::default())?;
//! println!("{} observations", outcome.observations.len());
//! ```

mod error;
mod extract;
mod schema;

pub mod mapping;
pub mod normalization;

// Error type
pub use error::{Result, TransformError};

// Source descriptors
pub use schema::{
    ADDITIONAL_SHEET, IdentifierStrategy, Layout, SELECT_SHEET, SourceSchema, YearRule,
};

// Extraction
pub use extract::{ExtractOutcome, KeyedObservation, SourceStats, extract};

// Normalization
pub use normalization::{
    IdentifierError, NumericError, ReleaseTable, YearError, county_key, normalize_fips,
    normalize_split_fips, parse_metric_value, parse_numeric, parse_year_label,
};
