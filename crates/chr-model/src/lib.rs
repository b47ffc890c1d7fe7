//! Data model for the county health time-series pipeline.
//!
//! Shared by every stage: identifiers, the canonical metric vocabulary,
//! observations, canonical output rows, source identities and run options.

pub mod error;
pub mod ids;
pub mod metric;
pub mod options;
pub mod record;
pub mod source;
pub mod states;

pub use error::{ModelError, Result};
pub use ids::{CountyFips, CountyKey};
pub use metric::{Metric, MetricSet, MetricValue};
pub use options::{BackfillPolicy, PipelineOptions, YearBounds};
pub use record::{CanonicalRow, CountyRecord, MetricObservation};
pub use source::{SourceFamily, SourceId};
pub use states::{STATES, state_abbreviation, state_name};
