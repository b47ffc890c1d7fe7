//! Merging and orchestration for the county health pipeline.
//!
//! [`run_pipeline`] reads every configured source, joins counties through the
//! [`CountyDirectory`], merges observations by source priority and returns the
//! canonical rows with a [`RunReport`].

pub mod directory;
pub mod error;
pub mod merge;
pub mod pipeline;
pub mod report;

pub use directory::{CountyDirectory, KeyLookup};
pub use error::{PipelineError, Result};
pub use merge::{MergeOutcome, MergeStats, Merger};
pub use pipeline::{InputPaths, PipelineContext, PipelineRun, run_pipeline};
pub use report::{
    MetricCoverage, RunReport, SourceReport, SourceStatus, counties_per_year, metric_coverage,
};
