//! Configuration options for a pipeline run.

use serde::{Deserialize, Serialize};

use crate::{MetricSet, ModelError};

/// Inclusive range of calendar years kept in output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct YearBounds {
    pub min: i32,
    pub max: i32,
}

impl YearBounds {
    pub fn new(min: i32, max: i32) -> Result<Self, ModelError> {
        if min > max {
            return Err(ModelError::InvalidYearBounds { min, max });
        }
        Ok(Self { min, max })
    }

    pub fn contains(self, year: i32) -> bool {
        (self.min..=self.max).contains(&year)
    }
}

impl Default for YearBounds {
    fn default() -> Self {
        Self {
            min: 2014,
            max: 2024,
        }
    }
}

/// Mode for carrying snapshot-only metrics into other years.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BackfillPolicy {
    /// Snapshot values only appear in the snapshot's own year.
    Off,
    /// Snapshot values fill gaps in every other year of the same county.
    #[default]
    FillGaps,
}

/// Options controlling pipeline behavior.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineOptions {
    /// Years outside this range are dropped.
    pub year_bounds: YearBounds,

    /// Minimum populated metrics for a (county, year) row to be written.
    ///
    /// Groups below the threshold are counted and skipped.
    pub min_metrics: usize,

    pub backfill: BackfillPolicy,

    /// Output columns: the core eleven metrics or the full vocabulary.
    pub metric_set: MetricSet,
}

impl Default for PipelineOptions {
    fn default() -> Self {
        Self {
            year_bounds: YearBounds::default(),
            min_metrics: 1,
            backfill: BackfillPolicy::default(),
            metric_set: MetricSet::default(),
        }
    }
}

impl PipelineOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_year_bounds(mut self, bounds: YearBounds) -> Self {
        self.year_bounds = bounds;
        self
    }

    pub fn with_min_metrics(mut self, min_metrics: usize) -> Self {
        self.min_metrics = min_metrics;
        self
    }

    pub fn with_backfill(mut self, backfill: BackfillPolicy) -> Self {
        self.backfill = backfill;
        self
    }

    pub fn with_metric_set(mut self, metric_set: MetricSet) -> Self {
        self.metric_set = metric_set;
        self
    }
}
