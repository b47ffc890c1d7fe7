use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::{CountyFips, Metric, MetricValue, SourceId};

/// Reference data for one county, captured once per run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CountyRecord {
    pub fips: CountyFips,
    pub county: String,
    pub state: String,
    pub state_abbr: Option<String>,
}

/// One metric reading for a county and year from one source.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricObservation {
    pub fips: CountyFips,
    pub year: i32,
    pub metric: Metric,
    pub value: MetricValue,
    pub source: SourceId,
}

/// A single output row: one county in one year.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CanonicalRow {
    pub fips: CountyFips,
    pub county: String,
    pub state: String,
    pub year: i32,
    pub values: BTreeMap<Metric, MetricValue>,
}

impl CanonicalRow {
    pub fn new(fips: CountyFips, county: String, state: String, year: i32) -> Self {
        Self {
            fips,
            county,
            state,
            year,
            values: BTreeMap::new(),
        }
    }

    /// Value for `metric`, `Missing` when the row has none.
    pub fn value(&self, metric: Metric) -> MetricValue {
        self.values.get(&metric).copied().unwrap_or_default()
    }
}
