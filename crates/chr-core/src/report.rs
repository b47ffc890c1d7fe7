//! Run report: per-source counters, merge counters and output coverage.

use std::collections::BTreeMap;
use std::path::PathBuf;

use chr_model::{CanonicalRow, Metric, MetricSet, PipelineOptions, SourceId};
use chr_transform::SourceStats;
use serde::Serialize;

use crate::merge::MergeStats;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum SourceStatus {
    Loaded,
    Skipped { reason: String },
}

#[derive(Debug, Clone, Serialize)]
pub struct SourceReport {
    pub source: SourceId,
    pub files: Vec<PathBuf>,
    #[serde(flatten)]
    pub status: SourceStatus,
    pub stats: SourceStats,
}

impl SourceReport {
    pub fn skipped(source: SourceId, files: Vec<PathBuf>, reason: impl Into<String>) -> Self {
        Self {
            source,
            files,
            status: SourceStatus::Skipped {
                reason: reason.into(),
            },
            stats: SourceStats::default(),
        }
    }

    pub fn is_loaded(&self) -> bool {
        self.status == SourceStatus::Loaded
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MetricCoverage {
    pub metric: Metric,
    pub populated: usize,
    /// Share of output rows with a value, 0-100.
    pub percent: f64,
}

/// Everything a run reports, in terminal and JSON form.
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub options: PipelineOptions,
    /// Counties known to the directory.
    pub counties: usize,
    pub sources: Vec<SourceReport>,
    pub merge: MergeStats,
    pub rows: usize,
    pub coverage: Vec<MetricCoverage>,
    pub counties_per_year: BTreeMap<i32, usize>,
}

impl RunReport {
    pub fn source(&self, source: SourceId) -> Option<&SourceReport> {
        self.sources.iter().find(|report| report.source == source)
    }
}

/// Populated share of each output metric.
pub fn metric_coverage(rows: &[CanonicalRow], metric_set: MetricSet) -> Vec<MetricCoverage> {
    Metric::columns(metric_set)
        .iter()
        .map(|&metric| {
            let populated = rows
                .iter()
                .filter(|row| row.value(metric).is_present())
                .count();
            let percent = if rows.is_empty() {
                0.0
            } else {
                populated as f64 * 100.0 / rows.len() as f64
            };
            MetricCoverage {
                metric,
                populated,
                percent,
            }
        })
        .collect()
}

/// Distinct counties written per year.
pub fn counties_per_year(rows: &[CanonicalRow]) -> BTreeMap<i32, usize> {
    let mut counts = BTreeMap::new();
    for row in rows {
        *counts.entry(row.year).or_insert(0) += 1;
    }
    counts
}

#[cfg(test)]
mod tests {
    use super::*;
    use chr_model::{CountyFips, MetricValue};

    fn row(fips: &str, year: i32, values: &[(Metric, f64)]) -> CanonicalRow {
        let mut row = CanonicalRow::new(
            CountyFips::new(fips).unwrap(),
            String::new(),
            String::new(),
            year,
        );
        for (metric, value) in values {
            row.values.insert(*metric, MetricValue::Value(*value));
        }
        row
    }

    #[test]
    fn coverage_and_year_counts() {
        let rows = vec![
            row("01073", 2019, &[(Metric::LifeExpectancy, 75.4)]),
            row("01089", 2019, &[(Metric::Diabetes, 11.0)]),
            row("01073", 2020, &[(Metric::LifeExpectancy, 75.1)]),
            row("01089", 2020, &[]),
        ];
        let coverage = metric_coverage(&rows, MetricSet::Core);
        assert_eq!(coverage.len(), Metric::CORE_LEN);
        assert_eq!(coverage[0].metric, Metric::LifeExpectancy);
        assert_eq!(coverage[0].populated, 2);
        assert!((coverage[0].percent - 50.0).abs() < f64::EPSILON);

        let per_year = counties_per_year(&rows);
        assert_eq!(per_year.get(&2019), Some(&2));
        assert_eq!(per_year.get(&2020), Some(&2));
    }

    #[test]
    fn empty_output_has_zero_coverage() {
        let coverage = metric_coverage(&[], MetricSet::Full);
        assert!(coverage.iter().all(|entry| entry.percent == 0.0));
    }

    #[test]
    fn skipped_source_serializes_reason() {
        let report = SourceReport::skipped(SourceId::ChrSelect, Vec::new(), "file not found");
        assert!(!report.is_loaded());
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["source"], "chr_select");
        assert_eq!(json["status"], "skipped");
        assert_eq!(json["reason"], "file not found");
        assert_eq!(json["stats"]["rows_read"], 0);
    }
}
