//! Cross-source merging into canonical rows.
//!
//! Observations are grouped by (county, year). Within a group each metric
//! keeps one value, chosen by [`SourceId`] priority; within one source the
//! first value in file order is kept.

use std::collections::BTreeMap;

use chr_model::{
    BackfillPolicy, CanonicalRow, CountyFips, Metric, MetricObservation, MetricValue,
    PipelineOptions, SourceId,
};
use serde::Serialize;
use tracing::debug;

use crate::directory::CountyDirectory;

/// Counters for the merge stage.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct MergeStats {
    pub observations: usize,
    /// (county, year) groups before the threshold.
    pub groups: usize,
    /// Later values from the same source for an already-filled cell.
    pub superseded: usize,
    /// Values discarded because a higher-priority source reported the cell.
    pub overridden: usize,
    /// Cells filled from the annual snapshot into other years.
    pub backfilled: usize,
    pub below_threshold: usize,
    pub aggregate_dropped: usize,
    /// Observations for metrics outside the selected output set.
    pub excluded_metric: usize,
    /// Rows written without a county record.
    pub unnamed_counties: usize,
    /// Final cell count per winning source (back-filled cells included).
    pub values_by_source: BTreeMap<SourceId, usize>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct Cell {
    value: f64,
    source: SourceId,
}

type Group = BTreeMap<Metric, Cell>;

#[derive(Debug)]
pub struct MergeOutcome {
    pub rows: Vec<CanonicalRow>,
    pub stats: MergeStats,
}

/// Accumulates observations from every source of a run.
#[derive(Debug)]
pub struct Merger {
    options: PipelineOptions,
    groups: BTreeMap<(CountyFips, i32), Group>,
    stats: MergeStats,
}

impl Merger {
    pub fn new(options: PipelineOptions) -> Self {
        Self {
            options,
            groups: BTreeMap::new(),
            stats: MergeStats::default(),
        }
    }

    pub fn add(&mut self, observation: MetricObservation) {
        self.stats.observations += 1;
        if observation.fips.is_aggregate() {
            self.stats.aggregate_dropped += 1;
            return;
        }
        if !Metric::columns(self.options.metric_set).contains(&observation.metric) {
            self.stats.excluded_metric += 1;
            return;
        }
        // Missing never displaces anything.
        let MetricValue::Value(value) = observation.value else {
            return;
        };

        let incoming = Cell {
            value,
            source: observation.source,
        };
        let group = self
            .groups
            .entry((observation.fips, observation.year))
            .or_default();
        match group.get_mut(&observation.metric) {
            None => {
                group.insert(observation.metric, incoming);
            }
            Some(existing) if existing.source == incoming.source => {
                self.stats.superseded += 1;
            }
            Some(existing) => {
                self.stats.overridden += 1;
                if incoming.source.rank() < existing.source.rank() {
                    *existing = incoming;
                }
            }
        }
    }

    pub fn extend(&mut self, observations: impl IntoIterator<Item = MetricObservation>) {
        for observation in observations {
            self.add(observation);
        }
    }

    /// Copies snapshot-only metrics into the county's other years.
    fn backfill(&mut self) {
        let mut snapshot: BTreeMap<CountyFips, BTreeMap<Metric, Cell>> = BTreeMap::new();
        for ((fips, _year), group) in &self.groups {
            for (metric, cell) in group {
                if !cell.source.is_snapshot() || !metric.is_snapshot_backfill() {
                    continue;
                }
                let county = snapshot.entry(fips.clone()).or_default();
                // Best-ranked snapshot wins; equal rank keeps the latest year.
                let replace = county
                    .get(metric)
                    .is_none_or(|current| cell.source.rank() <= current.source.rank());
                if replace {
                    county.insert(*metric, *cell);
                }
            }
        }

        for ((fips, _year), group) in &mut self.groups {
            let Some(values) = snapshot.get(fips) else {
                continue;
            };
            for (metric, cell) in values {
                if !group.contains_key(metric) {
                    group.insert(*metric, *cell);
                    self.stats.backfilled += 1;
                }
            }
        }
    }

    /// Applies back-fill and the threshold and builds the output rows in
    /// (county, year) order.
    pub fn finish(mut self, directory: &CountyDirectory) -> MergeOutcome {
        if self.options.backfill == BackfillPolicy::FillGaps {
            self.backfill();
        }

        let mut stats = self.stats;
        stats.groups = self.groups.len();
        let mut rows = Vec::with_capacity(self.groups.len());
        for ((fips, year), group) in self.groups {
            if group.len() < self.options.min_metrics {
                stats.below_threshold += 1;
                continue;
            }
            let (county, state) = match directory.get(&fips) {
                Some(record) => (record.county.clone(), record.state.clone()),
                None => {
                    stats.unnamed_counties += 1;
                    (String::new(), String::new())
                }
            };
            let mut row = CanonicalRow::new(fips, county, state, year);
            for (metric, cell) in group {
                *stats.values_by_source.entry(cell.source).or_default() += 1;
                row.values.insert(metric, MetricValue::Value(cell.value));
            }
            rows.push(row);
        }

        debug!(
            groups = stats.groups,
            rows = rows.len(),
            superseded = stats.superseded,
            overridden = stats.overridden,
            backfilled = stats.backfilled,
            below_threshold = stats.below_threshold,
            "merged observations"
        );
        MergeOutcome { rows, stats }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chr_model::{CountyRecord, MetricSet};
    use proptest::prelude::*;

    fn obs(
        fips: &str,
        year: i32,
        metric: Metric,
        value: f64,
        source: SourceId,
    ) -> MetricObservation {
        MetricObservation {
            fips: CountyFips::new(fips).unwrap(),
            year,
            metric,
            value: MetricValue::Value(value),
            source,
        }
    }

    fn merge(options: PipelineOptions, observations: Vec<MetricObservation>) -> MergeOutcome {
        let mut merger = Merger::new(options);
        merger.extend(observations);
        merger.finish(&CountyDirectory::new())
    }

    #[test]
    fn higher_priority_source_wins_in_any_order() {
        let a = obs("01073", 2022, Metric::AdultObesity, 34.0, SourceId::Places);
        let b = obs("01073", 2022, Metric::AdultObesity, 36.0, SourceId::ChrTrends);
        for observations in [vec![a.clone(), b.clone()], vec![b, a]] {
            let outcome = merge(PipelineOptions::default(), observations);
            assert_eq!(outcome.rows.len(), 1);
            assert_eq!(
                outcome.rows[0].value(Metric::AdultObesity),
                MetricValue::Value(34.0)
            );
            assert_eq!(outcome.stats.overridden, 1);
        }
    }

    #[test]
    fn first_value_within_a_source_wins() {
        let outcome = merge(
            PipelineOptions::default(),
            vec![
                obs("01073", 2019, Metric::AdultObesity, 34.2, SourceId::Places),
                obs("01073", 2019, Metric::AdultObesity, 33.0, SourceId::Places),
            ],
        );
        assert_eq!(
            outcome.rows[0].value(Metric::AdultObesity),
            MetricValue::Value(34.2)
        );
        assert_eq!(outcome.stats.superseded, 1);
    }

    #[test]
    fn missing_never_overrides() {
        let mut missing = obs("01073", 2022, Metric::Diabetes, 0.0, SourceId::Places);
        missing.value = MetricValue::Missing;
        let outcome = merge(
            PipelineOptions::default(),
            vec![
                missing,
                obs("01073", 2022, Metric::Diabetes, 12.5, SourceId::ChrTrends),
            ],
        );
        assert_eq!(
            outcome.rows[0].value(Metric::Diabetes),
            MetricValue::Value(12.5)
        );
    }

    #[test]
    fn aggregates_never_reach_output() {
        let outcome = merge(
            PipelineOptions::default(),
            vec![obs("01000", 2022, Metric::Diabetes, 12.5, SourceId::ChrTrends)],
        );
        assert!(outcome.rows.is_empty());
        assert_eq!(outcome.stats.aggregate_dropped, 1);
    }

    #[test]
    fn backfill_fills_gaps_only() {
        let observations = vec![
            obs("01073", 2019, Metric::AdultObesity, 33.0, SourceId::ChrTrends),
            obs("01073", 2020, Metric::MedianIncome, 51000.0, SourceId::ChrTrends),
            obs("01073", 2024, Metric::MedianIncome, 58000.0, SourceId::ChrAdditional),
            obs("01073", 2024, Metric::AdultObesity, 35.0, SourceId::ChrAdditional),
            obs("01089", 2024, Metric::MedianIncome, 70000.0, SourceId::ChrAdditional),
        ];

        let filled = merge(PipelineOptions::default(), observations.clone());
        let by_year = |rows: &[CanonicalRow], fips: &str, year: i32| {
            rows.iter()
                .find(|row| row.fips.as_str() == fips && row.year == year)
                .cloned()
        };
        let row_2019 = by_year(&filled.rows, "01073", 2019).unwrap();
        assert_eq!(
            row_2019.value(Metric::MedianIncome),
            MetricValue::Value(58000.0)
        );
        // Obesity is not a snapshot-only metric.
        assert_eq!(
            row_2019.value(Metric::AdultObesity),
            MetricValue::Value(33.0)
        );
        let row_2020 = by_year(&filled.rows, "01073", 2020).unwrap();
        assert_eq!(
            row_2020.value(Metric::MedianIncome),
            MetricValue::Value(51000.0)
        );
        assert!(by_year(&filled.rows, "01089", 2019).is_none());
        assert_eq!(filled.stats.backfilled, 1);
        assert_eq!(filled.rows.len(), 4);

        let plain = merge(
            PipelineOptions::default().with_backfill(BackfillPolicy::Off),
            observations,
        );
        let row_2019 = by_year(&plain.rows, "01073", 2019).unwrap();
        assert_eq!(row_2019.value(Metric::MedianIncome), MetricValue::Missing);
        assert_eq!(plain.stats.backfilled, 0);
    }

    #[test]
    fn threshold_and_metric_set() {
        let observations = vec![
            obs("01073", 2019, Metric::AdultObesity, 33.0, SourceId::ChrTrends),
            obs("01073", 2019, Metric::PoorHealth, 20.0, SourceId::ChrTrends),
            obs("01089", 2019, Metric::PoorHealth, 18.0, SourceId::ChrTrends),
        ];
        let outcome = merge(
            PipelineOptions::default()
                .with_min_metrics(2)
                .with_metric_set(MetricSet::Full),
            observations.clone(),
        );
        assert_eq!(outcome.rows.len(), 1);
        assert_eq!(outcome.stats.below_threshold, 1);

        let core = merge(
            PipelineOptions::default().with_metric_set(MetricSet::Core),
            observations,
        );
        assert_eq!(core.rows.len(), 1);
        assert_eq!(core.stats.excluded_metric, 2);
    }

    #[test]
    fn names_come_from_the_directory() {
        let mut directory = CountyDirectory::new();
        directory.insert(CountyRecord {
            fips: CountyFips::new("01073").unwrap(),
            county: "Jefferson".into(),
            state: "Alabama".into(),
            state_abbr: Some("AL".into()),
        });
        let mut merger = Merger::new(PipelineOptions::default());
        merger.extend([
            obs("01073", 2019, Metric::AdultObesity, 33.0, SourceId::ChrTrends),
            obs("01089", 2019, Metric::AdultObesity, 30.0, SourceId::ChrTrends),
        ]);
        let outcome = merger.finish(&directory);
        assert_eq!(outcome.rows[0].county, "Jefferson");
        assert_eq!(outcome.rows[1].county, "");
        assert_eq!(outcome.stats.unnamed_counties, 1);
        assert_eq!(
            outcome.stats.values_by_source.get(&SourceId::ChrTrends),
            Some(&2)
        );
    }

    proptest! {
        #[test]
        fn disjoint_sources_merge_independent_of_order(
            cells in proptest::collection::btree_map(
                (0usize..3, 2014i32..2025, 0usize..Metric::ALL.len()),
                0.0f64..1000.0,
                0..40,
            )
        ) {
            const COUNTIES: [&str; 3] = ["01073", "01089", "06037"];
            // Each metric comes from exactly one source.
            let observations: Vec<MetricObservation> = cells
                .iter()
                .map(|(&(county, year, metric), &value)| {
                    let source = SourceId::PRIORITY[metric % SourceId::PRIORITY.len()];
                    obs(COUNTIES[county], year, Metric::ALL[metric], value, source)
                })
                .collect();
            let mut reversed = observations.clone();
            reversed.reverse();

            let forward = merge(PipelineOptions::default(), observations);
            let backward = merge(PipelineOptions::default(), reversed);
            prop_assert_eq!(forward.rows, backward.rows);
            prop_assert_eq!(forward.stats.overridden, 0);
        }
    }
}
