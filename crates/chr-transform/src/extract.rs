//! Schema-driven extraction.
//!
//! Turns one [`SourceTable`] into metric observations, county reference
//! records and per-source counters. Nothing here is fatal except a source
//! that lacks its identifier, label or year columns.

use std::collections::{BTreeMap, HashSet};

use chr_ingest::SourceTable;
use chr_model::{
    CountyFips, CountyKey, CountyRecord, Metric, MetricObservation, MetricValue, SourceId,
    YearBounds,
};
use serde::Serialize;
use tracing::{debug, trace};

use crate::error::{Result, TransformError};
use crate::mapping::lookup;
use crate::normalization::{
    IdentifierError, county_key, display_state, normalize_fips, normalize_split_fips,
    parse_metric_value, parse_year_label, reject_aggregate, resolve_state_abbr,
};
use crate::schema::{IdentifierStrategy, Layout, SourceSchema, YearRule};

/// Per-source counters. Every dropped row or cell lands in exactly one.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SourceStats {
    pub rows_read: usize,
    /// Rows that produced at least one observation. Name/state keyed rows
    /// count once their key resolves.
    pub rows_accepted: usize,
    pub observations: usize,
    pub invalid_identifier: usize,
    pub aggregate: usize,
    pub unknown_state: usize,
    /// Name/state keys with no county in the directory.
    pub unresolved_key: usize,
    /// Name/state keys matching more than one county.
    pub ambiguous_key: usize,
    pub unparseable_value: usize,
    pub missing_value: usize,
    pub unmapped_labels: usize,
    pub malformed_year: usize,
    pub out_of_range_year: usize,
    pub year_mismatch: usize,
    /// Expected metric columns absent from the file.
    pub missing_columns: Vec<String>,
}

impl SourceStats {
    /// Folds another file's counters into this one (several PLACES releases
    /// report as one source).
    pub fn absorb(&mut self, other: &SourceStats) {
        self.rows_read += other.rows_read;
        self.rows_accepted += other.rows_accepted;
        self.observations += other.observations;
        self.invalid_identifier += other.invalid_identifier;
        self.aggregate += other.aggregate;
        self.unknown_state += other.unknown_state;
        self.unresolved_key += other.unresolved_key;
        self.ambiguous_key += other.ambiguous_key;
        self.unparseable_value += other.unparseable_value;
        self.missing_value += other.missing_value;
        self.unmapped_labels += other.unmapped_labels;
        self.malformed_year += other.malformed_year;
        self.out_of_range_year += other.out_of_range_year;
        self.year_mismatch += other.year_mismatch;
        for column in &other.missing_columns {
            if !self.missing_columns.contains(column) {
                self.missing_columns.push(column.clone());
            }
        }
    }

    pub fn rows_dropped(&self) -> usize {
        self.rows_read.saturating_sub(self.rows_accepted)
    }
}

/// An observation identified only by county name and state.
#[derive(Debug, Clone, PartialEq)]
pub struct KeyedObservation {
    /// Index of the source row, shared by every cell of that row.
    pub row: usize,
    pub key: CountyKey,
    pub year: i32,
    pub metric: Metric,
    pub value: MetricValue,
    pub source: SourceId,
}

impl KeyedObservation {
    pub fn resolve(self, fips: CountyFips) -> MetricObservation {
        MetricObservation {
            fips,
            year: self.year,
            metric: self.metric,
            value: self.value,
            source: self.source,
        }
    }
}

/// Everything one source table contributes to a run.
#[derive(Debug, Clone)]
pub struct ExtractOutcome {
    pub source: SourceId,
    pub observations: Vec<MetricObservation>,
    /// Observations awaiting a join through the county directory.
    pub keyed: Vec<KeyedObservation>,
    /// First record per county, in identifier order.
    pub counties: Vec<CountyRecord>,
    pub stats: SourceStats,
}

impl ExtractOutcome {
    fn new(source: SourceId) -> Self {
        Self {
            source,
            observations: Vec::new(),
            keyed: Vec::new(),
            counties: Vec::new(),
            stats: SourceStats::default(),
        }
    }
}

enum IdColumns {
    Direct(usize),
    Split(usize, usize),
    NameState(usize, usize),
}

enum RowCounty {
    Code(CountyFips),
    Key(CountyKey),
}

struct Columns {
    identifier: IdColumns,
    label: usize,
    value: usize,
    wide: Vec<(usize, Metric)>,
    year: Option<usize>,
    county: Option<usize>,
    state: Option<usize>,
}

fn resolve_columns(
    table: &SourceTable,
    schema: &SourceSchema,
    stats: &mut SourceStats,
) -> Result<Columns> {
    let mut missing = Vec::new();
    let mut require = |name: &str| -> usize {
        table.column_index(name).unwrap_or_else(|| {
            missing.push(name.to_string());
            0
        })
    };

    let identifier = match schema.identifier.resolve(|column| table.has_column(column)) {
        IdentifierStrategy::Direct { column } => IdColumns::Direct(require(column)),
        IdentifierStrategy::Split { state, county } => {
            IdColumns::Split(require(state), require(county))
        }
        IdentifierStrategy::NameState { name, state }
        | IdentifierStrategy::DirectOrNameState { name, state, .. } => {
            IdColumns::NameState(require(name), require(state))
        }
    };

    let (label, value) = match schema.layout {
        Layout::Long {
            label_column,
            value_column,
        } => (require(label_column), require(value_column)),
        Layout::Wide => (0, 0),
    };

    let year = match schema.year {
        YearRule::Span { column } => Some(require(column)),
        YearRule::Release { filter_column, .. } => {
            filter_column.and_then(|column| table.column_index(column))
        }
    };

    if !missing.is_empty() {
        return Err(TransformError::MissingColumns {
            source_id: schema.source,
            origin: table.origin.clone(),
            columns: missing,
        });
    }

    let mut wide = Vec::new();
    if schema.layout == Layout::Wide {
        for (column, metric) in schema.mapping {
            match table.column_index(column) {
                Some(index) => wide.push((index, *metric)),
                None => stats.missing_columns.push((*column).to_string()),
            }
        }
        let known: HashSet<usize> = wide
            .iter()
            .map(|(index, _)| *index)
            .chain(
                [schema.county_column, schema.state_column]
                    .into_iter()
                    .flatten()
                    .filter_map(|column| table.column_index(column)),
            )
            .chain(
                schema
                    .identifier
                    .columns()
                    .into_iter()
                    .filter_map(|column| table.column_index(column)),
            )
            .collect();
        stats.unmapped_labels = (0..table.headers.len())
            .filter(|index| !known.contains(index))
            .count();
    }

    Ok(Columns {
        identifier,
        label,
        value,
        wide,
        year,
        county: schema.county_column.and_then(|column| table.column_index(column)),
        state: schema.state_column.and_then(|column| table.column_index(column)),
    })
}

fn identify(
    row: &[String],
    columns: &IdColumns,
    allow_aggregates: bool,
) -> std::result::Result<RowCounty, IdentifierError> {
    match *columns {
        IdColumns::Direct(index) => normalize_fips(&row[index])
            .and_then(|fips| reject_aggregate(fips, allow_aggregates))
            .map(RowCounty::Code),
        IdColumns::Split(state, county) => normalize_split_fips(&row[state], &row[county])
            .and_then(|fips| reject_aggregate(fips, allow_aggregates))
            .map(RowCounty::Code),
        IdColumns::NameState(name, state) => {
            county_key(&row[name], &row[state]).map(RowCounty::Key)
        }
    }
}

fn row_year(
    row: &[String],
    rule: YearRule,
    column: Option<usize>,
    bounds: YearBounds,
    stats: &mut SourceStats,
) -> Option<i32> {
    let year = match rule {
        YearRule::Span { .. } => {
            let label = column.map_or("", |index| row[index].as_str());
            match parse_year_label(label) {
                Ok(year) => year,
                Err(error) => {
                    trace!(%error, "dropping row");
                    stats.malformed_year += 1;
                    return None;
                }
            }
        }
        YearRule::Release { data_year, .. } => {
            if let Some(index) = column {
                match parse_year_label(&row[index]) {
                    Ok(year) if year == data_year => {}
                    Ok(_) => {
                        stats.year_mismatch += 1;
                        return None;
                    }
                    Err(error) => {
                        trace!(%error, "dropping row");
                        stats.malformed_year += 1;
                        return None;
                    }
                }
            }
            data_year
        }
    };
    if !bounds.contains(year) {
        stats.out_of_range_year += 1;
        return None;
    }
    Some(year)
}

fn county_record(row: &[String], fips: &CountyFips, columns: &Columns) -> Option<CountyRecord> {
    let county = columns.county.map(|index| row[index].trim())?;
    if county.is_empty() {
        return None;
    }
    let state = columns.state.map_or("", |index| row[index].as_str());
    Some(CountyRecord {
        fips: fips.clone(),
        county: county.to_string(),
        state: display_state(state),
        state_abbr: resolve_state_abbr(state).ok().map(str::to_string),
    })
}

/// Extracts observations from `table` as described by `schema`.
///
/// Rows outside `bounds` are dropped and counted.
pub fn extract(
    table: &SourceTable,
    schema: &SourceSchema,
    bounds: YearBounds,
) -> Result<ExtractOutcome> {
    let mut outcome = ExtractOutcome::new(schema.source);
    let columns = resolve_columns(table, schema, &mut outcome.stats)?;
    let mut counties: BTreeMap<CountyFips, CountyRecord> = BTreeMap::new();
    let mut unmapped_seen: HashSet<&str> = HashSet::new();

    for (row_index, row) in table.rows.iter().enumerate() {
        let stats = &mut outcome.stats;
        stats.rows_read += 1;

        let county = match identify(row, &columns.identifier, schema.allow_aggregates) {
            Ok(county) => county,
            Err(error) => {
                match error {
                    IdentifierError::Aggregate(_) => stats.aggregate += 1,
                    IdentifierError::UnknownState(_) => stats.unknown_state += 1,
                    IdentifierError::Empty
                    | IdentifierError::Malformed(_)
                    | IdentifierError::EmptyName => stats.invalid_identifier += 1,
                }
                trace!(%error, "dropping row");
                continue;
            }
        };

        if let RowCounty::Code(fips) = &county
            && !counties.contains_key(fips)
            && let Some(record) = county_record(row, fips, &columns)
        {
            counties.insert(fips.clone(), record);
        }

        let Some(year) = row_year(row, schema.year, columns.year, bounds, stats) else {
            continue;
        };

        let cells: Vec<(Metric, &str)> = match schema.layout {
            Layout::Long { .. } => {
                let label = row[columns.label].as_str();
                match lookup(schema.mapping, label) {
                    Some(metric) => vec![(metric, row[columns.value].as_str())],
                    None => {
                        stats.unmapped_labels += 1;
                        if unmapped_seen.insert(label) {
                            debug!(source = %schema.source, label, "unmapped label");
                        }
                        continue;
                    }
                }
            }
            Layout::Wide => columns
                .wide
                .iter()
                .map(|(index, metric)| (*metric, row[*index].as_str()))
                .collect(),
        };

        let mut emitted = 0usize;
        for (metric, raw) in cells {
            let value = match parse_metric_value(raw) {
                (value @ MetricValue::Value(_), _) => value,
                (_, Some(error)) if !error.is_missing() => {
                    trace!(%error, %metric, "unparseable value");
                    stats.unparseable_value += 1;
                    continue;
                }
                _ => {
                    stats.missing_value += 1;
                    continue;
                }
            };
            emitted += 1;
            match &county {
                RowCounty::Code(fips) => outcome.observations.push(MetricObservation {
                    fips: fips.clone(),
                    year,
                    metric,
                    value,
                    source: schema.source,
                }),
                RowCounty::Key(key) => outcome.keyed.push(KeyedObservation {
                    row: row_index,
                    key: key.clone(),
                    year,
                    metric,
                    value,
                    source: schema.source,
                }),
            }
        }

        if matches!(county, RowCounty::Code(_)) {
            let stats = &mut outcome.stats;
            stats.observations += emitted;
            if emitted > 0 {
                stats.rows_accepted += 1;
            }
        }
    }

    outcome.counties = counties.into_values().collect();
    let stats = &outcome.stats;
    debug!(
        source = %schema.source,
        origin = %table.origin,
        rows_read = stats.rows_read,
        rows_accepted = stats.rows_accepted,
        observations = stats.observations,
        counties = outcome.counties.len(),
        "extracted source table"
    );
    Ok(outcome)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::normalization::ReleaseTable;

    fn table(headers: &[&str], rows: &[&[&str]]) -> SourceTable {
        let mut table = SourceTable::new(
            "test",
            headers.iter().map(|h| (*h).to_string()).collect(),
        );
        for row in rows {
            table.push_row(row.iter().map(|c| (*c).to_string()).collect());
        }
        table
    }

    const TRENDS_HEADERS: &[&str] = &[
        "statecode",
        "countycode",
        "county",
        "state",
        "measurename",
        "yearspan",
        "rawvalue",
    ];

    #[test]
    fn test_trends_single_row() {
        let table = table(
            TRENDS_HEADERS,
            &[&["01", "073", "Jefferson", "Alabama", "Life expectancy", "2018-2020", "75.4"]],
        );
        let outcome = extract(&table, &SourceSchema::chr_trends(), YearBounds::default()).unwrap();
        assert_eq!(outcome.observations.len(), 1);
        let observation = &outcome.observations[0];
        assert_eq!(observation.fips.as_str(), "01073");
        assert_eq!(observation.year, 2019);
        assert_eq!(observation.metric, Metric::LifeExpectancy);
        assert_eq!(observation.value, MetricValue::Value(75.4));
        assert_eq!(outcome.counties[0].county, "Jefferson");
        assert_eq!(outcome.counties[0].state_abbr.as_deref(), Some("AL"));
    }

    #[test]
    fn test_trends_drop_reasons_are_counted() {
        let table = table(
            TRENDS_HEADERS,
            &[
                &["01", "000", "Alabama", "AL", "Life expectancy", "2018-2020", "75.0"],
                &["01", "073", "Jefferson", "AL", "Dentists", "2018-2020", "10"],
                &["01", "073", "Jefferson", "AL", "Adult obesity", "2005", "30"],
                &["01", "073", "Jefferson", "AL", "Adult obesity", "20x5", "30"],
                &["01", "073", "Jefferson", "AL", "Adult obesity", "2019", "n/a"],
                &["01", "073", "Jefferson", "AL", "Adult obesity", "2019", "lots"],
                &["xx", "073", "Jefferson", "AL", "Adult obesity", "2019", "31"],
            ],
        );
        let outcome = extract(&table, &SourceSchema::chr_trends(), YearBounds::default()).unwrap();
        let stats = &outcome.stats;
        assert_eq!(stats.rows_read, 7);
        assert_eq!(stats.rows_accepted, 0);
        assert_eq!(stats.aggregate, 1);
        assert_eq!(stats.unmapped_labels, 1);
        assert_eq!(stats.out_of_range_year, 1);
        assert_eq!(stats.malformed_year, 1);
        assert_eq!(stats.missing_value, 1);
        assert_eq!(stats.unparseable_value, 1);
        assert_eq!(stats.invalid_identifier, 1);
        assert!(outcome.observations.is_empty());
    }

    #[test]
    fn test_state_level_schema_keeps_rollups() {
        let table = table(
            TRENDS_HEADERS,
            &[
                &["01", "000", "Alabama", "Alabama", "Life expectancy", "2018-2020", "75.0"],
                &["01", "073", "Jefferson", "Alabama", "Life expectancy", "2018-2020", "75.4"],
            ],
        );
        let schema = SourceSchema::chr_trends().with_allow_aggregates(true);
        let outcome = extract(&table, &schema, YearBounds::default()).unwrap();
        assert_eq!(outcome.stats.aggregate, 0);
        assert_eq!(outcome.stats.rows_accepted, 2);
        let codes: Vec<&str> = outcome
            .observations
            .iter()
            .map(|observation| observation.fips.as_str())
            .collect();
        assert_eq!(codes, vec!["01000", "01073"]);
    }

    #[test]
    fn test_missing_identifier_column_is_fatal() {
        let table = table(&["county", "measurename", "yearspan", "rawvalue"], &[]);
        let result = extract(&table, &SourceSchema::chr_trends(), YearBounds::default());
        match result {
            Err(TransformError::MissingColumns { columns, .. }) => {
                assert_eq!(columns, vec!["statecode", "countycode"]);
            }
            other => panic!("expected MissingColumns, got {other:?}"),
        }
    }

    #[test]
    fn test_wide_sheet_reports_missing_columns() {
        let schema = SourceSchema::chr_select(2025, &ReleaseTable::default()).unwrap();
        let table = table(
            &["FIPS", "State", "County", "% Uninsured", "Deaths"],
            &[
                &["01000", "Alabama", "", "11", "5"],
                &["01073", "Alabama", "Jefferson", "9.5", "7"],
            ],
        );
        let outcome = extract(&table, &schema, YearBounds::default()).unwrap();
        assert_eq!(outcome.observations.len(), 1);
        assert_eq!(outcome.observations[0].year, 2024);
        assert_eq!(outcome.observations[0].metric, Metric::Uninsured);
        assert_eq!(outcome.stats.aggregate, 1);
        assert_eq!(outcome.stats.unmapped_labels, 1);
        assert_eq!(outcome.stats.missing_columns.len(), schema.mapping.len() - 1);
    }

    #[test]
    fn test_places_year_filter_and_name_keys() {
        let schema = SourceSchema::places(2020, &ReleaseTable::default()).unwrap();
        let table = table(
            &["Year", "StateAbbr", "LocationName", "Measure", "Data_Value"],
            &[
                &["2018", "AL", "Jefferson", "Obesity among adults", "33.5"],
                &["2017", "AL", "Jefferson", "Obesity among adults", "32.0"],
                &["2018", "ZZ", "Nowhere", "Obesity among adults", "30.0"],
            ],
        );
        let outcome = extract(&table, &schema, YearBounds::default()).unwrap();
        assert!(outcome.observations.is_empty());
        assert_eq!(outcome.keyed.len(), 1);
        assert_eq!(outcome.keyed[0].key.to_string(), "jefferson|AL");
        assert_eq!(outcome.keyed[0].year, 2018);
        assert_eq!(outcome.stats.year_mismatch, 1);
        assert_eq!(outcome.stats.unknown_state, 1);
        // Keyed rows are accepted by the directory join, not here.
        assert_eq!(outcome.stats.rows_accepted, 0);
        assert_eq!(outcome.stats.observations, 0);
    }

    #[test]
    fn test_stats_absorb() {
        let mut total = SourceStats {
            rows_read: 2,
            missing_columns: vec!["A".into()],
            ..SourceStats::default()
        };
        total.absorb(&SourceStats {
            rows_read: 3,
            rows_accepted: 1,
            missing_columns: vec!["A".into(), "B".into()],
            ..SourceStats::default()
        });
        assert_eq!(total.rows_read, 5);
        assert_eq!(total.rows_dropped(), 4);
        assert_eq!(total.missing_columns, vec!["A", "B"]);
    }
}
