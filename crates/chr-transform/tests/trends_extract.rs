//! Extraction over tables read from disk.

use std::io::Write;

use chr_ingest::{TableOptions, read_csv_table};
use chr_model::{Metric, MetricValue, YearBounds};
use chr_transform::{ReleaseTable, SourceSchema, TransformError, extract};
use tempfile::NamedTempFile;

fn csv_file(content: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    write!(file, "{content}").unwrap();
    file
}

#[test]
fn trends_file_yields_midpoint_years() {
    let file = csv_file(
        "\u{feff}statecode,countycode,county,state,measurename,yearspan,rawvalue\n\
         01,073,Jefferson County,AL,Adult obesity,2019,33.1\n\
         01,073,Jefferson County,AL,Premature death,2018-2020,\"10,512.3\"\n\
         01,000,Alabama,AL,Premature death,2018-2020,9800\n\
         01,073,Jefferson County,AL,Dentists,2021,55\n",
    );
    let schema = SourceSchema::chr_trends();
    let table = read_csv_table(file.path(), TableOptions::with_header_row(schema.header_row))
        .unwrap();
    let outcome = extract(&table, &schema, YearBounds::default()).unwrap();

    let found: Vec<(i32, Metric, MetricValue)> = outcome
        .observations
        .iter()
        .map(|o| (o.year, o.metric, o.value))
        .collect();
    assert_eq!(
        found,
        vec![
            (2019, Metric::AdultObesity, MetricValue::Value(33.1)),
            (2019, Metric::PrematureDeath, MetricValue::Value(10512.3)),
        ]
    );
    assert_eq!(outcome.stats.aggregate, 1);
    assert_eq!(outcome.stats.unmapped_labels, 1);
    assert_eq!(outcome.counties.len(), 1);
    assert_eq!(outcome.counties[0].state, "Alabama");
}

#[test]
fn places_release_with_location_id_uses_codes() {
    let file = csv_file(
        "Year,StateAbbr,LocationName,LocationID,Measure,Data_Value\n\
         2019,AL,Jefferson,1073,Obesity among adults,34.2\n\
         2019,AL,Jefferson,1073,Obesity among adults,33.0\n\
         2020,AL,Jefferson,1073,Obesity among adults,35.0\n\
         2019,AL,Alabama,1000,Obesity among adults,31.0\n",
    );
    let schema = SourceSchema::places(2021, &ReleaseTable::default()).unwrap();
    let table = read_csv_table(file.path(), TableOptions::default()).unwrap();
    let outcome = extract(&table, &schema, YearBounds::default()).unwrap();

    assert!(outcome.keyed.is_empty());
    assert_eq!(outcome.observations.len(), 2);
    assert!(outcome.observations.iter().all(|o| o.fips.as_str() == "01073"));
    assert_eq!(outcome.stats.year_mismatch, 1);
    assert_eq!(outcome.stats.aggregate, 1);
}

#[test]
fn places_release_without_measure_column_is_fatal() {
    let file = csv_file("Year,StateAbbr,LocationName,LocationID,Data_Value\n2019,AL,J,1073,1\n");
    let schema = SourceSchema::places(2021, &ReleaseTable::default()).unwrap();
    let table = read_csv_table(file.path(), TableOptions::default()).unwrap();
    let err = extract(&table, &schema, YearBounds::default()).unwrap_err();
    assert!(matches!(
        err,
        TransformError::MissingColumns { ref columns, .. } if columns == &["Measure"]
    ));
    assert!(err.to_string().contains("missing required columns: Measure"));
}
