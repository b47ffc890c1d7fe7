//! Canonical CSV output.
//!
//! Header is `fips,county,state,year` followed by the metric keys in
//! vocabulary order. Missing values are empty fields.

use std::path::{Path, PathBuf};

use chr_model::{CanonicalRow, Metric, MetricSet};
use serde::Serialize;
use tracing::info;

use crate::atomic::{sha256_hex, write_atomic};
use crate::error::{OutputError, Result};

pub const ID_COLUMNS: [&str; 4] = ["fips", "county", "state", "year"];

/// What a write produced.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WriteSummary {
    pub path: PathBuf,
    pub rows: usize,
    /// Hex SHA-256 of the bytes written.
    pub sha256: String,
}

/// Output header for a metric set.
pub fn canonical_header(metric_set: MetricSet) -> Vec<&'static str> {
    ID_COLUMNS
        .iter()
        .copied()
        .chain(Metric::columns(metric_set).iter().map(|metric| metric.key()))
        .collect()
}

/// Encodes rows as CSV bytes. `path` is only used in error messages.
pub fn render_csv(rows: &[CanonicalRow], metric_set: MetricSet, path: &Path) -> Result<Vec<u8>> {
    let csv_error = |source| OutputError::Csv {
        path: path.to_path_buf(),
        source,
    };
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer
        .write_record(canonical_header(metric_set))
        .map_err(csv_error)?;

    let metrics = Metric::columns(metric_set);
    let mut record: Vec<String> = Vec::with_capacity(ID_COLUMNS.len() + metrics.len());
    for row in rows {
        record.clear();
        record.push(row.fips.to_string());
        record.push(row.county.clone());
        record.push(row.state.clone());
        record.push(row.year.to_string());
        record.extend(metrics.iter().map(|metric| row.value(*metric).to_string()));
        writer.write_record(&record).map_err(csv_error)?;
    }

    writer.into_inner().map_err(|e| OutputError::Io {
        operation: "flush",
        path: path.to_path_buf(),
        source: e.into_error(),
    })
}

/// Writes the canonical CSV atomically and returns its summary.
pub fn write_canonical_csv(
    path: &Path,
    rows: &[CanonicalRow],
    metric_set: MetricSet,
) -> Result<WriteSummary> {
    let bytes = render_csv(rows, metric_set, path)?;
    write_atomic(path, &bytes)?;
    let summary = WriteSummary {
        path: path.to_path_buf(),
        rows: rows.len(),
        sha256: sha256_hex(&bytes),
    };
    info!(
        path = %summary.path.display(),
        rows = summary.rows,
        sha256 = %summary.sha256,
        "wrote canonical csv"
    );
    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chr_model::{CountyFips, MetricValue};

    fn row(fips: &str, county: &str, year: i32, values: &[(Metric, f64)]) -> CanonicalRow {
        let mut row = CanonicalRow::new(
            CountyFips::new(fips).unwrap(),
            county.to_string(),
            "Alabama".to_string(),
            year,
        );
        for (metric, value) in values {
            row.values.insert(*metric, MetricValue::Value(*value));
        }
        row
    }

    #[test]
    fn test_header_order() {
        let header = canonical_header(MetricSet::Full);
        assert_eq!(header.len(), 4 + Metric::ALL.len());
        assert_eq!(&header[..5], ["fips", "county", "state", "year", "life_expectancy"]);
        assert_eq!(header.last(), Some(&"some_college"));
    }

    #[test]
    fn test_render_core_rows() {
        let rows = vec![
            row("01073", "Jefferson", 2019, &[(Metric::LifeExpectancy, 75.4)]),
            row(
                "01089",
                "Madison",
                2020,
                &[(Metric::AdultObesity, 31.5), (Metric::MedianIncome, 52000.0)],
            ),
        ];
        let bytes = render_csv(&rows, MetricSet::Core, Path::new("out.csv")).unwrap();
        insta::assert_snapshot!(String::from_utf8(bytes).unwrap(), @r"
        fips,county,state,year,life_expectancy,premature_death,adult_obesity,diabetes,unemployment,median_income,adult_smoking,physical_inactivity,uninsured,primary_care_rate,hs_graduation
        01073,Jefferson,Alabama,2019,75.4,,,,,,,,,,
        01089,Madison,Alabama,2020,,,31.5,,,52000,,,,,
        ");
    }

    #[test]
    fn test_names_with_commas_are_quoted() {
        let rows = vec![row("01073", "Jefferson, East", 2019, &[(Metric::Diabetes, 12.0)])];
        let bytes = render_csv(&rows, MetricSet::Core, Path::new("out.csv")).unwrap();
        let text = String::from_utf8(bytes).unwrap();
        assert!(text.contains("01073,\"Jefferson, East\",Alabama,2019,"));
    }
}
