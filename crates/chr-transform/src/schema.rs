//! Source schema descriptors.
//!
//! One shared extraction path is parameterized per source by a
//! [`SourceSchema`]: how to derive the county identifier, where the metric
//! labels live, how rows map to a calendar year and where the header sits.

use chr_model::{Metric, SourceFamily, SourceId};

use crate::mapping::mapping_table;
use crate::normalization::{ReleaseTable, YearError};

pub const SELECT_SHEET: &str = "Select Measure Data";
pub const ADDITIONAL_SHEET: &str = "Additional Measure Data";

/// How a row's county is identified.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdentifierStrategy {
    /// A single code column (`FIPS`, `LocationID`).
    Direct { column: &'static str },
    /// Separate state and county code columns.
    Split {
        state: &'static str,
        county: &'static str,
    },
    /// County name and state; joined later through the county directory.
    NameState {
        name: &'static str,
        state: &'static str,
    },
    /// `Direct` when the code column exists in the file, else `NameState`.
    DirectOrNameState {
        column: &'static str,
        name: &'static str,
        state: &'static str,
    },
}

impl IdentifierStrategy {
    /// The concrete strategy for a table with the given columns.
    pub fn resolve(self, has_column: impl Fn(&str) -> bool) -> IdentifierStrategy {
        match self {
            IdentifierStrategy::DirectOrNameState {
                column,
                name,
                state,
            } => {
                if has_column(column) {
                    IdentifierStrategy::Direct { column }
                } else {
                    IdentifierStrategy::NameState { name, state }
                }
            }
            other => other,
        }
    }

    pub fn columns(self) -> Vec<&'static str> {
        match self {
            IdentifierStrategy::Direct { column } => vec![column],
            IdentifierStrategy::Split { state, county } => vec![state, county],
            IdentifierStrategy::NameState { name, state } => vec![name, state],
            IdentifierStrategy::DirectOrNameState { column, .. } => vec![column],
        }
    }
}

/// Where metric labels live.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Layout {
    /// One row per (county, period, measure).
    Long {
        label_column: &'static str,
        value_column: &'static str,
    },
    /// One row per county, one column per measure.
    Wide,
}

/// How rows map to a calendar year.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum YearRule {
    /// A per-row year or `Y1-Y2` span label.
    Span { column: &'static str },
    /// Every row belongs to the release's data year. When the file also has
    /// a per-row year column, rows for other years are dropped.
    Release {
        release: i32,
        data_year: i32,
        filter_column: Option<&'static str>,
    },
}

/// Everything extraction needs to know about one source.
#[derive(Debug, Clone, PartialEq)]
pub struct SourceSchema {
    pub source: SourceId,
    pub identifier: IdentifierStrategy,
    pub layout: Layout,
    pub mapping: &'static [(&'static str, Metric)],
    pub year: YearRule,
    /// Columns captured into the county directory when present.
    pub county_column: Option<&'static str>,
    pub state_column: Option<&'static str>,
    /// Number of physical rows preceding the true header.
    pub header_row: usize,
    /// Keep `xx000` rollup rows (state-level tables only).
    pub allow_aggregates: bool,
}

impl SourceSchema {
    /// The long-format trends file.
    pub fn chr_trends() -> Self {
        Self {
            source: SourceId::ChrTrends,
            identifier: IdentifierStrategy::Split {
                state: "statecode",
                county: "countycode",
            },
            layout: Layout::Long {
                label_column: "measurename",
                value_column: "rawvalue",
            },
            mapping: mapping_table(SourceId::ChrTrends),
            year: YearRule::Span { column: "yearspan" },
            county_column: Some("county"),
            state_column: Some("state"),
            header_row: 0,
            allow_aggregates: false,
        }
    }

    fn chr_sheet(
        source: SourceId,
        release: i32,
        releases: &ReleaseTable,
    ) -> Result<Self, YearError> {
        let data_year = releases.resolve_release(SourceFamily::Chr, release)?;
        Ok(Self {
            source,
            identifier: IdentifierStrategy::Direct { column: "FIPS" },
            layout: Layout::Wide,
            mapping: mapping_table(source),
            year: YearRule::Release {
                release,
                data_year,
                filter_column: None,
            },
            county_column: Some("County"),
            state_column: Some("State"),
            header_row: 1,
            allow_aggregates: false,
        })
    }

    /// The workbook's "Select Measure Data" sheet.
    pub fn chr_select(release: i32, releases: &ReleaseTable) -> Result<Self, YearError> {
        Self::chr_sheet(SourceId::ChrSelect, release, releases)
    }

    /// The workbook's "Additional Measure Data" sheet.
    pub fn chr_additional(release: i32, releases: &ReleaseTable) -> Result<Self, YearError> {
        Self::chr_sheet(SourceId::ChrAdditional, release, releases)
    }

    /// One PLACES county release file.
    pub fn places(release: i32, releases: &ReleaseTable) -> Result<Self, YearError> {
        let data_year = releases.resolve_release(SourceFamily::Places, release)?;
        Ok(Self {
            source: SourceId::Places,
            identifier: IdentifierStrategy::DirectOrNameState {
                column: "LocationID",
                name: "LocationName",
                state: "StateAbbr",
            },
            layout: Layout::Long {
                label_column: "Measure",
                value_column: "Data_Value",
            },
            mapping: mapping_table(SourceId::Places),
            year: YearRule::Release {
                release,
                data_year,
                filter_column: Some("Year"),
            },
            county_column: Some("LocationName"),
            state_column: Some("StateAbbr"),
            header_row: 0,
            allow_aggregates: false,
        })
    }

    /// Sheet name for workbook-backed sources.
    pub fn sheet(&self) -> Option<&'static str> {
        match self.source {
            SourceId::ChrSelect => Some(SELECT_SHEET),
            SourceId::ChrAdditional => Some(ADDITIONAL_SHEET),
            SourceId::Places | SourceId::ChrTrends => None,
        }
    }

    pub fn with_allow_aggregates(mut self, allow: bool) -> Self {
        self.allow_aggregates = allow;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_places_resolves_release() {
        let releases = ReleaseTable::default();
        let schema = SourceSchema::places(2021, &releases).unwrap();
        assert_eq!(
            schema.year,
            YearRule::Release {
                release: 2021,
                data_year: 2019,
                filter_column: Some("Year")
            }
        );
        assert!(matches!(
            SourceSchema::places(2019, &releases),
            Err(YearError::UnmappedRelease { release: 2019, .. })
        ));
    }

    #[test]
    fn test_places_identifier_falls_back_to_name() {
        let strategy = SourceSchema::places(2020, &ReleaseTable::default())
            .unwrap()
            .identifier;
        assert_eq!(
            strategy.resolve(|column| column == "LocationID"),
            IdentifierStrategy::Direct {
                column: "LocationID"
            }
        );
        assert_eq!(
            strategy.resolve(|_| false),
            IdentifierStrategy::NameState {
                name: "LocationName",
                state: "StateAbbr"
            }
        );
    }

    #[test]
    fn test_workbook_sheets() {
        let releases = ReleaseTable::default();
        let select = SourceSchema::chr_select(2025, &releases).unwrap();
        assert_eq!(select.sheet(), Some(SELECT_SHEET));
        assert_eq!(select.header_row, 1);
        assert_eq!(SourceSchema::chr_trends().sheet(), None);
    }
}
