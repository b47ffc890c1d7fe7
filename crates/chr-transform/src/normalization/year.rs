//! Calendar year resolution.
//!
//! Multi-year trend labels collapse to their midpoint; annual release files
//! map to the data year they describe through an explicit [`ReleaseTable`].

use std::collections::BTreeMap;

use chr_model::SourceFamily;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum YearError {
    #[error("malformed year label '{0}'")]
    Malformed(String),
    #[error("no data-year mapping for {family} release {release}; extend the release table")]
    UnmappedRelease { family: SourceFamily, release: i32 },
}

fn parse_year(value: &str) -> Option<i32> {
    let value = value.trim();
    if value.is_empty() || value.len() > 4 || !value.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    value.parse().ok()
}

/// Resolves a year label: `"2018-2020"` → 2019, `"2021"` → 2021.
///
/// Spans resolve to the floor of their midpoint, so `"2019-2020"` → 2019.
pub fn parse_year_label(label: &str) -> Result<i32, YearError> {
    let malformed = || YearError::Malformed(label.trim().to_string());
    match label.split_once('-') {
        Some((start, end)) => {
            let start = parse_year(start).ok_or_else(malformed)?;
            let end = parse_year(end).ok_or_else(malformed)?;
            if end < start {
                return Err(malformed());
            }
            Ok((start + end).div_euclid(2))
        }
        None => parse_year(label).ok_or_else(malformed),
    }
}

/// Maps (source family, release year) to the data year a release describes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReleaseTable {
    entries: BTreeMap<(SourceFamily, i32), i32>,
}

impl Default for ReleaseTable {
    fn default() -> Self {
        Self::empty()
            .with_entry(SourceFamily::Chr, 2025, 2024)
            .with_entry(SourceFamily::Places, 2020, 2018)
            .with_entry(SourceFamily::Places, 2021, 2019)
            .with_entry(SourceFamily::Places, 2022, 2020)
            .with_entry(SourceFamily::Places, 2023, 2021)
            .with_entry(SourceFamily::Places, 2024, 2022)
    }
}

impl ReleaseTable {
    pub fn empty() -> Self {
        Self {
            entries: BTreeMap::new(),
        }
    }

    pub fn with_entry(mut self, family: SourceFamily, release: i32, data_year: i32) -> Self {
        self.entries.insert((family, release), data_year);
        self
    }

    /// Data year for a release. An unknown release is an operator error.
    pub fn resolve_release(&self, family: SourceFamily, release: i32) -> Result<i32, YearError> {
        self.entries
            .get(&(family, release))
            .copied()
            .ok_or(YearError::UnmappedRelease { family, release })
    }

    /// `(family, release, data_year)` in sorted order.
    pub fn entries(&self) -> impl Iterator<Item = (SourceFamily, i32, i32)> + '_ {
        self.entries
            .iter()
            .map(|(&(family, release), &data_year)| (family, release, data_year))
    }
}
