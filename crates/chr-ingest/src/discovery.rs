//! Input file discovery under the data directory.

use std::path::{Path, PathBuf};

use crate::error::{IngestError, Result};

pub const DEFAULT_DATA_DIR: &str = "data";
pub const TRENDS_FILE_NAME: &str = "chr_trends_csv_2025.csv";
pub const WORKBOOK_FILE_NAME: &str = "2025 County Health Rankings Data - v3.xlsx";
pub const OUTPUT_FILE_NAME: &str = "county_health_data.csv";

/// File-name prefix of the PLACES county release downloads.
pub const PLACES_PREFIX: &str = "PLACES__Local_Data_for_Better_Health,_County_Data_";

/// Fixed input locations relative to a data directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataLayout {
    pub data_dir: PathBuf,
    pub trends: PathBuf,
    pub workbook: PathBuf,
}

impl DataLayout {
    pub fn in_dir(data_dir: impl Into<PathBuf>) -> Self {
        let data_dir = data_dir.into();
        Self {
            trends: data_dir.join(TRENDS_FILE_NAME),
            workbook: data_dir.join(WORKBOOK_FILE_NAME),
            data_dir,
        }
    }

    pub fn default_output(&self) -> PathBuf {
        self.data_dir.join(OUTPUT_FILE_NAME)
    }
}

impl Default for DataLayout {
    fn default() -> Self {
        Self::in_dir(DEFAULT_DATA_DIR)
    }
}

/// A dated release file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReleaseFile {
    pub path: PathBuf,
    pub release_year: i32,
}

/// Lists all CSV files in a directory.
///
/// Returns files sorted by filename.
pub fn list_csv_files(dir: &Path) -> Result<Vec<PathBuf>> {
    if !dir.is_dir() {
        return Err(IngestError::DirectoryNotFound {
            path: dir.to_path_buf(),
        });
    }

    let mut files = Vec::new();

    let entries = std::fs::read_dir(dir).map_err(|e| IngestError::DirectoryRead {
        path: dir.to_path_buf(),
        source: e,
    })?;

    for entry_result in entries {
        let entry = entry_result.map_err(|e| IngestError::DirectoryRead {
            path: dir.to_path_buf(),
            source: e,
        })?;

        let path = entry.path();

        if !path.is_file() {
            continue;
        }

        let is_csv = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| ext.eq_ignore_ascii_case("csv"))
            .unwrap_or(false);

        if is_csv {
            files.push(path);
        }
    }

    files.sort_by(|a, b| a.file_name().cmp(&b.file_name()));

    Ok(files)
}

/// Extracts the release year from a PLACES file name, e.g.
/// `PLACES__..._County_Data_2021_release_20251026.csv` → 2021.
pub fn parse_places_release(file_name: &str) -> Option<i32> {
    let rest = file_name.strip_prefix(PLACES_PREFIX)?;
    let (year, tail) = rest.split_at_checked(4)?;
    if !year.bytes().all(|b| b.is_ascii_digit()) || !tail.starts_with("_release") {
        return None;
    }
    year.parse().ok()
}

/// Leading 4-digit year of a workbook name such as
/// `2025 County Health Rankings Data - v3.xlsx`.
pub fn parse_workbook_release(file_name: &str) -> Option<i32> {
    let (year, _) = file_name.split_at_checked(4)?;
    if !year.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    year.parse().ok()
}

/// Finds PLACES county release files in `dir`, ordered by release year.
///
/// When several downloads exist for one release, the last by file name
/// (the newest download stamp) is kept.
pub fn discover_places_releases(dir: &Path) -> Result<Vec<ReleaseFile>> {
    let mut releases: Vec<ReleaseFile> = Vec::new();
    for path in list_csv_files(dir)? {
        let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
            continue;
        };
        let Some(release_year) = parse_places_release(name) else {
            continue;
        };
        if let Some(existing) = releases
            .iter_mut()
            .find(|release| release.release_year == release_year)
        {
            tracing::warn!(
                release_year,
                kept = %path.display(),
                replaced = %existing.path.display(),
                "multiple files for one release"
            );
            existing.path = path;
            continue;
        }
        releases.push(ReleaseFile { path, release_year });
    }
    releases.sort_by_key(|release| release.release_year);
    Ok(releases)
}
