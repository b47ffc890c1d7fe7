//! County health pipeline with explicit stages.
//!
//! The pipeline follows these stages in order:
//! 1. **Ingest**: read each present source and extract observations
//! 2. **Directory**: collect county records; join name/state keyed rows
//! 3. **Merge**: resolve source priority, back-fill, apply the threshold
//! 4. **Report**: coverage and per-year counts
//!
//! Writing the output is left to the caller so a dry run shares every stage.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use std::time::Instant;

use chr_ingest::{
    DataLayout, SourceTable, TableOptions, discover_places_releases, parse_workbook_release,
    read_csv_table, read_sheet_table,
};
use chr_model::{CanonicalRow, PipelineOptions, SourceId};
use chr_transform::{ExtractOutcome, ReleaseTable, SourceSchema, SourceStats, extract};
use serde::Serialize;
use tracing::{debug, info, info_span, warn};

use crate::directory::{CountyDirectory, KeyLookup};
use crate::error::{PipelineError, Result};
use crate::merge::Merger;
use crate::report::{RunReport, SourceReport, SourceStatus, counties_per_year, metric_coverage};

/// Input file locations for one run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InputPaths {
    /// Required long-format trends file.
    pub trends: PathBuf,
    /// Optional annual workbook.
    pub workbook: PathBuf,
    /// Directory searched for PLACES release files.
    pub places_dir: PathBuf,
}

impl InputPaths {
    pub fn in_dir(data_dir: impl Into<PathBuf>) -> Self {
        Self::from_layout(&DataLayout::in_dir(data_dir))
    }

    pub fn from_layout(layout: &DataLayout) -> Self {
        Self {
            trends: layout.trends.clone(),
            workbook: layout.workbook.clone(),
            places_dir: layout.data_dir.clone(),
        }
    }
}

impl Default for InputPaths {
    fn default() -> Self {
        Self::from_layout(&DataLayout::default())
    }
}

/// Centralized context for one pipeline run.
#[derive(Debug, Clone)]
pub struct PipelineContext {
    pub inputs: InputPaths,
    pub options: PipelineOptions,
    pub releases: ReleaseTable,
}

impl PipelineContext {
    pub fn new(inputs: InputPaths) -> Self {
        Self {
            inputs,
            options: PipelineOptions::default(),
            releases: ReleaseTable::default(),
        }
    }

    pub fn with_options(mut self, options: PipelineOptions) -> Self {
        self.options = options;
        self
    }

    pub fn with_releases(mut self, releases: ReleaseTable) -> Self {
        self.releases = releases;
        self
    }
}

/// Canonical rows plus the report describing how they were built.
#[derive(Debug)]
pub struct PipelineRun {
    pub rows: Vec<CanonicalRow>,
    pub report: RunReport,
}

// ============================================================================
// Stage 1: Ingest
// ============================================================================

/// One extracted file.
#[derive(Debug)]
struct LoadedFile {
    path: PathBuf,
    outcome: ExtractOutcome,
}

/// Result of the ingest stage, in plan order.
#[derive(Debug, Default)]
struct IngestResult {
    loaded: Vec<LoadedFile>,
    skipped: Vec<SourceReport>,
}

fn read_source(path: &Path, schema: &SourceSchema) -> Result<SourceTable> {
    let options = TableOptions::with_header_row(schema.header_row);
    let table = match schema.sheet() {
        Some(sheet) => read_sheet_table(path, sheet, options)?,
        None => read_csv_table(path, options)?,
    };
    Ok(table)
}

fn ingest_file(path: &Path, schema: &SourceSchema, ctx: &PipelineContext) -> Result<LoadedFile> {
    let span = info_span!("ingest", source = %schema.source, path = %path.display());
    let _guard = span.enter();
    let start = Instant::now();

    let table = read_source(path, schema)?;
    let outcome = extract(&table, schema, ctx.options.year_bounds)?;

    let stats = &outcome.stats;
    info!(
        rows_read = stats.rows_read,
        rows_accepted = stats.rows_accepted,
        observations = stats.observations,
        duration_ms = start.elapsed().as_millis(),
        "source ingested"
    );
    if !stats.missing_columns.is_empty() {
        warn!(
            columns = %stats.missing_columns.join(", "),
            "expected metric columns absent"
        );
    }
    Ok(LoadedFile {
        path: path.to_path_buf(),
        outcome,
    })
}

fn ingest_workbook(ctx: &PipelineContext, result: &mut IngestResult) -> Result<()> {
    let path = &ctx.inputs.workbook;
    if !path.is_file() {
        warn!(path = %path.display(), "workbook not found, skipping snapshot sources");
        for source in [SourceId::ChrSelect, SourceId::ChrAdditional] {
            result.skipped.push(SourceReport::skipped(
                source,
                vec![path.clone()],
                "file not found",
            ));
        }
        return Ok(());
    }

    let release = path
        .file_name()
        .and_then(|name| name.to_str())
        .and_then(parse_workbook_release)
        .ok_or_else(|| PipelineError::WorkbookRelease { path: path.clone() })?;

    for schema in [
        SourceSchema::chr_select(release, &ctx.releases)?,
        SourceSchema::chr_additional(release, &ctx.releases)?,
    ] {
        result.loaded.push(ingest_file(path, &schema, ctx)?);
    }
    Ok(())
}

fn ingest_places(ctx: &PipelineContext, result: &mut IngestResult) -> Result<()> {
    let releases = discover_places_releases(&ctx.inputs.places_dir)?;
    if releases.is_empty() {
        warn!(dir = %ctx.inputs.places_dir.display(), "no PLACES release files found");
        result.skipped.push(SourceReport::skipped(
            SourceId::Places,
            Vec::new(),
            "no release files",
        ));
        return Ok(());
    }

    // Resolve every release before reading any file so an unmapped release
    // fails fast.
    let schemas = releases
        .iter()
        .map(|release| SourceSchema::places(release.release_year, &ctx.releases))
        .collect::<std::result::Result<Vec<_>, _>>()?;

    for (release, schema) in releases.iter().zip(&schemas) {
        result.loaded.push(ingest_file(&release.path, schema, ctx)?);
    }
    Ok(())
}

/// Reads every source in plan order: workbook sheets, trends, PLACES.
///
/// The workbook goes first so its county names seed the directory.
fn ingest(ctx: &PipelineContext) -> Result<IngestResult> {
    let trends = &ctx.inputs.trends;
    if !trends.is_file() {
        return Err(PipelineError::MissingInput {
            path: trends.clone(),
        });
    }

    let mut result = IngestResult::default();
    ingest_workbook(ctx, &mut result)?;
    result
        .loaded
        .push(ingest_file(trends, &SourceSchema::chr_trends(), ctx)?);
    ingest_places(ctx, &mut result)?;
    Ok(result)
}

// ============================================================================
// Stage 2: Directory and key join
// ============================================================================

fn build_directory(loaded: &[LoadedFile]) -> CountyDirectory {
    let mut directory = CountyDirectory::new();
    for file in loaded {
        let added = directory.extend(file.outcome.counties.iter().cloned());
        debug!(source = %file.outcome.source, added, "county records");
    }
    directory
}

/// Moves name/state keyed observations onto county codes.
///
/// A keyed row is accepted once its key resolves; otherwise the row counts
/// as unresolved or ambiguous, never both.
fn join_keyed(outcome: &mut ExtractOutcome, directory: &CountyDirectory) {
    if outcome.keyed.is_empty() {
        return;
    }
    let keyed = std::mem::take(&mut outcome.keyed);
    let mut joined = BTreeSet::new();
    let mut unresolved = BTreeSet::new();
    let mut ambiguous = BTreeSet::new();
    for observation in keyed {
        match directory.resolve_key(&observation.key) {
            KeyLookup::Found(fips) => {
                let fips = fips.clone();
                joined.insert(observation.row);
                outcome.observations.push(observation.resolve(fips));
                outcome.stats.observations += 1;
            }
            KeyLookup::Unknown => {
                if unresolved.insert(observation.row) {
                    debug!(key = %observation.key, "no county for name/state key");
                }
            }
            KeyLookup::Ambiguous => {
                if ambiguous.insert(observation.row) {
                    debug!(key = %observation.key, "ambiguous name/state key");
                }
            }
        }
    }
    let stats = &mut outcome.stats;
    stats.rows_accepted += joined.len();
    stats.unresolved_key += unresolved.len();
    stats.ambiguous_key += ambiguous.len();
    info!(
        source = %outcome.source,
        joined = joined.len(),
        unresolved = unresolved.len(),
        ambiguous = ambiguous.len(),
        "joined name/state keys"
    );
}

/// One report per source in priority order; several files of one source
/// fold into a single entry.
fn source_reports(ingested: &IngestResult) -> Vec<SourceReport> {
    let mut reports = Vec::new();
    for source in SourceId::PRIORITY {
        let files: Vec<&LoadedFile> = ingested
            .loaded
            .iter()
            .filter(|file| file.outcome.source == source)
            .collect();
        if files.is_empty() {
            if let Some(skipped) = ingested.skipped.iter().find(|r| r.source == source) {
                reports.push(skipped.clone());
            }
            continue;
        }
        let mut stats = SourceStats::default();
        for file in &files {
            stats.absorb(&file.outcome.stats);
        }
        let mut paths: Vec<PathBuf> = files.iter().map(|file| file.path.clone()).collect();
        paths.dedup();
        reports.push(SourceReport {
            source,
            files: paths,
            status: SourceStatus::Loaded,
            stats,
        });
    }
    reports
}

// ============================================================================
// Pipeline
// ============================================================================

/// Runs every stage and returns the canonical rows with their report.
pub fn run_pipeline(ctx: &PipelineContext) -> Result<PipelineRun> {
    let span = info_span!("pipeline", data = %ctx.inputs.places_dir.display());
    let _guard = span.enter();
    let start = Instant::now();

    let mut ingested = ingest(ctx)?;

    let directory = build_directory(&ingested.loaded);
    for file in &mut ingested.loaded {
        join_keyed(&mut file.outcome, &directory);
    }
    let sources = source_reports(&ingested);

    let merge_span = info_span!("merge");
    let merge_guard = merge_span.enter();
    let mut merger = Merger::new(ctx.options.clone());
    for file in ingested.loaded {
        merger.extend(file.outcome.observations);
    }
    let merged = merger.finish(&directory);
    info!(
        groups = merged.stats.groups,
        rows = merged.rows.len(),
        backfilled = merged.stats.backfilled,
        below_threshold = merged.stats.below_threshold,
        "merge complete"
    );
    drop(merge_guard);

    let report = RunReport {
        options: ctx.options.clone(),
        counties: directory.len(),
        sources,
        rows: merged.rows.len(),
        coverage: metric_coverage(&merged.rows, ctx.options.metric_set),
        counties_per_year: counties_per_year(&merged.rows),
        merge: merged.stats,
    };
    info!(
        rows = report.rows,
        counties = report.counties,
        duration_ms = start.elapsed().as_millis(),
        "pipeline complete"
    );
    Ok(PipelineRun {
        rows: merged.rows,
        report,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chr_model::{CountyKey, MetricValue};
    use chr_transform::KeyedObservation;

    #[test]
    fn join_counts_unresolved_keys() {
        let mut directory = CountyDirectory::new();
        directory.insert(chr_model::CountyRecord {
            fips: chr_model::CountyFips::new("01073").unwrap(),
            county: "Jefferson".into(),
            state: "Alabama".into(),
            state_abbr: Some("AL".into()),
        });
        let keyed = |row: usize, name: &str| KeyedObservation {
            row,
            key: CountyKey::new(name, "AL"),
            year: 2018,
            metric: chr_model::Metric::AdultObesity,
            value: MetricValue::Value(33.0),
            source: SourceId::Places,
        };
        let mut outcome = ExtractOutcome {
            source: SourceId::Places,
            observations: Vec::new(),
            keyed: vec![keyed(0, "jefferson"), keyed(1, "atlantis")],
            counties: Vec::new(),
            stats: SourceStats {
                rows_read: 2,
                ..SourceStats::default()
            },
        };
        join_keyed(&mut outcome, &directory);
        assert!(outcome.keyed.is_empty());
        assert_eq!(outcome.observations.len(), 1);
        assert_eq!(outcome.observations[0].fips.as_str(), "01073");
        assert_eq!(outcome.stats.unresolved_key, 1);
        assert_eq!(outcome.stats.rows_accepted, 1);
        assert_eq!(outcome.stats.observations, 1);
        assert_eq!(outcome.stats.rows_dropped(), 1);
    }

    #[test]
    fn input_paths_follow_layout() {
        let inputs = InputPaths::in_dir("fixtures");
        assert_eq!(inputs.trends, Path::new("fixtures/chr_trends_csv_2025.csv"));
        assert_eq!(inputs.places_dir, Path::new("fixtures"));
    }
}
