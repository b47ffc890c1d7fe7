use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chr_core::{InputPaths, PipelineContext, run_pipeline};
use chr_ingest::{
    DEFAULT_DATA_DIR, DataLayout, discover_places_releases, list_sheets, parse_workbook_release,
};
use chr_model::{BackfillPolicy, MetricSet, PipelineOptions, SourceId, YearBounds};
use chr_output::{ReportDocument, write_canonical_csv, write_report_json};
use chr_transform::{ADDITIONAL_SHEET, ReleaseTable, SELECT_SHEET};
use tracing::{info, info_span, warn};

use crate::cli::{RunArgs, SourcesArgs};
use crate::types::{DiscoveredFile, RunResult, SourceFiles};

fn data_dir(arg: Option<&PathBuf>) -> PathBuf {
    arg.cloned().unwrap_or_else(|| PathBuf::from(DEFAULT_DATA_DIR))
}

/// Builds pipeline options from `run` flags on top of the defaults.
pub fn options_from_args(args: &RunArgs) -> Result<PipelineOptions> {
    let defaults = YearBounds::default();
    let bounds = YearBounds::new(
        args.year_min.unwrap_or(defaults.min),
        args.year_max.unwrap_or(defaults.max),
    )
    .context("invalid --year-min/--year-max")?;

    let mut options = PipelineOptions::new().with_year_bounds(bounds);
    if let Some(min_metrics) = args.min_metrics {
        options = options.with_min_metrics(min_metrics);
    }
    if args.no_backfill {
        options = options.with_backfill(BackfillPolicy::Off);
    }
    if args.core_only {
        options = options.with_metric_set(MetricSet::Core);
    }
    Ok(options)
}

pub fn run_command(args: &RunArgs) -> Result<RunResult> {
    let data_dir = data_dir(args.data_dir.as_ref());
    let span = info_span!("run", data_dir = %data_dir.display(), dry_run = args.dry_run);
    let _guard = span.enter();

    let layout = DataLayout::in_dir(&data_dir);
    let output = args
        .output
        .clone()
        .unwrap_or_else(|| layout.default_output());
    let options = options_from_args(args)?;
    let ctx = PipelineContext::new(InputPaths::from_layout(&layout)).with_options(options);

    let run = run_pipeline(&ctx).context("pipeline failed")?;

    let written = if args.dry_run {
        info!(rows = run.rows.len(), "dry run, canonical csv not written");
        None
    } else {
        let summary = write_canonical_csv(&output, &run.rows, ctx.options.metric_set)
            .with_context(|| format!("write {}", output.display()))?;
        Some(summary)
    };

    if let Some(path) = &args.report_json {
        let document = ReportDocument::new(&run.report, written.as_ref());
        write_report_json(path, &document)
            .with_context(|| format!("write report {}", path.display()))?;
    }

    Ok(RunResult {
        data_dir,
        run,
        written,
        report_json: args.report_json.clone(),
    })
}

fn fixed_file(path: PathBuf) -> DiscoveredFile {
    DiscoveredFile {
        present: path.is_file(),
        path,
        release_year: None,
        data_year: None,
    }
}

/// Sheet names of the workbook; empty when it is absent or unreadable.
fn workbook_sheets(path: &Path) -> Vec<String> {
    if !path.is_file() {
        return Vec::new();
    }
    list_sheets(path).unwrap_or_else(|error| {
        warn!(path = %path.display(), %error, "workbook unreadable");
        Vec::new()
    })
}

/// Lists the expected and discovered input files of a data directory.
///
/// A workbook source counts as present only when its sheet exists.
pub fn discover_sources(data_dir: &Path) -> Result<Vec<SourceFiles>> {
    let layout = DataLayout::in_dir(data_dir);
    let releases = ReleaseTable::default();

    let workbook_release = layout
        .workbook
        .file_name()
        .and_then(std::ffi::OsStr::to_str)
        .and_then(parse_workbook_release);
    let workbook_year = workbook_release.and_then(|release| {
        releases
            .resolve_release(SourceId::ChrSelect.family(), release)
            .ok()
    });

    let places = discover_places_releases(&layout.data_dir)
        .with_context(|| format!("scan {}", layout.data_dir.display()))?
        .into_iter()
        .map(|release| DiscoveredFile {
            data_year: releases
                .resolve_release(SourceId::Places.family(), release.release_year)
                .ok(),
            release_year: Some(release.release_year),
            present: true,
            path: release.path,
        })
        .collect();

    let mut sources = vec![
        SourceFiles {
            source: SourceId::Places,
            files: places,
        },
        SourceFiles {
            source: SourceId::ChrTrends,
            files: vec![fixed_file(layout.trends.clone())],
        },
    ];
    let sheets = workbook_sheets(&layout.workbook);
    for (source, sheet) in [
        (SourceId::ChrSelect, SELECT_SHEET),
        (SourceId::ChrAdditional, ADDITIONAL_SHEET),
    ] {
        sources.push(SourceFiles {
            source,
            files: vec![DiscoveredFile {
                path: layout.workbook.clone(),
                present: sheets.iter().any(|name| name == sheet),
                release_year: workbook_release,
                data_year: workbook_year,
            }],
        });
    }
    Ok(sources)
}

pub fn run_sources(args: &SourcesArgs) -> Result<Vec<SourceFiles>> {
    discover_sources(&data_dir(args.data_dir.as_ref()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_options() {
        let options = options_from_args(&RunArgs::default()).unwrap();
        assert_eq!(options.year_bounds, YearBounds::default());
        assert_eq!(options.min_metrics, 1);
        assert_eq!(options.backfill, BackfillPolicy::FillGaps);
        assert_eq!(options.metric_set, MetricSet::Full);
    }

    #[test]
    fn test_flags_override_options() {
        let args = RunArgs {
            min_metrics: Some(4),
            year_max: Some(2020),
            no_backfill: true,
            core_only: true,
            ..RunArgs::default()
        };
        let options = options_from_args(&args).unwrap();
        assert_eq!(options.year_bounds, YearBounds::new(2014, 2020).unwrap());
        assert_eq!(options.min_metrics, 4);
        assert_eq!(options.backfill, BackfillPolicy::Off);
        assert_eq!(options.metric_set, MetricSet::Core);
    }

    #[test]
    fn test_inverted_year_bounds_rejected() {
        let args = RunArgs {
            year_min: Some(2022),
            year_max: Some(2018),
            ..RunArgs::default()
        };
        let err = options_from_args(&args).unwrap_err();
        assert!(format!("{err:#}").contains("2022 > 2018"));
    }

    #[test]
    fn test_default_data_dir() {
        assert_eq!(data_dir(None), PathBuf::from("data"));
    }
}
