use comfy_table::modifiers::{UTF8_ROUND_CORNERS, UTF8_SOLID_INNER_BORDERS};
use comfy_table::presets::{UTF8_FULL, UTF8_FULL_CONDENSED};
use comfy_table::{Attribute, Cell, CellAlignment, Color, ContentArrangement, Table};

use chr_core::{MetricCoverage, RunReport, SourceReport, SourceStatus};
use chr_model::{Metric, SourceId};
use chr_transform::SourceStats;
use chr_transform::mapping::mapping_table;

use crate::types::{DiscoveredFile, RunResult, SourceFiles};

pub fn print_run_summary(result: &RunResult) {
    println!("Data: {}", result.data_dir.display());
    match &result.written {
        Some(summary) => {
            println!("Output: {} ({} rows)", summary.path.display(), summary.rows);
            println!("SHA-256: {}", summary.sha256);
        }
        None => println!("Output: dry run, nothing written"),
    }
    if let Some(path) = &result.report_json {
        println!("Report: {}", path.display());
    }
    let report = &result.run.report;
    println!("{}", source_table(report));
    println!();
    println!("Dropped by reason:");
    println!("{}", drop_table(report));
    println!();
    println!("Merge:");
    println!("{}", merge_table(report, result.written.is_some()));
    println!();
    println!("Coverage:");
    println!("{}", coverage_table(&report.coverage));
    println!();
    println!("Counties per year:");
    println!("{}", year_table(report));
}

pub fn print_metrics() {
    println!("{}", metrics_table());
}

pub fn print_sources(sources: &[SourceFiles]) {
    println!("{}", sources_table(sources));
}

fn source_table(report: &RunReport) -> Table {
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Source"),
        header_cell("Description"),
        header_cell("Files"),
        header_cell("Status"),
        header_cell("Read"),
        header_cell("Accepted"),
        header_cell("Observations"),
        header_cell("Dropped"),
    ]);
    apply_summary_table_style(&mut table);
    for index in 2..8 {
        align_column(&mut table, index, CellAlignment::Right);
    }
    align_column(&mut table, 3, CellAlignment::Center);

    let mut total = SourceStats::default();
    for source in &report.sources {
        total.absorb(&source.stats);
        table.add_row(vec![
            source_cell(source.source),
            Cell::new(source.source.description()),
            Cell::new(source.files.len()),
            status_cell(source),
            count_cell(source.stats.rows_read, Color::Reset),
            count_cell(source.stats.rows_accepted, Color::Reset),
            count_cell(source.stats.observations, Color::Reset),
            count_cell(source.stats.rows_dropped(), Color::Yellow),
        ]);
    }
    table.add_row(vec![
        Cell::new("TOTAL")
            .fg(Color::Cyan)
            .add_attribute(Attribute::Bold),
        Cell::new("All sources")
            .fg(Color::Cyan)
            .add_attribute(Attribute::Bold),
        dim_cell("-"),
        dim_cell("-"),
        Cell::new(total.rows_read).add_attribute(Attribute::Bold),
        Cell::new(total.rows_accepted).add_attribute(Attribute::Bold),
        Cell::new(total.observations).add_attribute(Attribute::Bold),
        count_cell(total.rows_dropped(), Color::Yellow).add_attribute(Attribute::Bold),
    ]);
    table
}

/// Per-row and per-cell drop counters in display order.
fn drop_reasons(stats: &SourceStats) -> [(&'static str, usize); 12] {
    [
        ("invalid identifier", stats.invalid_identifier),
        ("aggregate row", stats.aggregate),
        ("unknown state", stats.unknown_state),
        ("unresolved name/state", stats.unresolved_key),
        ("ambiguous name/state", stats.ambiguous_key),
        ("unparseable value", stats.unparseable_value),
        ("missing value", stats.missing_value),
        ("unmapped label", stats.unmapped_labels),
        ("malformed year", stats.malformed_year),
        ("year out of range", stats.out_of_range_year),
        ("year mismatch", stats.year_mismatch),
        ("missing column", stats.missing_columns.len()),
    ]
}

fn drop_table(report: &RunReport) -> Table {
    let loaded: Vec<&SourceReport> = report.sources.iter().filter(|s| s.is_loaded()).collect();
    let mut table = Table::new();
    let mut header = vec![header_cell("Reason")];
    header.extend(loaded.iter().map(|source| header_cell(source.source.name())));
    table.set_header(header);
    apply_table_style(&mut table);
    for index in 1..=loaded.len() {
        align_column(&mut table, index, CellAlignment::Right);
    }

    let per_source: Vec<_> = loaded
        .iter()
        .map(|source| drop_reasons(&source.stats))
        .collect();
    let reasons = drop_reasons(&SourceStats::default());
    for (index, (reason, _)) in reasons.iter().enumerate() {
        let mut row = vec![Cell::new(reason)];
        row.extend(
            per_source
                .iter()
                .map(|counts| count_cell(counts[index].1, Color::Yellow)),
        );
        table.add_row(row);
    }
    table
}

/// `written` is false on a dry run.
fn merge_table(report: &RunReport, written: bool) -> Table {
    let merge = &report.merge;
    let mut table = Table::new();
    table.set_header(vec![header_cell("Step"), header_cell("Count")]);
    apply_table_style(&mut table);
    align_column(&mut table, 1, CellAlignment::Right);
    let rows = [
        ("counties in directory", report.counties, Color::Reset),
        ("observations merged", merge.observations, Color::Reset),
        ("county-year groups", merge.groups, Color::Reset),
        ("superseded in source", merge.superseded, Color::Yellow),
        ("overridden by priority", merge.overridden, Color::Yellow),
        ("back-filled cells", merge.backfilled, Color::Green),
        ("metrics not in output", merge.excluded_metric, Color::Yellow),
        ("aggregate rows", merge.aggregate_dropped, Color::Yellow),
        ("groups below threshold", merge.below_threshold, Color::Yellow),
        ("rows without county name", merge.unnamed_counties, Color::Yellow),
    ];
    for (label, count, color) in rows {
        table.add_row(vec![Cell::new(label), count_cell(count, color)]);
    }
    let label = if written {
        "rows written"
    } else {
        "rows (dry run)"
    };
    table.add_row(vec![
        Cell::new(label)
            .fg(Color::Cyan)
            .add_attribute(Attribute::Bold),
        Cell::new(report.rows).add_attribute(Attribute::Bold),
    ]);
    table
}

fn coverage_table(coverage: &[MetricCoverage]) -> Table {
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Metric"),
        header_cell("Rows"),
        header_cell("Coverage"),
    ]);
    apply_table_style(&mut table);
    align_column(&mut table, 1, CellAlignment::Right);
    align_column(&mut table, 2, CellAlignment::Right);
    for entry in coverage {
        let percent = format!("{:.1}%", entry.percent);
        let percent_cell = if entry.populated == 0 {
            dim_cell(percent)
        } else {
            Cell::new(percent)
        };
        table.add_row(vec![
            Cell::new(entry.metric.key()),
            count_cell(entry.populated, Color::Reset),
            percent_cell,
        ]);
    }
    table
}

fn year_table(report: &RunReport) -> Table {
    let mut table = Table::new();
    table.set_header(vec![header_cell("Year"), header_cell("Counties")]);
    apply_table_style(&mut table);
    align_column(&mut table, 1, CellAlignment::Right);
    for (year, counties) in &report.counties_per_year {
        table.add_row(vec![Cell::new(year), Cell::new(counties)]);
    }
    if report.counties_per_year.is_empty() {
        table.add_row(vec![dim_cell("-"), dim_cell(0)]);
    }
    table
}

fn metrics_table() -> Table {
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Key"),
        header_cell("Label"),
        header_cell("Set"),
        header_cell("Back-fill"),
        header_cell("Sources"),
    ]);
    apply_table_style(&mut table);
    align_column(&mut table, 2, CellAlignment::Center);
    align_column(&mut table, 3, CellAlignment::Center);
    for metric in Metric::ALL {
        let set = if metric.is_core() {
            Cell::new("core").fg(Color::Blue)
        } else {
            dim_cell("full")
        };
        table.add_row(vec![
            Cell::new(metric.key()).add_attribute(Attribute::Bold),
            Cell::new(metric.label()),
            set,
            flag_cell(metric.is_snapshot_backfill()),
            Cell::new(metric_sources(metric).join(", ")),
        ]);
    }
    table
}

/// Sources with a mapping entry for `metric`, in priority order.
fn metric_sources(metric: Metric) -> Vec<&'static str> {
    SourceId::PRIORITY
        .iter()
        .copied()
        .filter(|&source| {
            mapping_table(source)
                .iter()
                .any(|(_, mapped)| *mapped == metric)
        })
        .map(SourceId::name)
        .collect()
}

fn sources_table(sources: &[SourceFiles]) -> Table {
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Source"),
        header_cell("File"),
        header_cell("Present"),
        header_cell("Release"),
        header_cell("Data year"),
    ]);
    apply_table_style(&mut table);
    align_column(&mut table, 2, CellAlignment::Center);
    align_column(&mut table, 3, CellAlignment::Right);
    align_column(&mut table, 4, CellAlignment::Right);
    for source in sources {
        if source.files.is_empty() {
            table.add_row(vec![
                source_cell(source.source),
                dim_cell("no files found"),
                flag_cell(false),
                dim_cell("-"),
                dim_cell("-"),
            ]);
            continue;
        }
        for file in &source.files {
            table.add_row(vec![
                source_cell(source.source),
                file_cell(file),
                flag_cell(file.present),
                optional_cell(file.release_year),
                data_year_cell(file),
            ]);
        }
    }
    table
}

fn file_cell(file: &DiscoveredFile) -> Cell {
    let name = file
        .path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| file.path.display().to_string());
    if file.present {
        Cell::new(name)
    } else {
        dim_cell(name)
    }
}

fn data_year_cell(file: &DiscoveredFile) -> Cell {
    match (file.release_year, file.data_year) {
        (Some(_), None) => Cell::new("unmapped")
            .fg(Color::Red)
            .add_attribute(Attribute::Bold),
        (_, year) => optional_cell(year),
    }
}

pub fn apply_table_style(table: &mut Table) {
    table
        .load_preset(UTF8_FULL_CONDENSED)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_width(120);
}

fn apply_summary_table_style(table: &mut Table) {
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .apply_modifier(UTF8_SOLID_INNER_BORDERS)
        .set_content_arrangement(ContentArrangement::DynamicFullWidth)
        .set_width(140);
}

fn align_column(table: &mut Table, index: usize, alignment: CellAlignment) {
    if let Some(column) = table.column_mut(index) {
        column.set_cell_alignment(alignment);
    }
}

fn header_cell(label: &str) -> Cell {
    Cell::new(label)
        .fg(Color::Cyan)
        .add_attribute(Attribute::Bold)
}

fn source_cell(source: SourceId) -> Cell {
    Cell::new(source.name())
        .fg(Color::Blue)
        .add_attribute(Attribute::Bold)
}

fn status_cell(report: &SourceReport) -> Cell {
    match &report.status {
        SourceStatus::Loaded => Cell::new("loaded").fg(Color::Green),
        SourceStatus::Skipped { reason } => {
            Cell::new(format!("skipped: {reason}")).fg(Color::Yellow)
        }
    }
}

fn count_cell(count: usize, color: Color) -> Cell {
    if count == 0 {
        dim_cell(count)
    } else {
        Cell::new(count).fg(color)
    }
}

fn flag_cell(flag: bool) -> Cell {
    if flag {
        Cell::new("✓")
            .fg(Color::Green)
            .add_attribute(Attribute::Bold)
    } else {
        dim_cell("-")
    }
}

fn optional_cell(value: Option<i32>) -> Cell {
    match value {
        Some(value) => Cell::new(value),
        None => dim_cell("-"),
    }
}

fn dim_cell<T: ToString>(value: T) -> Cell {
    Cell::new(value).fg(Color::DarkGrey)
}
