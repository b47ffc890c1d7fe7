//! CLI argument definitions for the county health pipeline.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use clap_verbosity_flag::{Verbosity, WarnLevel};
use colorchoice_clap::Color;

#[derive(Parser)]
#[command(
    name = "county-health",
    version,
    about = "County health statistics - merge county-level health sources into one CSV",
    long_about = "Merge County Health Rankings trend and workbook data with CDC PLACES\n\
                  releases into one canonical county-by-year CSV.\n\n\
                  Running without a subcommand is the same as `run` with defaults."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Command>,

    /// Adjust log verbosity (-v for debug, -vv for trace, -q for errors only).
    #[command(flatten)]
    pub verbosity: Verbosity<WarnLevel>,

    /// Control ANSI color output (auto, always, never).
    #[command(flatten)]
    pub color: Color,

    /// Explicit log level (overrides -v/-q flags).
    #[arg(long = "log-level", value_enum, global = true)]
    pub log_level: Option<LogLevelArg>,

    /// Log output format (pretty for human, json for machine parsing).
    #[arg(
        long = "log-format",
        value_enum,
        default_value = "pretty",
        global = true
    )]
    pub log_format: LogFormatArg,

    /// Write logs to a file instead of stderr.
    #[arg(long = "log-file", value_name = "PATH", global = true)]
    pub log_file: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Command {
    /// Read every source and write the canonical CSV.
    Run(RunArgs),

    /// List the canonical metrics.
    Metrics,

    /// Show which input files are present in a data directory.
    Sources(SourcesArgs),
}

#[derive(Args, Debug, Clone, Default)]
pub struct RunArgs {
    /// Directory holding the input files (default: data).
    #[arg(long = "data-dir", value_name = "DIR")]
    pub data_dir: Option<PathBuf>,

    /// Output CSV path (default: <DATA_DIR>/county_health_data.csv).
    #[arg(long = "output", value_name = "PATH")]
    pub output: Option<PathBuf>,

    /// Minimum populated metrics for a county-year row to be written.
    #[arg(long = "min-metrics", value_name = "N")]
    pub min_metrics: Option<usize>,

    /// First calendar year kept in output.
    #[arg(long = "year-min", value_name = "YEAR")]
    pub year_min: Option<i32>,

    /// Last calendar year kept in output.
    #[arg(long = "year-max", value_name = "YEAR")]
    pub year_max: Option<i32>,

    /// Keep workbook snapshot values in their own year only.
    ///
    /// By default, structural metrics that only the annual workbook reports
    /// fill empty cells in the other years of the same county. Existing
    /// values are never replaced.
    #[arg(long = "no-backfill")]
    pub no_backfill: bool,

    /// Write only the core metric columns.
    #[arg(long = "core-only")]
    pub core_only: bool,

    /// Run every stage and report without writing the CSV.
    #[arg(long = "dry-run")]
    pub dry_run: bool,

    /// Also write the run report as JSON.
    #[arg(long = "report-json", value_name = "PATH")]
    pub report_json: Option<PathBuf>,
}

#[derive(Args, Debug, Clone, Default)]
pub struct SourcesArgs {
    /// Directory holding the input files (default: data).
    #[arg(long = "data-dir", value_name = "DIR")]
    pub data_dir: Option<PathBuf>,
}

/// CLI log level choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum LogLevelArg {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// CLI log format choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum LogFormatArg {
    Pretty,
    Compact,
    Json,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_no_subcommand_parses() {
        let cli = Cli::try_parse_from(["county-health"]).unwrap();
        assert!(cli.command.is_none());
    }

    #[test]
    fn test_run_flags() {
        let cli = Cli::try_parse_from([
            "county-health",
            "run",
            "--data-dir",
            "fixtures",
            "--min-metrics",
            "3",
            "--year-min",
            "2016",
            "--no-backfill",
            "--core-only",
            "--dry-run",
        ])
        .unwrap();
        let Some(Command::Run(args)) = cli.command else {
            panic!("expected run");
        };
        assert_eq!(args.data_dir, Some(PathBuf::from("fixtures")));
        assert_eq!(args.min_metrics, Some(3));
        assert_eq!(args.year_min, Some(2016));
        assert_eq!(args.year_max, None);
        assert!(args.no_backfill && args.core_only && args.dry_run);
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let cli =
            Cli::try_parse_from(["county-health", "metrics", "--log-format", "json"]).unwrap();
        assert!(matches!(cli.log_format, LogFormatArg::Json));
        assert!(matches!(cli.command, Some(Command::Metrics)));
    }
}
