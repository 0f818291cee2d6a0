//! Command-line front end for generation, export, and consolidation.
//!
//! The `seed-data` binary parses a [`Cli`], resolves [`Directories`] from the
//! loaded [`SeedDataSettings`], and hands the subcommand to a [`Runner`]. The
//! runner returns a serializable [`Report`] so the whole flow can be driven in
//! tests without spawning a process.

mod config;
mod error;

use std::io::Write;
use std::sync::Arc;

use camino::Utf8PathBuf;
use chrono::{DateTime, Local, NaiveDate};
use clap::{Args, Parser, Subcommand};
use mockable::Clock;
use serde::Serialize;
use tracing::info;

use crate::consolidate::{
    ConsolidationSummary, FileListing, SeedConsolidator, TableOutcome, TableSummary,
};
use crate::export::{CsvExporter, ExportedFiles};
use crate::generator::{GenerationResult, PeriodGenerator};
use crate::period::{DEFAULT_RECENT_DAYS, Period};
use crate::table::SeedTable;

pub use config::{DEFAULT_CANONICAL_DIR, DEFAULT_STAGING_DIR, SeedDataSettings};
pub use error::CliError;

/// First day covered by `backfill`.
pub const BACKFILL_START: NaiveDate = match NaiveDate::from_ymd_opt(2025, 6, 10) {
    Some(date) => date,
    None => NaiveDate::MIN,
};

/// `seed-data` command arguments.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "seed-data",
    about = "Generate synthetic cadastros/pedidos seeds and consolidate staged CSV batches",
    version
)]
pub struct Cli {
    /// Directory receiving staged exports.
    #[arg(long, global = true, value_name = "dir")]
    pub staging_dir: Option<Utf8PathBuf>,
    /// Directory holding canonical seed files.
    #[arg(long, global = true, value_name = "dir")]
    pub canonical_dir: Option<Utf8PathBuf>,
    /// Emit logs as JSON lines.
    #[arg(long, global = true)]
    pub json_logs: bool,
    /// Subcommand to run.
    #[command(subcommand)]
    pub command: Command,
}

/// Subcommands of `seed-data`.
#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// Generate records for an explicit period.
    Generate(GenerateArgs),
    /// Generate records for the last few days.
    Recent(RecentArgs),
    /// Generate records from the project launch date until today.
    Backfill(BackfillArgs),
    /// Merge staged batches into the canonical seed files.
    Consolidate(ConsolidateArgs),
    /// List the CSV files in the staging and canonical directories.
    List,
}

/// Arguments of `generate`.
#[derive(Debug, Clone, Args)]
pub struct GenerateArgs {
    /// First day of the period.
    #[arg(long, value_name = "YYYY-MM-DD")]
    pub start: NaiveDate,
    /// Last day of the period; defaults to today.
    #[arg(long, value_name = "YYYY-MM-DD")]
    pub end: Option<NaiveDate>,
    /// Seed making the output reproducible.
    #[arg(long)]
    pub seed: Option<u64>,
    /// Export the batches to the staging directory.
    #[arg(long)]
    pub save_csv: bool,
}

/// Arguments of `recent`.
#[derive(Debug, Clone, Args)]
pub struct RecentArgs {
    /// Number of days before today to cover (1 to 30).
    #[arg(long, default_value_t = DEFAULT_RECENT_DAYS)]
    pub days: u32,
    /// Seed making the output reproducible.
    #[arg(long)]
    pub seed: Option<u64>,
    /// Export the batches to the staging directory.
    #[arg(long)]
    pub save_csv: bool,
}

/// Arguments of `backfill`.
#[derive(Debug, Clone, Args)]
pub struct BackfillArgs {
    /// Seed making the output reproducible.
    #[arg(long)]
    pub seed: Option<u64>,
    /// Skip exporting the batches.
    #[arg(long)]
    pub no_save_csv: bool,
}

/// Arguments of `consolidate`.
#[derive(Debug, Clone, Args)]
pub struct ConsolidateArgs {
    /// Consolidate a single table (`cadastros` or `pedidos`).
    #[arg(long)]
    pub table: Option<SeedTable>,
}

/// Staging and canonical directories after applying overrides.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Directories {
    /// Staging directory.
    pub staging: Utf8PathBuf,
    /// Canonical directory.
    pub canonical: Utf8PathBuf,
}

impl Cli {
    /// Resolves directories, preferring flags over `settings`.
    #[must_use]
    pub fn directories(&self, settings: &SeedDataSettings) -> Directories {
        Directories {
            staging: self
                .staging_dir
                .clone()
                .unwrap_or_else(|| settings.staging_dir().to_path_buf()),
            canonical: self
                .canonical_dir
                .clone()
                .unwrap_or_else(|| settings.canonical_dir().to_path_buf()),
        }
    }

    /// Reports whether JSON logs were requested by flag or settings.
    #[must_use]
    pub const fn json_logs(&self, settings: &SeedDataSettings) -> bool {
        self.json_logs || settings.json_logs
    }
}

/// Parameters echoed back with generated data.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestParameters {
    /// Resolved first day.
    pub start: NaiveDate,
    /// Resolved last day.
    pub end: NaiveDate,
    /// Whether the batches were exported.
    pub save_csv: bool,
    /// Seed supplied by the caller.
    pub seed: Option<u64>,
}

/// Metadata describing the request that produced a generation response.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestInfo {
    /// When the response was produced.
    pub generated_at: DateTime<Local>,
    /// Subcommand name.
    pub command: &'static str,
    /// Resolved parameters.
    pub parameters: RequestParameters,
}

/// Generated data plus export and request details.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationResponse {
    /// Period, stats, and records.
    #[serde(flatten)]
    pub result: GenerationResult,
    /// Exported staging files, when requested.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub csv_files: Option<ExportedFiles>,
    /// Request metadata.
    pub request: RequestInfo,
}

/// One table's entry in a [`ConsolidationResponse`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TableReport {
    /// Table processed.
    pub table: SeedTable,
    /// Outcome when the table succeeded.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub outcome: Option<TableOutcome>,
    /// Error when the table failed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Summary of a `consolidate` run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConsolidationResponse {
    /// Human-readable `n/m tables consolidated` line.
    pub message: String,
    /// Tables processed without error.
    pub succeeded: usize,
    /// Tables processed.
    pub total: usize,
    /// Per-table results.
    pub tables: Vec<TableReport>,
}

impl From<ConsolidationSummary> for ConsolidationResponse {
    fn from(summary: ConsolidationSummary) -> Self {
        let succeeded = summary.succeeded();
        let total = summary.total();
        let tables = summary
            .tables
            .into_iter()
            .map(|TableSummary { table, result }| match result {
                Ok(outcome) => TableReport {
                    table,
                    outcome: Some(outcome),
                    error: None,
                },
                Err(err) => TableReport {
                    table,
                    outcome: None,
                    error: Some(err.to_string()),
                },
            })
            .collect();
        Self {
            message: format!("{succeeded}/{total} tables consolidated"),
            succeeded,
            total,
            tables,
        }
    }
}

/// Output of a subcommand.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Report {
    /// Output of `generate`, `recent`, and `backfill`.
    Generation(Box<GenerationResponse>),
    /// Output of `consolidate`.
    Consolidation(ConsolidationResponse),
    /// Output of `list`.
    Listing(FileListing),
}

impl Report {
    /// Reports whether the command fully succeeded.
    #[must_use]
    pub fn is_success(&self) -> bool {
        match self {
            Self::Consolidation(response) => response.succeeded == response.total,
            Self::Generation(_) | Self::Listing(_) => true,
        }
    }

    /// Writes the report as pretty JSON followed by a newline.
    ///
    /// # Errors
    ///
    /// Returns [`CliError::Output`] if serialization or the write fails.
    pub fn write_json<W: Write>(&self, mut out: W) -> Result<(), CliError> {
        let to_error = |message: String| CliError::Output { message };
        serde_json::to_writer_pretty(&mut out, self).map_err(|err| to_error(err.to_string()))?;
        writeln!(out).map_err(|err| to_error(err.to_string()))
    }
}

/// Executes subcommands against a pair of directories.
#[derive(Clone)]
pub struct Runner {
    directories: Directories,
    clock: Arc<dyn Clock>,
}

impl Runner {
    /// Creates a runner; `clock` supplies "today" and export timestamps.
    #[must_use]
    pub fn new(directories: Directories, clock: Arc<dyn Clock>) -> Self {
        Self { directories, clock }
    }

    /// Runs `command`.
    ///
    /// # Errors
    ///
    /// Returns [`CliError`] when the period is invalid, an export fails, or
    /// the seed directories cannot be opened or listed. Per-table
    /// consolidation failures are reported in the [`Report`] instead.
    pub fn run(&self, command: &Command) -> Result<Report, CliError> {
        let today = self.clock.local().date_naive();
        match command {
            Command::Generate(args) => {
                let period = Period::resolve(args.start, args.end, today)?;
                self.generate("generate", period, args.seed, args.save_csv)
            }
            Command::Recent(args) => {
                let period = Period::recent(args.days, today)?;
                self.generate("recent", period, args.seed, args.save_csv)
            }
            Command::Backfill(args) => {
                let period = Period::resolve(BACKFILL_START, None, today)?;
                self.generate("backfill", period, args.seed, !args.no_save_csv)
            }
            Command::Consolidate(args) => self.consolidate(args.table),
            Command::List => Ok(Report::Listing(self.consolidator()?.list_files()?)),
        }
    }

    fn generate(
        &self,
        command: &'static str,
        period: Period,
        seed: Option<u64>,
        save_csv: bool,
    ) -> Result<Report, CliError> {
        let result = PeriodGenerator::new().generate(&period, seed);
        let csv_files = if save_csv {
            let exporter = CsvExporter::new(Arc::clone(&self.clock));
            Some(exporter.export(&result.data, &self.directories.staging)?)
        } else {
            None
        };
        info!(command, saved = save_csv, "generation request completed");

        Ok(Report::Generation(Box::new(GenerationResponse {
            result,
            csv_files,
            request: RequestInfo {
                generated_at: self.clock.local(),
                command,
                parameters: RequestParameters {
                    start: period.start(),
                    end: period.end(),
                    save_csv,
                    seed,
                },
            },
        })))
    }

    fn consolidate(&self, table: Option<SeedTable>) -> Result<Report, CliError> {
        let consolidator = self.consolidator()?;
        let summary = match table {
            Some(single) => ConsolidationSummary {
                tables: vec![TableSummary {
                    table: single,
                    result: consolidator.consolidate_table(single),
                }],
            },
            None => consolidator.consolidate_all(),
        };
        Ok(Report::Consolidation(summary.into()))
    }

    fn consolidator(&self) -> Result<SeedConsolidator, CliError> {
        let consolidator =
            SeedConsolidator::open(&self.directories.staging, &self.directories.canonical)?;
        Ok(consolidator.with_clock(Arc::clone(&self.clock)))
    }
}
