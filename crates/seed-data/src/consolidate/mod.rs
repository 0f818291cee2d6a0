//! Merging of staged CSV batches into canonical seed files.
//!
//! Per table, a run moves through: no pending files, loaded, deduplicated,
//! backed up, written, cleaned. The backup is a rename of the previous
//! canonical file and the new file is written in place afterwards, so a crash
//! between the two leaves only the backup behind.

mod frame;
mod store;

use std::sync::Arc;

use camino::Utf8Path;
use mockable::{Clock, DefaultClock};
use serde::Serialize;
use tracing::{error, info, warn};

use crate::error::ConsolidationError;
use crate::table::SeedTable;
use crate::timestamp::BatchTimestamp;
use frame::CsvFrame;

#[cfg(test)]
pub(crate) use store::memory::MemoryStore;
pub use store::{DirSeedStore, Location, SeedStore};

const CSV_EXTENSION: &str = ".csv";

/// A staged file that could not be loaded and was left in place.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SkippedFile {
    /// Staged file name.
    pub file: String,
    /// Why loading failed.
    pub reason: String,
}

/// Details of a table that was rewritten.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConsolidationReport {
    /// Staged files merged and then removed (or attempted).
    pub merged_files: Vec<String>,
    /// Staged files left in place because they failed to load.
    pub skipped: Vec<SkippedFile>,
    /// Rows in the canonical file before the run; `None` if it was absent.
    pub canonical_rows: Option<usize>,
    /// Rows after concatenating canonical and staged data.
    pub rows_before_dedup: usize,
    /// Rows written to the canonical file.
    pub rows_written: usize,
    /// Backup the previous canonical file was renamed to.
    pub backup_file: Option<String>,
    /// Merged staged files that could not be deleted.
    pub cleanup_failures: Vec<String>,
}

/// Result of consolidating one table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "camelCase")]
pub enum TableOutcome {
    /// No staged file matched the table; nothing changed.
    NoPending,
    /// Staged files existed, none could be loaded, and there was no
    /// canonical file to rewrite; nothing changed.
    NothingLoaded {
        /// Files that failed to load.
        skipped: Vec<SkippedFile>,
    },
    /// The canonical file was rewritten.
    Consolidated(ConsolidationReport),
}

/// Outcome of one table within [`SeedConsolidator::consolidate_all`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableSummary {
    /// Table processed.
    pub table: SeedTable,
    /// Outcome, or the error that aborted the table.
    pub result: Result<TableOutcome, ConsolidationError>,
}

/// Results of a full consolidation run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConsolidationSummary {
    /// One entry per table, in processing order.
    pub tables: Vec<TableSummary>,
}

impl ConsolidationSummary {
    /// Number of tables processed without error.
    #[must_use]
    pub fn succeeded(&self) -> usize {
        self.tables
            .iter()
            .filter(|summary| summary.result.is_ok())
            .count()
    }

    /// Number of tables processed.
    #[must_use]
    pub fn total(&self) -> usize {
        self.tables.len()
    }

    /// Reports whether every table succeeded.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.succeeded() == self.total()
    }
}

/// CSV files present in both directories.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FileListing {
    /// Description of the staging directory.
    pub staging_dir: String,
    /// CSV files in the staging directory.
    pub staging_files: Vec<String>,
    /// Description of the canonical directory.
    pub canonical_dir: String,
    /// CSV files in the canonical directory.
    pub canonical_files: Vec<String>,
}

/// Merges staged batches into canonical per-table seed files.
///
/// # Example
///
/// ```no_run
/// use camino::Utf8Path;
/// use seed_data::SeedConsolidator;
///
/// let consolidator = SeedConsolidator::open(Utf8Path::new("seeds"), Utf8Path::new("dbt/seeds"))
///     .expect("directories exist");
/// let summary = consolidator.consolidate_all();
/// println!("{}/{} tables consolidated", summary.succeeded(), summary.total());
/// ```
pub struct SeedConsolidator<S = DirSeedStore> {
    store: S,
    clock: Arc<dyn Clock>,
}

impl SeedConsolidator<DirSeedStore> {
    /// Opens the staging and canonical directories.
    ///
    /// # Errors
    ///
    /// Returns [`ConsolidationError::MissingDirectory`] when either directory
    /// is absent.
    pub fn open(staging: &Utf8Path, canonical: &Utf8Path) -> Result<Self, ConsolidationError> {
        let store = DirSeedStore::open(staging, canonical)?;
        info!(staging = %staging, canonical = %canonical, "opened seed directories");
        Ok(Self::with_store(store, Arc::new(DefaultClock)))
    }
}

impl<S: SeedStore> SeedConsolidator<S> {
    /// Builds a consolidator over `store`, timestamping backups with `clock`.
    #[must_use]
    pub fn with_store(store: S, clock: Arc<dyn Clock>) -> Self {
        Self { store, clock }
    }

    /// Replaces the clock used for backup timestamps.
    #[must_use]
    pub fn with_clock(self, clock: Arc<dyn Clock>) -> Self {
        Self { clock, ..self }
    }

    /// Returns the underlying store.
    #[must_use]
    pub const fn store(&self) -> &S {
        &self.store
    }

    /// Consolidates every table in [`SeedTable::ALL`].
    ///
    /// Files are listed first for diagnostics. A failing table is logged and
    /// recorded without stopping the others.
    pub fn consolidate_all(&self) -> ConsolidationSummary {
        info!("starting seed consolidation");
        if let Err(err) = self.list_files() {
            warn!(error = %err, "could not list seed files");
        }

        let tables: Vec<TableSummary> = SeedTable::ALL
            .into_iter()
            .map(|table| {
                let result = self.consolidate_table(table);
                if let Err(err) = &result {
                    error!(table = %table, error = %err, "table consolidation failed");
                }
                TableSummary { table, result }
            })
            .collect();

        let summary = ConsolidationSummary { tables };
        info!(
            succeeded = summary.succeeded(),
            total = summary.total(),
            "seed consolidation finished"
        );
        summary
    }

    /// Merges the staged files of `table` into its canonical file.
    ///
    /// # Errors
    ///
    /// Returns [`ConsolidationError`] when the staging directory cannot be
    /// listed, the canonical file cannot be loaded, a key column is missing,
    /// or the backup or write fails. Staged files that fail to load are
    /// reported in the outcome instead: they drop out of the merge and stay
    /// in the staging directory, while the canonical file is still
    /// deduplicated, backed up, and rewritten.
    pub fn consolidate_table(&self, table: SeedTable) -> Result<TableOutcome, ConsolidationError> {
        let staged = self.staged_files(table)?;
        if staged.is_empty() {
            info!(table = %table, "no staged files to consolidate");
            return Ok(TableOutcome::NoPending);
        }
        info!(table = %table, files = staged.len(), "consolidating staged files");

        let canonical_name = table.canonical_file_name();
        let canonical = self.load_canonical(table, &canonical_name)?;
        let (loaded, merged_files, skipped) = self.load_staged(&staged);
        if merged_files.is_empty() {
            warn!(table = %table, skipped = skipped.len(), "no staged file could be loaded");
            if canonical.is_none() {
                return Ok(TableOutcome::NothingLoaded { skipped });
            }
        }

        let canonical_rows = canonical.as_ref().map(CsvFrame::row_count);
        let mut merged = CsvFrame::concat(canonical.into_iter().chain(loaded).collect());
        let rows_before_dedup = merged.row_count();
        deduplicate(table, &mut merged)?;
        let rows_written = merged.row_count();

        let backup_file = canonical_rows
            .map(|_| self.back_up(table, &canonical_name))
            .transpose()?;
        self.write_canonical(&canonical_name, &merged)?;
        info!(table = %table, file = %canonical_name, rows = rows_written, "wrote canonical file");

        let cleanup_failures = self.remove_staged(&merged_files);
        Ok(TableOutcome::Consolidated(ConsolidationReport {
            merged_files,
            skipped,
            canonical_rows,
            rows_before_dedup,
            rows_written,
            backup_file,
            cleanup_failures,
        }))
    }

    /// Logs and returns the CSV files in both directories.
    ///
    /// # Errors
    ///
    /// Returns [`ConsolidationError::Listing`] when a directory cannot be
    /// read.
    pub fn list_files(&self) -> Result<FileListing, ConsolidationError> {
        let staging_files = self.csv_files(Location::Staging)?;
        let canonical_files = self.csv_files(Location::Canonical)?;
        let listing = FileListing {
            staging_dir: self.store.describe(Location::Staging),
            staging_files,
            canonical_dir: self.store.describe(Location::Canonical),
            canonical_files,
        };
        log_directory(&listing.staging_dir, &listing.staging_files);
        log_directory(&listing.canonical_dir, &listing.canonical_files);
        Ok(listing)
    }

    fn list(&self, location: Location) -> Result<Vec<String>, ConsolidationError> {
        let mut names =
            self.store
                .list(location)
                .map_err(|err| ConsolidationError::Listing {
                    role: location.role(),
                    message: err.to_string(),
                })?;
        names.sort();
        Ok(names)
    }

    fn csv_files(&self, location: Location) -> Result<Vec<String>, ConsolidationError> {
        let mut names = self.list(location)?;
        names.retain(|name| name.ends_with(CSV_EXTENSION));
        Ok(names)
    }

    fn staged_files(&self, table: SeedTable) -> Result<Vec<String>, ConsolidationError> {
        let mut names = self.list(Location::Staging)?;
        names.retain(|name| table.is_staged_file(name));
        Ok(names)
    }

    fn load_canonical(
        &self,
        table: SeedTable,
        name: &str,
    ) -> Result<Option<CsvFrame>, ConsolidationError> {
        let to_error = |message: String| ConsolidationError::Load {
            file: name.to_owned(),
            message,
        };
        let present = self
            .store
            .exists(Location::Canonical, name)
            .map_err(|err| to_error(err.to_string()))?;
        if !present {
            warn!(table = %table, file = %name, "canonical file not found; starting fresh");
            return Ok(None);
        }
        let text = self
            .store
            .read_to_string(Location::Canonical, name)
            .map_err(|err| to_error(err.to_string()))?;
        let frame = CsvFrame::parse(&text).map_err(|err| to_error(err.to_string()))?;
        info!(table = %table, file = %name, rows = frame.row_count(), "loaded canonical file");
        Ok(Some(frame))
    }

    fn load_staged(&self, staged: &[String]) -> (Vec<CsvFrame>, Vec<String>, Vec<SkippedFile>) {
        let mut frames = Vec::with_capacity(staged.len());
        let mut merged = Vec::with_capacity(staged.len());
        let mut skipped = Vec::new();
        for name in staged {
            let loaded = self
                .store
                .read_to_string(Location::Staging, name)
                .map_err(|err| err.to_string())
                .and_then(|text| CsvFrame::parse(&text).map_err(|err| err.to_string()));
            match loaded {
                Ok(frame) => {
                    info!(file = %name, rows = frame.row_count(), "loaded staged file");
                    frames.push(frame);
                    merged.push(name.clone());
                }
                Err(reason) => {
                    error!(file = %name, error = %reason, "skipping staged file");
                    skipped.push(SkippedFile {
                        file: name.clone(),
                        reason,
                    });
                }
            }
        }
        (frames, merged, skipped)
    }

    fn back_up(&self, table: SeedTable, canonical_name: &str) -> Result<String, ConsolidationError> {
        let backup = table.backup_file_name(&BatchTimestamp::now(self.clock.as_ref()));
        self.store
            .rename(Location::Canonical, canonical_name, &backup)
            .map_err(|err| ConsolidationError::Backup {
                file: canonical_name.to_owned(),
                backup: backup.clone(),
                message: err.to_string(),
            })?;
        info!(table = %table, backup = %backup, "backed up canonical file");
        Ok(backup)
    }

    fn write_canonical(&self, name: &str, frame: &CsvFrame) -> Result<(), ConsolidationError> {
        let to_error = |message: String| ConsolidationError::Write {
            file: name.to_owned(),
            message,
        };
        let contents = frame.to_csv().map_err(|err| to_error(err.to_string()))?;
        self.store
            .write(Location::Canonical, name, &contents)
            .map_err(|err| to_error(err.to_string()))
    }

    fn remove_staged(&self, merged: &[String]) -> Vec<String> {
        let mut failures = Vec::new();
        for name in merged {
            match self.store.remove(Location::Staging, name) {
                Ok(()) => info!(file = %name, "removed staged file"),
                Err(err) => {
                    error!(file = %name, error = %err, "failed to remove staged file");
                    failures.push(name.clone());
                }
            }
        }
        failures
    }
}

fn deduplicate(table: SeedTable, frame: &mut CsvFrame) -> Result<(), ConsolidationError> {
    frame.sort_newest_first(table.date_column());
    let removed = frame
        .retain_first_by(table.key_columns())
        .map_err(|column| ConsolidationError::MissingColumn {
            table: table.name(),
            column,
        })?;
    info!(
        table = %table,
        keys = %table.key_columns().join(", "),
        removed,
        remaining = frame.row_count(),
        "deduplicated rows"
    );
    Ok(())
}

fn log_directory(description: &str, files: &[String]) {
    if files.is_empty() {
        info!(dir = %description, "no csv files");
    }
    for file in files {
        info!(dir = %description, file = %file, "found csv file");
    }
}
