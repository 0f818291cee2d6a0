//! Error types for the seed-data crate.
//!
//! This module defines semantic error enums for period validation, CSV
//! export, and seed consolidation, following the project's error handling
//! conventions with `thiserror`. Generation itself is infallible.

use camino::Utf8PathBuf;
use chrono::NaiveDate;
use thiserror::Error;

/// Errors raised while validating a requested generation period.
///
/// These are client input errors: callers reject the request before any
/// generation happens.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PeriodError {
    /// The period starts after it ends.
    #[error("period start {start} must not be after period end {end}")]
    StartAfterEnd {
        /// Requested start date.
        start: NaiveDate,
        /// Requested end date.
        end: NaiveDate,
    },

    /// The period starts in the future.
    #[error("period start {start} must not be in the future (today is {today})")]
    StartInFuture {
        /// Requested start date.
        start: NaiveDate,
        /// Date the request was evaluated against.
        today: NaiveDate,
    },

    /// The "recent days" window is outside the supported range.
    #[error("recent days must be between 1 and {max}, got {days}")]
    InvalidRecentDays {
        /// Requested number of days.
        days: u32,
        /// Largest accepted number of days.
        max: u32,
    },
}

/// Errors that can occur while exporting a batch to staging CSV files.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExportError {
    /// The destination directory could not be created or opened.
    #[error("failed to prepare export directory '{path}': {message}")]
    Directory {
        /// Destination directory.
        path: Utf8PathBuf,
        /// Description of the I/O error.
        message: String,
    },

    /// A record could not be serialized to CSV.
    #[error("failed to serialize {table} record: {message}")]
    Serialize {
        /// Table being serialized.
        table: &'static str,
        /// Description of the serialization error.
        message: String,
    },

    /// A staging file could not be written.
    #[error("failed to write export file '{path}': {message}")]
    Write {
        /// Path of the file being written.
        path: Utf8PathBuf,
        /// Description of the I/O error.
        message: String,
    },
}

/// Errors that abort consolidation of a table, or the consolidator itself.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConsolidationError {
    /// A required directory does not exist or cannot be opened.
    #[error("{role} directory not found at '{path}': {message}")]
    MissingDirectory {
        /// Which directory was missing (`staging` or `canonical`).
        role: &'static str,
        /// Configured directory path.
        path: Utf8PathBuf,
        /// Description of the I/O error.
        message: String,
    },

    /// A directory listing could not be read.
    #[error("failed to list {role} directory: {message}")]
    Listing {
        /// Which directory was being listed.
        role: &'static str,
        /// Description of the I/O error.
        message: String,
    },

    /// The canonical file exists but could not be loaded.
    #[error("failed to load canonical file '{file}': {message}")]
    Load {
        /// Canonical file name.
        file: String,
        /// Description of the failure.
        message: String,
    },

    /// A deduplication key column is absent from the merged data.
    #[error("table '{table}' has no '{column}' column to deduplicate on")]
    MissingColumn {
        /// Table being consolidated.
        table: &'static str,
        /// Missing column name.
        column: &'static str,
    },

    /// The existing canonical file could not be renamed to its backup.
    #[error("failed to back up '{file}' to '{backup}': {message}")]
    Backup {
        /// Canonical file name.
        file: String,
        /// Intended backup file name.
        backup: String,
        /// Description of the I/O error.
        message: String,
    },

    /// The consolidated canonical file could not be written.
    #[error("failed to write canonical file '{file}': {message}")]
    Write {
        /// Canonical file name.
        file: String,
        /// Description of the failure.
        message: String,
    },
}
