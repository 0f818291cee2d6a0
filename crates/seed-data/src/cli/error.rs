//! Error types for the `seed-data` command-line interface.

use thiserror::Error;

use crate::error::{ConsolidationError, ExportError, PeriodError};

/// Errors surfaced by a `seed-data` subcommand.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CliError {
    /// The requested period was rejected.
    #[error("invalid period: {source}")]
    Period {
        /// Underlying validation error.
        #[from]
        #[source]
        source: PeriodError,
    },
    /// Generated batches could not be exported.
    #[error("export failed: {source}")]
    Export {
        /// Underlying export error.
        #[from]
        #[source]
        source: ExportError,
    },
    /// The consolidator could not be opened or listed.
    #[error("consolidation failed: {source}")]
    Consolidation {
        /// Underlying consolidation error.
        #[from]
        #[source]
        source: ConsolidationError,
    },
    /// Settings could not be loaded.
    #[error("configuration error: {message}")]
    Config {
        /// Description of the loading failure.
        message: String,
    },
    /// The JSON report could not be written.
    #[error("failed to write output: {message}")]
    Output {
        /// Description of the write failure.
        message: String,
    },
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;

    #[test]
    fn period_errors_are_wrapped_with_context() {
        let today = NaiveDate::from_ymd_opt(2025, 6, 24).expect("valid date");
        let start = NaiveDate::from_ymd_opt(2025, 7, 1).expect("valid date");
        let err = CliError::from(PeriodError::StartInFuture { start, today });

        assert_eq!(
            err.to_string(),
            "invalid period: period start 2025-07-01 must not be in the future (today is 2025-06-24)"
        );
    }
}
