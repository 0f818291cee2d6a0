//! An untyped, string-valued CSV table used for merging seed files.
//!
//! Seed files are merged without interpreting their values, so hand-edited
//! canonical files with extra or missing columns still consolidate.

use std::cmp::Ordering;
use std::collections::HashSet;

use csv::{ReaderBuilder, StringRecord, WriterBuilder};
use thiserror::Error;

/// Errors raised while parsing or rendering a [`CsvFrame`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub(crate) enum FrameError {
    /// The input has no header row.
    #[error("file has no header row")]
    MissingHeader,
    /// The CSV reader or writer rejected the data.
    #[error("{message}")]
    Csv {
        /// Description of the CSV error.
        message: String,
    },
}

impl From<csv::Error> for FrameError {
    fn from(err: csv::Error) -> Self {
        Self::Csv {
            message: err.to_string(),
        }
    }
}

/// Rows of strings under a shared header.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct CsvFrame {
    columns: Vec<String>,
    rows: Vec<Vec<String>>,
}

impl CsvFrame {
    /// Parses CSV text whose first record is the header.
    pub(crate) fn parse(text: &str) -> Result<Self, FrameError> {
        let mut reader = ReaderBuilder::new()
            .has_headers(true)
            .from_reader(text.as_bytes());
        let headers = reader.headers()?.clone();
        if headers.is_empty() {
            return Err(FrameError::MissingHeader);
        }
        let columns = headers.iter().map(str::to_owned).collect();
        let rows = reader
            .records()
            .map(|record| record.map(|fields| owned_fields(&fields)))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { columns, rows })
    }

    /// Stacks `frames` in order under the union of their columns.
    ///
    /// Columns keep the order in which they are first seen; cells a frame
    /// lacks are left empty.
    pub(crate) fn concat(frames: Vec<Self>) -> Self {
        let mut columns: Vec<String> = Vec::new();
        for frame in &frames {
            for column in &frame.columns {
                if !columns.contains(column) {
                    columns.push(column.clone());
                }
            }
        }

        let mut rows = Vec::new();
        for frame in frames {
            let mapping: Vec<Option<usize>> = columns
                .iter()
                .map(|column| frame.column_index(column))
                .collect();
            rows.extend(frame.rows.into_iter().map(|row| {
                mapping
                    .iter()
                    .map(|source| {
                        source
                            .and_then(|index| row.get(index))
                            .cloned()
                            .unwrap_or_default()
                    })
                    .collect::<Vec<_>>()
            }));
        }
        Self { columns, rows }
    }

    /// Returns the header.
    pub(crate) fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Returns the number of data rows.
    pub(crate) fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Returns the values of `column`, or `None` if the column is absent.
    pub(crate) fn column_values(&self, column: &str) -> Option<Vec<&str>> {
        let index = self.column_index(column)?;
        Some(
            self.rows
                .iter()
                .map(|row| row.get(index).map_or("", String::as_str))
                .collect(),
        )
    }

    /// Stable-sorts rows by `column` descending with empty values last.
    ///
    /// ISO dates compare correctly as strings. Returns `false`, leaving the
    /// order untouched, when the column is absent.
    pub(crate) fn sort_newest_first(&mut self, column: &str) -> bool {
        let Some(index) = self.column_index(column) else {
            return false;
        };
        self.rows.sort_by(|left_row, right_row| {
            let left = left_row.get(index).map_or("", String::as_str);
            let right = right_row.get(index).map_or("", String::as_str);
            match (left.is_empty(), right.is_empty()) {
                (true, true) => Ordering::Equal,
                (true, false) => Ordering::Greater,
                (false, true) => Ordering::Less,
                (false, false) => right.cmp(left),
            }
        });
        true
    }

    /// Keeps the first row for each distinct combination of `keys`.
    ///
    /// Returns the number of rows dropped, or the first key column missing
    /// from the header.
    pub(crate) fn retain_first_by<'k>(&mut self, keys: &[&'k str]) -> Result<usize, &'k str> {
        let indices = keys
            .iter()
            .map(|key| self.column_index(key).ok_or(*key))
            .collect::<Result<Vec<_>, _>>()?;

        let before = self.rows.len();
        let mut seen: HashSet<Vec<String>> = HashSet::with_capacity(before);
        self.rows.retain(|row| {
            let key = indices
                .iter()
                .map(|index| row.get(*index).cloned().unwrap_or_default())
                .collect();
            seen.insert(key)
        });
        Ok(before - self.rows.len())
    }

    /// Renders the frame as CSV with a header row.
    pub(crate) fn to_csv(&self) -> Result<Vec<u8>, FrameError> {
        let mut writer = WriterBuilder::new().from_writer(Vec::new());
        writer.write_record(&self.columns)?;
        for row in &self.rows {
            writer.write_record(row)?;
        }
        writer.into_inner().map_err(|err| FrameError::Csv {
            message: err.error().to_string(),
        })
    }

    fn column_index(&self, column: &str) -> Option<usize> {
        self.columns.iter().position(|name| name == column)
    }
}

fn owned_fields(record: &StringRecord) -> Vec<String> {
    record.iter().map(str::to_owned).collect()
}
