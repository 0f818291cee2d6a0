//! CSV export of generated batches into the staging directory.

use std::sync::Arc;

use camino::{Utf8Path, Utf8PathBuf};
use cap_std::ambient_authority;
use cap_std::fs::Dir;
use csv::WriterBuilder;
use mockable::{Clock, DefaultClock};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::atomic_io::write_atomic;
use crate::error::ExportError;
use crate::generator::Batches;
use crate::record::{ORDER_COLUMNS, REGISTRATION_COLUMNS};
use crate::table::SeedTable;
use crate::timestamp::BatchTimestamp;

/// Paths written by [`CsvExporter::export`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportedFiles {
    /// Staging file holding the registrations.
    pub registrations_file: Utf8PathBuf,
    /// Staging file holding the orders.
    pub orders_file: Utf8PathBuf,
    /// Timestamp embedded in both file names.
    pub timestamp: BatchTimestamp,
}

/// Writes batches as `<table>_api_<timestamp>.csv` staging files.
///
/// # Example
///
/// ```no_run
/// use camino::Utf8Path;
/// use chrono::NaiveDate;
/// use seed_data::{CsvExporter, Period, PeriodGenerator};
///
/// let period = Period::new(
///     NaiveDate::from_ymd_opt(2025, 6, 10).expect("valid date"),
///     NaiveDate::from_ymd_opt(2025, 6, 24).expect("valid date"),
/// )
/// .expect("valid period");
/// let result = PeriodGenerator::new().generate(&period, Some(42));
///
/// let files = CsvExporter::default()
///     .export(&result.data, Utf8Path::new("seeds"))
///     .expect("export succeeds");
/// assert!(files.registrations_file.as_str().contains("cadastros_api_"));
/// ```
#[derive(Clone)]
pub struct CsvExporter {
    clock: Arc<dyn Clock>,
}

impl Default for CsvExporter {
    fn default() -> Self {
        Self::new(Arc::new(DefaultClock))
    }
}

impl CsvExporter {
    /// Creates an exporter reading export timestamps from `clock`.
    #[must_use]
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self { clock }
    }

    /// Writes both batches into `destination`, creating it when missing.
    ///
    /// # Errors
    ///
    /// Returns [`ExportError`] if the directory cannot be prepared, a record
    /// cannot be serialized, or a file cannot be written.
    pub fn export(
        &self,
        batches: &Batches,
        destination: &Utf8Path,
    ) -> Result<ExportedFiles, ExportError> {
        let dir = open_destination(destination)?;
        let timestamp = BatchTimestamp::now(self.clock.as_ref());

        let registrations = encode(
            SeedTable::Registrations,
            &REGISTRATION_COLUMNS,
            &batches.registrations,
        )?;
        let orders = encode(SeedTable::Orders, &ORDER_COLUMNS, &batches.orders)?;

        let registrations_file = write_staged(
            &dir,
            destination,
            &SeedTable::Registrations.staged_file_name(&timestamp),
            &registrations,
        )?;
        let orders_file = write_staged(
            &dir,
            destination,
            &SeedTable::Orders.staged_file_name(&timestamp),
            &orders,
        )?;

        info!(
            registrations = batches.registrations.len(),
            orders = batches.orders.len(),
            registrations_file = %registrations_file,
            orders_file = %orders_file,
            "exported batches to staging"
        );

        Ok(ExportedFiles {
            registrations_file,
            orders_file,
            timestamp,
        })
    }
}

fn open_destination(destination: &Utf8Path) -> Result<Dir, ExportError> {
    let to_error = |err: std::io::Error| ExportError::Directory {
        path: destination.to_path_buf(),
        message: err.to_string(),
    };
    Dir::create_ambient_dir_all(destination, ambient_authority()).map_err(to_error)?;
    Dir::open_ambient_dir(destination, ambient_authority()).map_err(to_error)
}

/// Serializes `records` under an explicit header so empty batches still
/// carry their column names.
fn encode<T: Serialize>(
    table: SeedTable,
    columns: &[&str],
    records: &[T],
) -> Result<Vec<u8>, ExportError> {
    let to_error = |message: String| ExportError::Serialize {
        table: table.name(),
        message,
    };
    let mut writer = WriterBuilder::new()
        .has_headers(false)
        .from_writer(Vec::new());
    writer
        .write_record(columns)
        .map_err(|err| to_error(err.to_string()))?;
    for record in records {
        writer
            .serialize(record)
            .map_err(|err| to_error(err.to_string()))?;
    }
    writer
        .into_inner()
        .map_err(|err| to_error(err.error().to_string()))
}

fn write_staged(
    dir: &Dir,
    destination: &Utf8Path,
    file_name: &str,
    contents: &[u8],
) -> Result<Utf8PathBuf, ExportError> {
    let path = destination.join(file_name);
    write_atomic(dir, file_name, contents).map_err(|err| ExportError::Write {
        path: path.clone(),
        message: err.to_string(),
    })?;
    Ok(path)
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;
    use crate::generator::PeriodGenerator;
    use crate::period::Period;
    use crate::record::{Order, Registration};

    fn batches() -> Batches {
        let period = Period::new(
            NaiveDate::from_ymd_opt(2025, 6, 10).expect("valid date"),
            NaiveDate::from_ymd_opt(2025, 6, 24).expect("valid date"),
        )
        .expect("valid period");
        PeriodGenerator::new().generate(&period, Some(42)).data
    }

    fn header_line(bytes: &[u8]) -> String {
        String::from_utf8(bytes.to_vec())
            .expect("utf-8 output")
            .lines()
            .next()
            .unwrap_or_default()
            .to_owned()
    }

    fn serialized_header<T: Serialize>(record: &T) -> String {
        let mut writer = csv::Writer::from_writer(Vec::new());
        writer.serialize(record).expect("serialize");
        header_line(&writer.into_inner().expect("flush"))
    }

    #[test]
    fn explicit_header_matches_serde_field_names() {
        let data = batches();
        let registration = data.registrations.first().expect("at least one registration");
        let order = data.orders.first().expect("at least one order");

        assert_eq!(serialized_header(registration), REGISTRATION_COLUMNS.join(","));
        assert_eq!(serialized_header(order), ORDER_COLUMNS.join(","));
    }

    #[test]
    fn encoded_batches_reload_with_same_identifiers() {
        let data = batches();
        let registration_bytes = encode(
            SeedTable::Registrations,
            &REGISTRATION_COLUMNS,
            &data.registrations,
        )
        .expect("encode");
        let registrations: Vec<Registration> =
            csv::Reader::from_reader(registration_bytes.as_slice())
                .deserialize()
                .collect::<Result<_, _>>()
                .expect("decode");
        assert_eq!(registrations, data.registrations);

        let order_bytes = encode(SeedTable::Orders, &ORDER_COLUMNS, &data.orders).expect("encode");
        let orders: Vec<Order> = csv::Reader::from_reader(order_bytes.as_slice())
            .deserialize()
            .collect::<Result<_, _>>()
            .expect("decode");
        assert_eq!(orders, data.orders);
    }

    #[test]
    fn empty_batch_still_writes_header() {
        let bytes = encode::<Order>(SeedTable::Orders, &ORDER_COLUMNS, &[]).expect("encode");
        assert_eq!(
            String::from_utf8(bytes).expect("utf-8 output"),
            format!("{}\n", ORDER_COLUMNS.join(","))
        );
    }

    #[test]
    fn money_keeps_two_decimal_places() {
        let data = batches();
        let bytes = encode(SeedTable::Orders, &ORDER_COLUMNS, &data.orders).expect("encode");
        let mut reader = csv::Reader::from_reader(bytes.as_slice());
        for record in reader.records() {
            let record = record.expect("valid record");
            let value = record.get(2).expect("order value column");
            let (_, cents) = value.split_once('.').expect("decimal point");
            assert_eq!(cents.len(), 2, "unexpected precision in {value}");
        }
    }
}
