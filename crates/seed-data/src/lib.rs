//! Synthetic registration and order data for seeding a warehouse demo.
//!
//! The crate fabricates customer registrations (`cadastros`) and orders
//! (`pedidos`) over a date range, exports them as timestamped staging CSV
//! files, and merges staged batches into canonical per-table seed files with
//! deduplication and backups.
//!
//! # Overview
//!
//! - [`Period`] validates the requested date range.
//! - [`PeriodGenerator`] builds linked batches through a [`RecordFactory`];
//!   the same period and seed always yield the same records.
//! - [`CsvExporter`] writes `<table>_api_<timestamp>.csv` staging files.
//! - [`SeedConsolidator`] merges staged files into `<table>.csv` through a
//!   [`SeedStore`].
//! - [`cli`] wires these together for the `seed-data` binary.
//!
//! # Example
//!
//! ```
//! use chrono::NaiveDate;
//! use seed_data::{Period, PeriodGenerator};
//!
//! let today = NaiveDate::from_ymd_opt(2025, 6, 24).expect("valid date");
//! let start = NaiveDate::from_ymd_opt(2025, 6, 10).expect("valid date");
//! let period = Period::resolve(start, None, today).expect("valid period");
//!
//! let result = PeriodGenerator::new().generate(&period, Some(42));
//!
//! assert_eq!(result.stats.order_count, result.data.orders.len());
//! for order in &result.data.orders {
//!     assert!(period.contains(order.ordered_on));
//!     assert_eq!(order.coupon.is_some(), !order.discount_value.is_zero());
//! }
//! ```

mod atomic_io;
pub mod cli;
mod consolidate;
mod error;
mod export;
mod factory;
mod generator;
mod period;
mod record;
mod table;
mod timestamp;

pub use consolidate::{
    ConsolidationReport, ConsolidationSummary, DirSeedStore, FileListing, Location,
    SeedConsolidator, SeedStore, SkippedFile, TableOutcome, TableSummary,
};
pub use error::{ConsolidationError, ExportError, PeriodError};
pub use export::{CsvExporter, ExportedFiles};
pub use factory::{MAX_NATIONAL_ID_ATTEMPTS, RecordFactory};
pub use generator::{
    Batches, GenerationResult, GenerationStats, ORDER_COUNT_RANGE, PeriodGenerator,
    REGISTRATION_COUNT_RANGE,
};
pub use period::{DEFAULT_RECENT_DAYS, MAX_RECENT_DAYS, Period};
pub use record::{
    COUNTRY, EMAIL_DOMAIN, Gender, NationalId, ORDER_COLUMNS, Order, OrderStatus,
    REGISTRATION_COLUMNS, Registration,
};
pub use table::{SeedTable, UnknownTableError};
pub use timestamp::{BatchTimestamp, TIMESTAMP_FORMAT};
