//! Seed tables and the file names derived from them.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::timestamp::BatchTimestamp;

const STAGED_INFIX: &str = "_api_";
const CSV_EXTENSION: &str = ".csv";
const BACKUP_INFIX: &str = ".csv.backup_";

/// A table maintained in the canonical seed directory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SeedTable {
    /// Customer registrations (`cadastros`).
    #[serde(rename = "cadastros")]
    Registrations,
    /// Orders (`pedidos`).
    #[serde(rename = "pedidos")]
    Orders,
}

/// Raised when a table name is not recognised.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown seed table '{name}' (expected cadastros or pedidos)")]
pub struct UnknownTableError {
    /// The rejected name.
    pub name: String,
}

impl SeedTable {
    /// Tables consolidated by a full run, in processing order.
    pub const ALL: [Self; 2] = [Self::Registrations, Self::Orders];

    /// Returns the table name used in file names.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Registrations => "cadastros",
            Self::Orders => "pedidos",
        }
    }

    /// Columns whose combined values identify a row.
    #[must_use]
    pub const fn key_columns(self) -> &'static [&'static str] {
        match self {
            Self::Registrations => &["id", "cpf"],
            Self::Orders => &["id_pedido"],
        }
    }

    /// Column ordering rows from newest to oldest before deduplication.
    #[must_use]
    pub const fn date_column(self) -> &'static str {
        match self {
            Self::Registrations => "data_cadastro",
            Self::Orders => "data_pedido",
        }
    }

    /// Returns `<table>.csv`.
    #[must_use]
    pub fn canonical_file_name(self) -> String {
        format!("{}{CSV_EXTENSION}", self.name())
    }

    /// Returns `<table>_api_<timestamp>.csv`.
    #[must_use]
    pub fn staged_file_name(self, timestamp: &BatchTimestamp) -> String {
        format!("{}{STAGED_INFIX}{timestamp}{CSV_EXTENSION}", self.name())
    }

    /// Returns `<table>.csv.backup_<timestamp>`.
    #[must_use]
    pub fn backup_file_name(self, timestamp: &BatchTimestamp) -> String {
        format!("{}{BACKUP_INFIX}{timestamp}", self.name())
    }

    /// Reports whether `file_name` matches `<table>_api_*.csv`.
    ///
    /// # Example
    ///
    /// ```
    /// use seed_data::SeedTable;
    ///
    /// assert!(SeedTable::Orders.is_staged_file("pedidos_api_20250624_101500.csv"));
    /// assert!(!SeedTable::Orders.is_staged_file("cadastros_api_20250624_101500.csv"));
    /// assert!(!SeedTable::Orders.is_staged_file("pedidos.csv"));
    /// ```
    #[must_use]
    pub fn is_staged_file(self, file_name: &str) -> bool {
        file_name
            .strip_prefix(self.name())
            .and_then(|rest| rest.strip_prefix(STAGED_INFIX))
            .is_some_and(|rest| rest.ends_with(CSV_EXTENSION))
    }
}

impl fmt::Display for SeedTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for SeedTable {
    type Err = UnknownTableError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|table| table.name() == value)
            .ok_or_else(|| UnknownTableError {
                name: value.to_owned(),
            })
    }
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};
    use rstest::rstest;

    use super::*;

    fn timestamp() -> BatchTimestamp {
        let at = Utc
            .with_ymd_and_hms(2025, 6, 24, 10, 15, 0)
            .single()
            .expect("valid time");
        BatchTimestamp::from_datetime(&at)
    }

    #[rstest]
    #[case(SeedTable::Registrations, "cadastros_api_20250624_101500.csv")]
    #[case(SeedTable::Orders, "pedidos_api_20250624_101500.csv")]
    fn staged_names_embed_timestamp(#[case] table: SeedTable, #[case] expected: &str) {
        let name = table.staged_file_name(&timestamp());
        assert_eq!(name, expected);
        assert!(table.is_staged_file(&name));
    }

    #[rstest]
    #[case("cadastros_api_.csv", true)]
    #[case("cadastros_api_manual.csv", true)]
    #[case("cadastros.csv", false)]
    #[case("cadastros_api_20250624_101500.csv.tmp", false)]
    #[case(".cadastros_api_20250624_101500.csv.tmp.1.2.3", false)]
    #[case("cadastros.csv.backup_20250624_101500", false)]
    #[case("xcadastros_api_1.csv", false)]
    fn staged_pattern_matching(#[case] file_name: &str, #[case] matches: bool) {
        assert_eq!(SeedTable::Registrations.is_staged_file(file_name), matches);
    }

    #[test]
    fn backup_name_follows_canonical_name() {
        assert_eq!(
            SeedTable::Orders.backup_file_name(&timestamp()),
            "pedidos.csv.backup_20250624_101500"
        );
        assert_eq!(SeedTable::Orders.canonical_file_name(), "pedidos.csv");
    }

    #[rstest]
    #[case("cadastros", Ok(SeedTable::Registrations))]
    #[case("pedidos", Ok(SeedTable::Orders))]
    #[case("clientes", Err(UnknownTableError { name: "clientes".to_owned() }))]
    fn parses_table_names(#[case] input: &str, #[case] expected: Result<SeedTable, UnknownTableError>) {
        assert_eq!(input.parse::<SeedTable>(), expected);
    }
}
