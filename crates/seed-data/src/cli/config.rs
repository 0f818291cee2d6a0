//! Directory and logging settings loaded via OrthoConfig.

use camino::{Utf8Path, Utf8PathBuf};
use ortho_config::OrthoConfig;
use serde::Deserialize;

/// Default directory receiving staged exports.
pub const DEFAULT_STAGING_DIR: &str = "./seeds";

/// Default directory holding canonical seed files.
pub const DEFAULT_CANONICAL_DIR: &str = "./dbt/seeds";

/// Settings shared by every `seed-data` subcommand.
///
/// Values come from `SEED_DATA_*` environment variables or a configuration
/// file; command-line flags override them.
#[derive(Debug, Clone, Deserialize, OrthoConfig)]
#[ortho_config(prefix = "SEED_DATA")]
pub struct SeedDataSettings {
    /// Directory receiving `<table>_api_<ts>.csv` exports.
    pub staging_dir: Option<Utf8PathBuf>,
    /// Directory holding canonical `<table>.csv` files.
    pub canonical_dir: Option<Utf8PathBuf>,
    /// Emit logs as JSON lines.
    #[ortho_config(default = false)]
    pub json_logs: bool,
}

impl SeedDataSettings {
    /// Returns the staging directory, falling back to [`DEFAULT_STAGING_DIR`].
    #[must_use]
    pub fn staging_dir(&self) -> &Utf8Path {
        self.staging_dir
            .as_deref()
            .unwrap_or_else(|| Utf8Path::new(DEFAULT_STAGING_DIR))
    }

    /// Returns the canonical directory, falling back to
    /// [`DEFAULT_CANONICAL_DIR`].
    #[must_use]
    pub fn canonical_dir(&self) -> &Utf8Path {
        self.canonical_dir
            .as_deref()
            .unwrap_or_else(|| Utf8Path::new(DEFAULT_CANONICAL_DIR))
    }
}
