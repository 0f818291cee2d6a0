//! `seed-data` command-line entry point.
//!
//! Logs go to stderr; stdout carries only the JSON report.

use std::ffi::OsString;
use std::io::{self, Write};
use std::process::ExitCode;
use std::sync::Arc;

use clap::Parser;
use mockable::DefaultClock;
use ortho_config::OrthoConfig;
use seed_data::cli::{Cli, CliError, Runner, SeedDataSettings};
use tracing::error;
use tracing_subscriber::{EnvFilter, fmt};

fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(&cli) {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(err) => {
            error!(error = %err, "seed-data failed");
            if let Err(write_err) = writeln!(io::stderr().lock(), "{err}") {
                drop(write_err);
            }
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &Cli) -> Result<bool, CliError> {
    let settings = SeedDataSettings::load_from_iter([OsString::from("seed-data")]).map_err(
        |err| CliError::Config {
            message: err.to_string(),
        },
    )?;
    init_tracing(cli.json_logs(&settings));

    let runner = Runner::new(cli.directories(&settings), Arc::new(DefaultClock));
    let report = runner.run(&cli.command)?;
    report.write_json(io::stdout().lock())?;
    Ok(report.is_success())
}

fn init_tracing(json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = fmt().with_env_filter(filter).with_writer(io::stderr);
    let result = if json {
        builder.json().try_init()
    } else {
        builder.try_init()
    };
    if let Err(err) = result {
        if let Err(write_err) = writeln!(io::stderr().lock(), "tracing init failed: {err}") {
            drop(write_err);
        }
    }
}
