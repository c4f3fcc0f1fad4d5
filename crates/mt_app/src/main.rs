mod cli;
mod run;
mod settings;

use std::process::ExitCode;

use clap::Parser;
use log::LevelFilter;
use mt_logging::{mt_error, LogDestination};

use crate::cli::Cli;

fn main() -> ExitCode {
    let cli = Cli::parse();

    let level = if cli.verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };
    let destination = match &cli.log_file {
        Some(path) => LogDestination::Both(path.clone()),
        None => LogDestination::Terminal,
    };
    mt_logging::initialize(destination, level);

    report(run::run(&cli))
}

/// Errors are reported once, through the logger.
fn report<T>(result: anyhow::Result<T>) -> ExitCode {
    match result {
        Ok(_) => ExitCode::SUCCESS,
        Err(err) => {
            mt_error!("{err:#}");
            ExitCode::FAILURE
        }
    }
}
