//! Logging setup
//!
//! Human-oriented logs go to stderr at the level chosen by `--verbose`,
//! `--quiet` or the config file (`RUST_LOG` directives are honoured too).
//! With `--debug PATH` a second, plain-text layer records everything the
//! crate emits at trace level, including request/response protocol logs,
//! into that file.

use std::fs::File;
use std::path::Path;
use std::sync::Mutex;

use tracing_subscriber::prelude::*;
use tracing_subscriber::{EnvFilter, fmt};

use crate::errors::LoggingError;

const CRATE_TARGET: &str = "crowdin_export";

/// Create (truncate) the debug log file
pub fn open_debug_log(path: &Path) -> Result<File, LoggingError> {
    File::create(path).map_err(|source| LoggingError::DebugFile {
        path: path.to_path_buf(),
        source,
    })
}

/// Stderr filter for `level`, on top of any `RUST_LOG` directives
pub fn stderr_filter(level: &str) -> Result<EnvFilter, LoggingError> {
    let directive = format!("{}={}", CRATE_TARGET, level);
    let parsed = directive
        .parse()
        .map_err(|_| LoggingError::InvalidFilter { directive })?;
    Ok(EnvFilter::from_default_env().add_directive(parsed))
}

/// Install the global subscriber
///
/// `show_levels` prints the level of each stderr line (used with
/// `--verbose`).
pub fn init_logging(
    level: &str,
    show_levels: bool,
    debug_log: Option<File>,
) -> Result<(), LoggingError> {
    let stderr_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_level(show_levels)
        .with_filter(stderr_filter(level)?);

    let debug_layer = debug_log.map(|file| {
        fmt::layer()
            .with_writer(Mutex::new(file))
            .with_ansi(false)
            .with_target(true)
            .with_filter(EnvFilter::new(format!("{}=trace", CRATE_TARGET)))
    });

    tracing_subscriber::registry()
        .with(stderr_layer)
        .with(debug_layer)
        .try_init()
        .map_err(|e| LoggingError::Install(e.to_string()))
}
