//! Command-line interface components
//!
//! This module contains CLI-specific code for Crowdin Export: argument
//! parsing, logging setup, the console spinner and the export command.

pub mod args;
pub mod commands;
pub mod logging;
pub mod progress;

pub use args::{Cli, parse_exit_code};
pub use commands::{ExportPlan, handle_export, run_export};
pub use logging::{init_logging, open_debug_log};
pub use progress::{Spinner, SpinnerConfig, SpinnerState, SpinnerTarget};
