//! Command-line argument parsing for Crowdin Export
//!
//! This module defines the CLI structure using clap derive macros. The
//! version flag is re-declared as `-v/--version` to keep the historical
//! short form, and every parse failure other than help/version display
//! exits with status 1.

use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::time::Duration;

use clap::error::ErrorKind;
use clap::{Arg, ArgAction, CommandFactory, FromArgMatches, Parser};

use crate::app::ExportMode;
use crate::cli::commands::ExportPlan;
use crate::config::AppConfig;

/// Crowdin Export - build a Crowdin project and download the translations archive
#[derive(Parser, Debug, Clone)]
#[command(
    name = "crowdin_export",
    version,
    disable_version_flag = true,
    about = "Build a Crowdin project and download the translations archive",
    long_about = "Downloads the archive of a Crowdin project's translations (API v2).
By default the most recent finished build is downloaded; with --build a new build
is requested first and awaited."
)]
pub struct Cli {
    /// Request a build
    #[arg(short, long)]
    pub build: bool,

    /// Exports completely translated files only (to be used along with -b option)
    #[arg(short = 'c', long = "completedFiles", visible_alias = "completed-files")]
    pub completed_files: bool,

    /// Specify the API URL [default: https://api.crowdin.com/api/v2]
    #[arg(short, long, value_name = "URL")]
    pub url: Option<String>,

    /// Use a proxy - followed with url
    #[arg(short, long, value_name = "URL")]
    pub proxy: Option<String>,

    /// Timeout in seconds for each request to the server [default: 50]
    #[arg(short, long, value_name = "SECS", value_parser = clap::value_parser!(u64).range(1..))]
    pub timeout: Option<u64>,

    /// No spinning progress indicator (for unattended usage)
    #[arg(short, long)]
    pub nospin: bool,

    /// Store debug info in a file followed with path and filename
    #[arg(short, long, value_name = "PATH")]
    pub debug: Option<String>,

    /// Configuration file path
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Debug-level logging on stderr
    #[arg(long, conflicts_with = "quiet")]
    pub verbose: bool,

    /// Only report errors on stderr
    #[arg(short, long)]
    pub quiet: bool,

    /// Crowdin personal access token
    #[arg(value_name = "TOKEN")]
    pub token: String,

    /// Numeric Crowdin project id
    #[arg(value_name = "PROJECT_ID")]
    pub project_id: u64,

    /// Path and name of the zip file to write
    #[arg(value_name = "OUTPUT")]
    pub output: PathBuf,
}

impl Cli {
    /// Full command definition, including the `-v/--version` flag
    pub fn command_with_version() -> clap::Command {
        Self::command().arg(
            Arg::new("version")
                .short('v')
                .long("version")
                .action(ArgAction::Version)
                .help("Display version"),
        )
    }

    /// Parses an argument list
    pub fn try_parse_args<I, T>(args: I) -> Result<Self, clap::Error>
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString> + Clone,
    {
        let mut command = Self::command_with_version();
        let matches = command.try_get_matches_from_mut(args)?;
        Self::from_arg_matches(&matches).map_err(|e| e.with_cmd(&command))
    }

    /// Parse command line arguments
    ///
    /// Help and version output exit with status 0; any other parse error,
    /// including a non-numeric project id, exits with status 1 before any
    /// connection is attempted.
    pub fn parse_args() -> Self {
        match Self::try_parse_args(std::env::args_os()) {
            Ok(cli) => cli,
            Err(e) => {
                let _ = e.print();
                std::process::exit(parse_exit_code(e.kind()));
            }
        }
    }

    /// Stderr log directive level, given the configured default
    pub fn log_level<'a>(&self, configured: &'a str) -> &'a str {
        if self.quiet {
            "error"
        } else if self.verbose {
            "debug"
        } else {
            configured
        }
    }

    /// Debug log destination; an empty path means no debug log
    pub fn debug_path(&self) -> Option<&Path> {
        self.debug
            .as_deref()
            .filter(|path| !path.is_empty())
            .map(Path::new)
    }

    /// Applies `--url`, `--proxy` and `--timeout` on top of loaded settings
    pub fn apply_overrides(&self, config: &mut AppConfig) {
        if let Some(url) = self.url.as_ref().filter(|u| !u.is_empty()) {
            config.client.base_url = url.clone();
        }
        if let Some(proxy) = self.proxy.as_ref().filter(|p| !p.is_empty()) {
            config.client.proxy = Some(proxy.clone());
        }
        if let Some(timeout) = self.timeout {
            config.client.timeout_secs = timeout;
        }
    }

    /// What the export command will do
    pub fn export_plan(&self, config: &AppConfig) -> ExportPlan {
        ExportPlan {
            mode: ExportMode::from_flags(self.build, self.completed_files),
            timeout: Duration::from_secs(config.client.timeout_secs),
            output: self.output.clone(),
        }
    }
}

/// Exit status for a clap parse outcome
pub fn parse_exit_code(kind: ErrorKind) -> i32 {
    match kind {
        ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => 0,
        _ => 1,
    }
}
