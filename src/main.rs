//! Crowdin Export CLI application
//!
//! Command-line tool that builds a Crowdin project (optionally) and
//! downloads the translations archive.

use std::process;

use tracing::{debug, info};

use crowdin_export::cli::{Cli, handle_export, init_logging, open_debug_log};
use crowdin_export::config::AppConfig;
use crowdin_export::errors::Result;

#[tokio::main]
async fn main() {
    // Load environment variables from .env file if it exists
    dotenv::dotenv().ok();

    // Parse command line arguments; exits on usage errors
    let cli = Cli::parse_args();

    if let Err(e) = run(cli).await {
        debug!(category = e.category(), "Export aborted: {:?}", e);
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

/// Main application logic
async fn run(cli: Cli) -> Result<()> {
    let mut config = AppConfig::load(cli.config.as_deref())?;
    cli.apply_overrides(&mut config);

    // The debug file must be writable before anything else happens
    let debug_log = cli.debug_path().map(open_debug_log).transpose()?;
    let protocol_logging = debug_log.is_some();

    init_logging(
        cli.log_level(&config.logging.level),
        cli.verbose,
        debug_log,
    )?;

    info!("Crowdin Export v{} starting", env!("CARGO_PKG_VERSION"));

    handle_export(&cli, &config, protocol_logging).await
}
