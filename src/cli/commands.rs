//! Command handler for the export
//!
//! Connects to Crowdin, either requests a fresh build or picks the latest
//! finished one, and downloads the resulting archive while the spinner
//! reports progress.

use std::path::PathBuf;
use std::time::{Duration, Instant};

use tracing::{debug, info, warn};

use crate::app::{BuildClient, BuildId, CrowdinClient, ExportMode};
use crate::cli::{Cli, Spinner, SpinnerConfig};
use crate::config::AppConfig;
use crate::errors::Result;

/// What a single invocation will do
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportPlan {
    /// Build to request; `None` downloads the latest finished build
    pub mode: Option<ExportMode>,
    /// Stall window for the build wait
    pub timeout: Duration,
    /// Archive destination
    pub output: PathBuf,
}

/// Handle the export command
///
/// `protocol_logging` turns on request/response logging once connected
/// (set when a debug log file is in use).
pub async fn handle_export(cli: &Cli, config: &AppConfig, protocol_logging: bool) -> Result<()> {
    let plan = cli.export_plan(config);

    if cli.completed_files && !cli.build {
        warn!("--completedFiles only applies together with --build; downloading the latest build");
    }

    info!(
        "Connecting to {} for project {}",
        config.client.base_url, cli.project_id
    );
    let client =
        CrowdinClient::connect(&cli.token, cli.project_id, &config.to_client_config()).await?;

    let mut spinner = if cli.nospin {
        Spinner::disabled()
    } else {
        Spinner::new(SpinnerConfig::default())
    };

    if protocol_logging {
        client.set_protocol_logging(true);
    }

    let build_id = run_export(&client, &plan, &mut spinner).await?;

    if !cli.quiet {
        eprintln!(
            "Downloaded build {} to {}",
            build_id,
            plan.output.display()
        );
    }
    Ok(())
}

/// Run the export against any [`BuildClient`]
///
/// The spinner is started before the first service call and stopped on
/// every exit path.
pub async fn run_export<C: BuildClient>(
    client: &C,
    plan: &ExportPlan,
    spinner: &mut Spinner,
) -> Result<BuildId> {
    let start_time = Instant::now();
    spinner.start(client.progress());

    let result = export_build(client, plan).await;
    spinner.stop().await;

    match &result {
        Ok(build_id) => info!(
            "Export of build {} completed in {:?}",
            build_id,
            start_time.elapsed()
        ),
        Err(e) => debug!("Export failed after {:?}: {}", start_time.elapsed(), e),
    }
    result
}

async fn export_build<C: BuildClient>(client: &C, plan: &ExportPlan) -> Result<BuildId> {
    let build_id = match plan.mode {
        Some(mode) => {
            info!("Requesting a {} build", mode);
            client.request_build(plan.timeout, mode).await?
        }
        None => {
            info!("Looking up the latest finished build");
            client.latest_build_id().await?
        }
    };

    info!("Downloading build {} to {}", build_id, plan.output.display());
    client.download_build(build_id, &plan.output).await?;
    Ok(build_id)
}
