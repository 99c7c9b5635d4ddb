//! The build-service seam used by the export flow
//!
//! The export command only needs four things from a translation service:
//! request a build, find the latest build, download a build archive, and
//! report progress. [`CrowdinClient`](crate::app::CrowdinClient) is the
//! production implementation; tests drive the flow with in-memory fakes.

use std::path::Path;
use std::time::Duration;

use crate::app::models::{BuildId, BuildProgress, ExportMode};
use crate::errors::{BuildResult, DownloadResult};

#[allow(async_fn_in_trait)]
pub trait BuildClient {
    /// Requests a new build and blocks until it has finished.
    ///
    /// `timeout` bounds how long the build may go without reporting progress.
    async fn request_build(&self, timeout: Duration, mode: ExportMode) -> BuildResult<BuildId>;

    /// Returns the most recently finished build without starting a new one.
    async fn latest_build_id(&self) -> BuildResult<BuildId>;

    /// Writes the archive of `build_id` to `destination`.
    async fn download_build(&self, build_id: BuildId, destination: &Path) -> DownloadResult<()>;

    /// Shared handle on the progress signal, for observers on other tasks.
    fn progress(&self) -> BuildProgress;

    /// Non-blocking progress snapshot, 0-100.
    fn build_progress_percent(&self) -> u8 {
        self.progress().percent()
    }
}
