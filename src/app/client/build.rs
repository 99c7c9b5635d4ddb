//! Build request, polling and lookup
//!
//! A build is requested with a single POST and then polled until the server
//! reports a terminal status. The poll loop gives up once the reported
//! progress has not moved for a whole timeout window, so a long but healthy
//! build is never cut short by a cumulative deadline.

use std::time::{Duration, Instant};

use crate::app::client::http::HttpHandler;
use crate::app::client::Endpoints;
use crate::app::models::{
    latest_finished, BuildId, BuildInfo, BuildProgress, BuildStatus, Envelope, ExportMode,
    ListEnvelope,
};
use crate::constants::crowdin;
use crate::errors::{BuildError, BuildResult};

/// Build operations handler
pub struct BuildHandler<'a> {
    http_handler: &'a HttpHandler,
    endpoints: &'a Endpoints,
    progress: &'a BuildProgress,
    poll_interval: Duration,
}

impl<'a> BuildHandler<'a> {
    pub fn new(
        http_handler: &'a HttpHandler,
        endpoints: &'a Endpoints,
        progress: &'a BuildProgress,
        poll_interval: Duration,
    ) -> Self {
        Self {
            http_handler,
            endpoints,
            progress,
            poll_interval,
        }
    }

    /// Requests a build of every target language and waits for it to finish
    ///
    /// # Errors
    ///
    /// Returns `BuildError` if the request is rejected, the build ends in a
    /// non-finished state, or it stalls for longer than `stall_timeout`.
    pub async fn request_build(
        &self,
        stall_timeout: Duration,
        mode: ExportMode,
    ) -> BuildResult<BuildId> {
        self.progress.set(0);

        let url = self.endpoints.builds()?;
        let created: Envelope<BuildInfo> = self
            .http_handler
            .post_json(&url, &mode.to_request())
            .await?;
        let build_id = created.data.id;
        tracing::info!("Requested build {} ({})", build_id, mode);

        self.wait_for_build(created.data, stall_timeout).await?;
        tracing::info!("Build {} finished", build_id);
        Ok(build_id)
    }

    async fn wait_for_build(&self, mut info: BuildInfo, stall_timeout: Duration) -> BuildResult<()> {
        let build_id = info.id;
        let mut last_progress = info.progress;
        let mut last_change = Instant::now();

        loop {
            self.progress.set(info.progress);
            tracing::debug!(
                "Build {} status={} progress={}%",
                build_id,
                info.status.as_str(),
                info.progress
            );

            match info.status {
                BuildStatus::Finished => {
                    self.progress.set(100);
                    return Ok(());
                }
                BuildStatus::Created | BuildStatus::InProgress => {}
                other => {
                    return Err(BuildError::Failed {
                        build_id: build_id.get(),
                        status: other.as_str().to_string(),
                    });
                }
            }

            if info.progress != last_progress {
                last_progress = info.progress;
                last_change = Instant::now();
            } else if last_change.elapsed() >= stall_timeout {
                return Err(BuildError::Stalled {
                    build_id: build_id.get(),
                    seconds: stall_timeout.as_secs(),
                    progress: info.progress,
                });
            }

            tokio::time::sleep(self.poll_interval).await;

            let url = self.endpoints.build(build_id)?;
            let status: Envelope<BuildInfo> = self.http_handler.get_json(&url).await?;
            info = status.data;
        }
    }

    /// Finds the most recently finished build of the project
    ///
    /// # Errors
    ///
    /// Returns `BuildError::NoBuildFound` if the project has no finished build.
    pub async fn latest_build_id(&self) -> BuildResult<BuildId> {
        let page_size = crowdin::BUILD_LIST_PAGE_SIZE;
        let mut builds = Vec::new();
        let mut offset = 0;

        loop {
            let url = self.endpoints.builds_page(offset, page_size)?;
            let page: ListEnvelope<BuildInfo> = self.http_handler.get_json(&url).await?;
            let received = page.data.len();
            builds.extend(page.data.into_iter().map(|entry| entry.data));

            if received < page_size {
                break;
            }
            offset += received;
        }

        tracing::debug!("Project has {} builds", builds.len());

        latest_finished(&builds).ok_or(BuildError::NoBuildFound {
            project_id: self.endpoints.project_id(),
        })
    }
}
