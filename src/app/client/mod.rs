//! HTTP client for the Crowdin v2 API
//!
//! This module provides the session used by the export flow: it
//! authenticates with a personal access token, requests and polls
//! translation builds, and downloads build archives.
//!
//! The module is organized into specialized components:
//! - `config`: HTTP client configuration and building
//! - `http`: JSON requests with rate limiting, retries and protocol logging
//! - `build`: build request, polling and latest-build lookup
//! - `download`: archive download with atomic writes

use std::path::Path;
use std::time::Duration;

use reqwest::Client;
use url::Url;

use crate::app::build_client::BuildClient;
use crate::app::models::{BuildId, BuildProgress, Envelope, ExportMode, ProjectInfo};
use crate::errors::{ApiError, ApiResult, BuildResult, DownloadResult};

// Module declarations
pub mod build;
pub mod config;
pub mod download;
pub mod http;

#[cfg(test)]
mod tests;

pub use config::ClientConfig;

use build::BuildHandler;
use download::DownloadHandler;
use http::HttpHandler;

/// URL construction for one project
#[derive(Debug, Clone)]
pub struct Endpoints {
    base: Url,
    project_id: u64,
}

impl Endpoints {
    pub fn new(base: Url, project_id: u64) -> Self {
        Self { base, project_id }
    }

    pub fn project_id(&self) -> u64 {
        self.project_id
    }

    fn join(&self, path: &str) -> ApiResult<Url> {
        self.base.join(path).map_err(|e| ApiError::InvalidUrl {
            url: format!("{}{}", self.base, path),
            error: e.to_string(),
        })
    }

    pub fn project(&self) -> ApiResult<Url> {
        self.join(&format!("projects/{}", self.project_id))
    }

    pub fn builds(&self) -> ApiResult<Url> {
        self.join(&format!("projects/{}/translations/builds", self.project_id))
    }

    pub fn builds_page(&self, offset: usize, limit: usize) -> ApiResult<Url> {
        let mut url = self.builds()?;
        url.query_pairs_mut()
            .append_pair("limit", &limit.to_string())
            .append_pair("offset", &offset.to_string());
        Ok(url)
    }

    pub fn build(&self, build_id: BuildId) -> ApiResult<Url> {
        self.join(&format!(
            "projects/{}/translations/builds/{}",
            self.project_id, build_id
        ))
    }

    pub fn build_download(&self, build_id: BuildId) -> ApiResult<Url> {
        self.join(&format!(
            "projects/{}/translations/builds/{}/download",
            self.project_id, build_id
        ))
    }
}

/// Authenticated session with one Crowdin project
///
/// Created with [`CrowdinClient::connect`], which verifies that the token can
/// see the project before any build is requested.
#[derive(Debug)]
pub struct CrowdinClient {
    http_handler: HttpHandler,
    storage_client: Client,
    endpoints: Endpoints,
    progress: BuildProgress,
    poll_interval: Duration,
}

impl CrowdinClient {
    /// Builds the session without contacting the server
    ///
    /// # Errors
    ///
    /// Returns `ApiError` if the base URL, proxy or token are malformed
    pub fn new(token: &str, project_id: u64, config: &ClientConfig) -> ApiResult<Self> {
        let base = config.parsed_base_url()?;
        let api_client = config.build_api_client(token)?;
        let storage_client = config.build_download_client()?;

        Ok(Self {
            http_handler: HttpHandler::new(api_client, config.rate_limit_rps),
            storage_client,
            endpoints: Endpoints::new(base, project_id),
            progress: BuildProgress::new(),
            poll_interval: config.poll_interval,
        })
    }

    /// Opens a session and checks the credentials against the project
    ///
    /// # Errors
    ///
    /// Returns `ApiError` if:
    /// - The base URL or proxy URL is invalid
    /// - The server cannot be reached
    /// - The token is rejected or the project is not visible to it
    pub async fn connect(token: &str, project_id: u64, config: &ClientConfig) -> ApiResult<Self> {
        let client = Self::new(token, project_id, config)?;

        let url = client.endpoints.project()?;
        let project: Envelope<ProjectInfo> = match client.http_handler.get_json(&url).await {
            Ok(project) => project,
            Err(ApiError::Status { status: 404, .. }) => {
                return Err(ApiError::ProjectNotFound { project_id })
            }
            Err(e) => return Err(e),
        };

        tracing::info!(
            "Connected to {} project {} ({})",
            client.endpoints.base,
            project.data.id,
            project.data.name.as_deref().unwrap_or("unnamed")
        );
        Ok(client)
    }

    /// Turns request/response logging on or off for the rest of the session
    pub fn set_protocol_logging(&self, enabled: bool) {
        self.http_handler.set_protocol_logging(enabled);
    }

    pub fn project_id(&self) -> u64 {
        self.endpoints.project_id()
    }

    fn build_handler(&self) -> BuildHandler<'_> {
        BuildHandler::new(
            &self.http_handler,
            &self.endpoints,
            &self.progress,
            self.poll_interval,
        )
    }
}

impl BuildClient for CrowdinClient {
    async fn request_build(&self, timeout: Duration, mode: ExportMode) -> BuildResult<BuildId> {
        self.build_handler().request_build(timeout, mode).await
    }

    async fn latest_build_id(&self) -> BuildResult<BuildId> {
        self.build_handler().latest_build_id().await
    }

    async fn download_build(&self, build_id: BuildId, destination: &Path) -> DownloadResult<()> {
        DownloadHandler::new(
            &self.http_handler,
            &self.storage_client,
            &self.endpoints,
            &self.progress,
        )
        .download_build(build_id, destination)
        .await
    }

    fn progress(&self) -> BuildProgress {
        self.progress.clone()
    }
}
