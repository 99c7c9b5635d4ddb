//! HTTP client configuration and building logic
//!
//! This module handles the configuration and construction of the HTTP
//! clients used to talk to the Crowdin API and to fetch the archive.

use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION};
use reqwest::{Client, Proxy};
use url::Url;

use crate::constants::{build, crowdin, http, limits};
use crate::errors::{ApiError, ApiResult};

/// Runtime configuration for a Crowdin session
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// API base URL, e.g. `https://api.crowdin.com/api/v2`
    pub base_url: String,
    /// Outbound proxy for every request
    pub proxy: Option<String>,
    /// Per-request timeout, also the build stall window
    pub request_timeout: Duration,
    /// Connect timeout
    pub connect_timeout: Duration,
    /// Delay between build status polls
    pub poll_interval: Duration,
    /// Rate limit (requests per second)
    pub rate_limit_rps: u32,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: crowdin::DEFAULT_BASE_URL.to_string(),
            proxy: None,
            request_timeout: Duration::from_secs(http::DEFAULT_TIMEOUT_SECS),
            connect_timeout: http::CONNECT_TIMEOUT,
            poll_interval: Duration::from_millis(build::DEFAULT_POLL_INTERVAL_MS),
            rate_limit_rps: limits::DEFAULT_RATE_LIMIT_RPS,
        }
    }
}

impl ClientConfig {
    /// Parses the base URL, making sure it ends with a slash so that
    /// relative endpoint joins keep the `/api/v2` prefix.
    pub fn parsed_base_url(&self) -> ApiResult<Url> {
        let mut raw = self.base_url.trim().to_string();
        if !raw.ends_with('/') {
            raw.push('/');
        }
        Url::parse(&raw).map_err(|e| ApiError::InvalidUrl {
            url: self.base_url.clone(),
            error: e.to_string(),
        })
    }

    /// Builds the authenticated API client
    pub fn build_api_client(&self, token: &str) -> ApiResult<Client> {
        let mut headers = HeaderMap::new();
        let mut auth = HeaderValue::from_str(&format!("Bearer {}", token.trim())).map_err(|_| {
            ApiError::UnexpectedResponse {
                endpoint: "token".to_string(),
                reason: "access token contains characters not allowed in a header".to_string(),
            }
        })?;
        auth.set_sensitive(true);
        headers.insert(AUTHORIZATION, auth);
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        self.builder()?
            .default_headers(headers)
            .build()
            .map_err(ApiError::Http)
    }

    /// Builds the client used for the signed archive link.
    ///
    /// It carries no bearer token: the link is pre-signed storage and rejects
    /// extra credentials.
    pub fn build_download_client(&self) -> ApiResult<Client> {
        self.builder()?.build().map_err(ApiError::Http)
    }

    fn builder(&self) -> ApiResult<reqwest::ClientBuilder> {
        let mut client_builder = Client::builder()
            .timeout(self.request_timeout)
            .connect_timeout(self.connect_timeout)
            .user_agent(http::USER_AGENT)
            .pool_idle_timeout(http::POOL_IDLE_TIMEOUT);

        if let Some(proxy_url) = self.proxy.as_deref().filter(|p| !p.is_empty()) {
            let proxy = Proxy::all(proxy_url).map_err(|source| ApiError::InvalidProxy {
                url: proxy_url.to_string(),
                source,
            })?;
            client_builder = client_builder.proxy(proxy);
        }

        Ok(client_builder)
    }
}
