//! Core HTTP operations with rate limiting and retry logic
//!
//! This module provides the JSON request primitives used by the Crowdin
//! client, with rate limiting, exponential backoff on throttling, error body
//! decoding and optional protocol logging.

use std::num::NonZeroU32;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use governor::{clock::DefaultClock, state::InMemoryState, Jitter, Quota, RateLimiter};
use reqwest::{Client, Method, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use url::Url;

use crate::constants::{http, limits, logging};
use crate::errors::{ApiError, ApiResult};

/// HTTP operations handler with resilience patterns
#[derive(Debug)]
pub struct HttpHandler {
    client: Client,
    rate_limiter: RateLimiter<governor::state::NotKeyed, InMemoryState, DefaultClock>,
    protocol_logging: AtomicBool,
}

impl HttpHandler {
    /// Creates a new HttpHandler with the given client and rate limiting
    ///
    /// A zero rate limit is treated as one request per second.
    pub fn new(client: Client, rate_limit_rps: u32) -> Self {
        let quota = Quota::per_second(NonZeroU32::new(rate_limit_rps).unwrap_or(NonZeroU32::MIN));
        Self {
            client,
            rate_limiter: RateLimiter::direct(quota),
            protocol_logging: AtomicBool::new(false),
        }
    }

    /// Enables request/response logging on the protocol target
    pub fn set_protocol_logging(&self, enabled: bool) {
        self.protocol_logging.store(enabled, Ordering::Relaxed);
    }

    pub fn protocol_logging(&self) -> bool {
        self.protocol_logging.load(Ordering::Relaxed)
    }

    /// GET a JSON resource
    pub async fn get_json<T: DeserializeOwned>(&self, url: &Url) -> ApiResult<T> {
        let response = self.send(Method::GET, url, None::<&()>).await?;
        self.decode(url, response).await
    }

    /// POST a JSON body and decode the JSON answer
    pub async fn post_json<B: Serialize, T: DeserializeOwned>(
        &self,
        url: &Url,
        body: &B,
    ) -> ApiResult<T> {
        let response = self.send(Method::POST, url, Some(body)).await?;
        self.decode(url, response).await
    }

    /// Sends a request with rate limiting and retry logic
    ///
    /// Returns the response only for success statuses; everything else is
    /// mapped to an `ApiError` carrying the server's message.
    async fn send<B: Serialize>(
        &self,
        method: Method,
        url: &Url,
        body: Option<&B>,
    ) -> ApiResult<Response> {
        let mut retries = 0;
        loop {
            // Apply rate limiting with jitter to avoid bursts
            self.rate_limiter
                .until_ready_with_jitter(Jitter::up_to(Duration::from_millis(100)))
                .await;

            if self.protocol_logging() {
                tracing::debug!(target: logging::PROTOCOL_TARGET, "--> {} {}", method, url);
                if let Some(body) = body {
                    if let Ok(json) = serde_json::to_string(body) {
                        tracing::debug!(target: logging::PROTOCOL_TARGET, "    body: {}", json);
                    }
                }
            }

            match self.request(method.clone(), url, body).send().await {
                Ok(response) => {
                    let status = response.status();
                    if self.protocol_logging() {
                        tracing::debug!(target: logging::PROTOCOL_TARGET, "<-- {} {}", status.as_u16(), url);
                    }

                    if status == StatusCode::TOO_MANY_REQUESTS
                        || status == StatusCode::SERVICE_UNAVAILABLE
                    {
                        if retries < limits::MAX_RETRIES {
                            retries += 1;
                            let delay = backoff_delay(retries);
                            tracing::warn!(
                                "Server throttled request (HTTP {}). Backing off for {}ms",
                                status.as_u16(),
                                delay.as_millis()
                            );
                            tokio::time::sleep(delay).await;
                            continue;
                        }
                        return Err(if status == StatusCode::TOO_MANY_REQUESTS {
                            ApiError::RateLimitExceeded
                        } else {
                            ApiError::ServerOverloaded
                        });
                    }

                    if !status.is_success() {
                        let text = response.text().await.unwrap_or_default();
                        self.log_body(&text);
                        return Err(status_error(status, &text));
                    }

                    return Ok(response);
                }
                Err(e) if e.is_builder() => return Err(ApiError::Http(e)),
                Err(e) if retries < limits::MAX_RETRIES => {
                    retries += 1;
                    let delay = backoff_delay(retries);
                    tracing::warn!(
                        "Request failed (attempt {}/{}): {}. Retrying in {}ms",
                        retries,
                        limits::MAX_RETRIES,
                        e,
                        delay.as_millis()
                    );
                    tokio::time::sleep(delay).await;
                }
                Err(e) => {
                    tracing::error!(
                        "Request failed after {} retries: {}",
                        limits::MAX_RETRIES,
                        e
                    );
                    return Err(ApiError::MaxRetriesExceeded {
                        max_retries: limits::MAX_RETRIES,
                    });
                }
            }
        }
    }

    fn request<B: Serialize>(&self, method: Method, url: &Url, body: Option<&B>) -> RequestBuilder {
        let builder = self.client.request(method, url.as_str());
        match body {
            Some(body) => builder.json(body),
            None => builder,
        }
    }

    async fn decode<T: DeserializeOwned>(&self, url: &Url, response: Response) -> ApiResult<T> {
        let text = response.text().await?;
        self.log_body(&text);
        serde_json::from_str(&text).map_err(|e| ApiError::UnexpectedResponse {
            endpoint: url.path().to_string(),
            reason: e.to_string(),
        })
    }

    fn log_body(&self, text: &str) {
        if !self.protocol_logging() {
            return;
        }
        let shown: String = text.chars().take(http::MAX_LOGGED_BODY).collect();
        tracing::debug!(target: logging::PROTOCOL_TARGET, "    body: {}", shown);
    }
}

/// Delay before retry `attempt` (1-based): 1s, 2s, 4s, ...
fn backoff_delay(attempt: u32) -> Duration {
    Duration::from_millis(limits::RETRY_BASE_DELAY_MS * 2_u64.pow(attempt.saturating_sub(1)))
}

/// Maps a failed status and its body to an `ApiError`
pub(crate) fn status_error(status: StatusCode, body: &str) -> ApiError {
    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => ApiError::Unauthorized {
            status: status.as_u16(),
        },
        _ => ApiError::Status {
            status: status.as_u16(),
            message: error_message(body).unwrap_or_else(|| {
                status
                    .canonical_reason()
                    .unwrap_or("unknown error")
                    .to_string()
            }),
        },
    }
}

/// Extracts a human readable message from a Crowdin error body.
///
/// Handles both `{"error": {"code", "message"}}` and the validation form
/// `{"errors": [{"error": {"key", "errors": [{"code", "message"}]}}]}`.
pub(crate) fn error_message(body: &str) -> Option<String> {
    let value: serde_json::Value = serde_json::from_str(body).ok()?;

    if let Some(message) = value
        .pointer("/error/message")
        .and_then(|m| m.as_str())
    {
        return Some(message.to_string());
    }

    let messages: Vec<String> = value
        .get("errors")?
        .as_array()?
        .iter()
        .filter_map(|entry| {
            let key = entry.pointer("/error/key").and_then(|k| k.as_str());
            let inner = entry.pointer("/error/errors")?.as_array()?;
            let text: Vec<&str> = inner
                .iter()
                .filter_map(|e| e.get("message").and_then(|m| m.as_str()))
                .collect();
            if text.is_empty() {
                return None;
            }
            Some(match key {
                Some(key) => format!("{}: {}", key, text.join("; ")),
                None => text.join("; "),
            })
        })
        .collect();

    if messages.is_empty() {
        None
    } else {
        Some(messages.join(", "))
    }
}
