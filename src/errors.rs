//! Error types for Crowdin Export
//!
//! This module defines the error types for every stage of an export run:
//! connecting, building, downloading, configuration and logging setup.
//! Errors are designed to be actionable and carry the context needed for a
//! one-line message on stderr.

use std::path::PathBuf;
use thiserror::Error;

/// Session and HTTP-level errors
#[derive(Error, Debug)]
pub enum ApiError {
    /// Base URL could not be parsed
    #[error("Invalid API URL: {url} - {error}")]
    InvalidUrl { url: String, error: String },

    /// Proxy URL rejected by the HTTP client
    #[error("Invalid proxy URL: {url}")]
    InvalidProxy {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    /// HTTP request failed
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Server answered with a non-success status
    #[error("Server error: HTTP {status}: {message}")]
    Status { status: u16, message: String },

    /// Token rejected by the server
    #[error("Access token rejected (HTTP {status}). Check the token and its project permissions")]
    Unauthorized { status: u16 },

    /// Project id unknown to the server
    #[error("Project {project_id} not found or not visible with this token")]
    ProjectNotFound { project_id: u64 },

    /// Rate limit exceeded after retries
    #[error("Rate limit exceeded. Server responded with HTTP 429")]
    RateLimitExceeded,

    /// Server overloaded after retries
    #[error("Server overloaded. Server responded with HTTP 503")]
    ServerOverloaded,

    /// Maximum retries exceeded on transport failures
    #[error("Maximum retry attempts ({max_retries}) exceeded")]
    MaxRetriesExceeded { max_retries: u32 },

    /// Response body did not match the expected shape
    #[error("Unexpected response from {endpoint}: {reason}")]
    UnexpectedResponse { endpoint: String, reason: String },
}

/// Build request and lookup errors
#[derive(Error, Debug)]
pub enum BuildError {
    /// Underlying API failure
    #[error(transparent)]
    Api(#[from] ApiError),

    /// Server finished the build in a non-success state
    #[error("Build {build_id} ended with status '{status}'")]
    Failed { build_id: u64, status: String },

    /// Build reported no progress for the whole timeout window
    #[error("Build {build_id} made no progress for {seconds} seconds (stuck at {progress}%)")]
    Stalled {
        build_id: u64,
        seconds: u64,
        progress: u8,
    },

    /// No finished build exists for the project
    #[error("No finished build found for project {project_id}. Run again with --build")]
    NoBuildFound { project_id: u64 },
}

/// Archive download errors
#[derive(Error, Debug)]
pub enum DownloadError {
    /// Underlying API failure (link retrieval)
    #[error(transparent)]
    Api(#[from] ApiError),

    /// HTTP request error while streaming the archive
    #[error("Archive transfer failed: {0}")]
    Http(#[from] reqwest::Error),

    /// I/O error during file operations
    #[error("File I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Storage server returned an error status
    #[error("Archive server error: HTTP {status}")]
    ServerError { status: u16 },

    /// Download link could not be parsed
    #[error("Invalid download link: {url} - {error}")]
    InvalidUrl { url: String, error: String },

    /// Atomic file operation failed
    #[error("Atomic file operation failed: could not rename {temp_path} to {final_path}")]
    AtomicOperationFailed {
        temp_path: PathBuf,
        final_path: PathBuf,
    },

    /// Incomplete download
    #[error("Incomplete download: received {received} bytes, expected {expected} bytes")]
    IncompleteDownload { received: u64, expected: u64 },
}

/// Configuration errors
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Configuration file not found
    #[error("Configuration file not found: {path}")]
    NotFound { path: PathBuf },

    /// Configuration file could not be read
    #[error("Failed to read configuration file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Invalid configuration format
    #[error("Invalid configuration format in {path}: {source}")]
    InvalidFormat {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    /// Invalid configuration value
    #[error("Invalid configuration value for {field}: {value}. {reason}")]
    InvalidValue {
        field: String,
        value: String,
        reason: String,
    },
}

/// Logging setup errors
#[derive(Error, Debug)]
pub enum LoggingError {
    /// Debug log file could not be created
    #[error("Can't create debug file {path}: {source}")]
    DebugFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Log filter directive rejected
    #[error("Invalid log filter '{directive}'")]
    InvalidFilter { directive: String },

    /// Global subscriber already installed
    #[error("Failed to install log subscriber: {0}")]
    Install(String),
}

/// Top-level application error that can represent any error type
#[derive(Error, Debug)]
pub enum AppError {
    /// Connection/session error
    #[error("connection problem: {0}")]
    Api(#[from] ApiError),

    /// Build request or lookup error
    #[error("build error: {0}")]
    Build(#[from] BuildError),

    /// Download error
    #[error("download error: {0}")]
    Download(#[from] DownloadError),

    /// Configuration error
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Logging setup error
    #[error(transparent)]
    Logging(#[from] LoggingError),
}

impl AppError {
    /// Get error category for logging
    pub fn category(&self) -> &'static str {
        match self {
            AppError::Api(_) => "connection",
            AppError::Build(BuildError::NoBuildFound { .. }) => "build-lookup",
            AppError::Build(_) => "build",
            AppError::Download(_) => "download",
            AppError::Config(_) => "config",
            AppError::Logging(_) => "logging",
        }
    }
}

/// Result type alias for convenience
pub type Result<T> = std::result::Result<T, AppError>;

/// API result type alias
pub type ApiResult<T> = std::result::Result<T, ApiError>;

/// Build result type alias
pub type BuildResult<T> = std::result::Result<T, BuildError>;

/// Download result type alias
pub type DownloadResult<T> = std::result::Result<T, DownloadError>;

/// Configuration result type alias
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;
