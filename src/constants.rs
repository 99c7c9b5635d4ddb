//! Application constants for Crowdin Export
//!
//! This module centralizes all constants used throughout the application,
//! organized by functional domain for maintainability and clarity.

use std::time::Duration;

/// Environment variable names for configuration overrides
pub mod env {
    /// Overrides the API base URL
    pub const API_URL: &str = "CROWDIN_API_URL";

    /// Outbound proxy URL
    pub const PROXY: &str = "CROWDIN_PROXY";

    /// Per-request timeout in seconds
    pub const TIMEOUT: &str = "CROWDIN_TIMEOUT";
}

/// Crowdin API endpoints
pub mod crowdin {
    /// Default API v2 base URL (crowdin.com; enterprise uses `<org>.api.crowdin.com`)
    pub const DEFAULT_BASE_URL: &str = "https://api.crowdin.com/api/v2";

    /// Page size used when listing builds (API maximum is 500)
    pub const BUILD_LIST_PAGE_SIZE: usize = 500;

    /// Build status reported while a new build is queued
    pub const STATUS_CREATED: &str = "created";

    /// Build status reported while the server is still compiling
    pub const STATUS_IN_PROGRESS: &str = "inProgress";

    /// Build status for a completed build
    pub const STATUS_FINISHED: &str = "finished";

    /// Build status for a failed build
    pub const STATUS_FAILED: &str = "failed";

    /// Build status for a cancelled build
    pub const STATUS_CANCELED: &str = "canceled";
}

/// HTTP client configuration constants
pub mod http {
    use super::Duration;

    /// Default user agent for all HTTP requests
    pub const USER_AGENT: &str = concat!("Crowdin-Export/", env!("CARGO_PKG_VERSION"));

    /// Default per-request timeout, also the build stall window
    pub const DEFAULT_TIMEOUT_SECS: u64 = 50;

    /// Connection establishment timeout
    pub const CONNECT_TIMEOUT: Duration = Duration::from_secs(30);

    /// Connection pool idle timeout
    pub const POOL_IDLE_TIMEOUT: Duration = Duration::from_secs(90);

    /// Maximum number of bytes of a response body echoed into the debug log
    pub const MAX_LOGGED_BODY: usize = 4 * 1024;
}

/// Rate limiting and retry configuration
pub mod limits {
    /// Default rate limit for API requests (requests per second)
    pub const DEFAULT_RATE_LIMIT_RPS: u32 = 15;

    /// Maximum retry attempts for throttled or failed requests
    pub const MAX_RETRIES: u32 = 3;

    /// Base delay for exponential backoff (milliseconds)
    pub const RETRY_BASE_DELAY_MS: u64 = 1000;
}

/// Build polling
pub mod build {
    /// Delay between two build status requests (milliseconds)
    pub const DEFAULT_POLL_INTERVAL_MS: u64 = 1000;
}

/// File operation constants
pub mod files {
    /// Temporary file suffix for atomic operations
    pub const TEMP_FILE_SUFFIX: &str = ".tmp";

    /// Project-local configuration file name
    pub const LOCAL_CONFIG_FILE: &str = "crowdin-export.toml";

    /// Directory name under the user config dir
    pub const CONFIG_DIR_NAME: &str = "crowdin-export";
}

/// Progress reporting
pub mod progress {
    /// Spinner frame interval (milliseconds)
    pub const UPDATE_FREQUENCY_MS: u64 = 100;

    /// Spinner glyphs; the last entry is shown once the spinner is finished
    pub const SPINNER_FRAMES: &[&str] = &["|", "/", "-", "\\", " "];
}

/// Logging and debugging constants
pub mod logging {
    /// Default stderr log level
    pub const DEFAULT_LOG_LEVEL: &str = "warn";

    /// Tracing target used for request/response protocol events
    pub const PROTOCOL_TARGET: &str = "crowdin_export::protocol";
}

// Re-export commonly used constants for convenience
pub use crowdin::DEFAULT_BASE_URL;
pub use http::{DEFAULT_TIMEOUT_SECS, USER_AGENT};
pub use limits::{DEFAULT_RATE_LIMIT_RPS, MAX_RETRIES, RETRY_BASE_DELAY_MS};
