//! Prelude module for Crowdin Export Library
//!
//! Re-exports the items needed for typical library usage with a single
//! `use crowdin_export::prelude::*;` statement.
//!
//! # Usage
//!
//! ```rust,no_run
//! use crowdin_export::prelude::*;
//!
//! #[tokio::main]
//! async fn main() -> Result<()> {
//!     let client = CrowdinClient::connect("token", 12345, &ClientConfig::default()).await?;
//!     let build = client.latest_build_id().await?;
//!     client.download_build(build, Path::new("latest.zip")).await?;
//!     Ok(())
//! }
//! ```

// Core result types
pub use crate::errors::{AppError, Result};

// Client and data types
pub use crate::app::{
    BuildClient, BuildId, BuildInfo, BuildProgress, BuildStatus, ClientConfig, CrowdinClient,
    ExportMode,
};

// Configuration
pub use crate::config::AppConfig;

// Commonly used constants
pub use crate::constants::{DEFAULT_BASE_URL, DEFAULT_TIMEOUT_SECS, USER_AGENT};

pub use std::path::{Path, PathBuf};

pub use tokio;
