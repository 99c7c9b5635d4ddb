//! Core application logic for Crowdin Export
//!
//! This module contains the Crowdin API client, the wire and domain models,
//! and the `BuildClient` seam the export command is written against.
//!
//! # Examples
//!
//! ```rust,no_run
//! use std::path::Path;
//! use std::time::Duration;
//!
//! use crowdin_export::app::{BuildClient, ClientConfig, CrowdinClient, ExportMode};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = ClientConfig::default();
//! let client = CrowdinClient::connect("my-token", 12345, &config).await?;
//!
//! let build = client
//!     .request_build(Duration::from_secs(50), ExportMode::TranslatedAndApproved)
//!     .await?;
//! client.download_build(build, Path::new("translations.zip")).await?;
//! # Ok(())
//! # }
//! ```

pub mod build_client;
pub mod client;
pub mod models;

// Re-export main public API
pub use build_client::BuildClient;
pub use client::{ClientConfig, CrowdinClient};
pub use models::{BuildId, BuildInfo, BuildProgress, BuildStatus, ExportMode};
