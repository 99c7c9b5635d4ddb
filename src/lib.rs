//! Crowdin Export Library
//!
//! A Rust library for exporting translations from Crowdin (API v2): request
//! a project build, wait for it to finish, and download the archive.

pub mod app;
pub mod cli;
pub mod config;
pub mod constants;
pub mod errors;
pub mod prelude;

// Re-export commonly used types for convenience
pub use errors::{AppError, Result};
