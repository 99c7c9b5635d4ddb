//! Data models for Crowdin builds
//!
//! Wire types for the translation build endpoints of the Crowdin v2 API,
//! plus the small domain types the export flow passes around: the opaque
//! build handle, the export mode, and the shared progress signal.

use std::fmt;
use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::constants::crowdin;

/// Opaque identifier of a server-side build
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BuildId(pub u64);

impl BuildId {
    pub fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for BuildId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Which strings and files a build exports
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportMode {
    /// Translated and approved strings only, every file
    TranslatedAndApproved,
    /// Approved strings only, every file
    ApprovedOnly,
    /// Approved strings only, fully translated files only
    ApprovedCompletedFiles,
}

impl ExportMode {
    /// Selects the build variant from the `--build` and `--completedFiles` flags.
    ///
    /// Returns `None` when no build should be requested; `completed_files`
    /// alone has no effect.
    pub fn from_flags(build: bool, completed_files: bool) -> Option<Self> {
        match (build, completed_files) {
            (false, _) => None,
            (true, false) => Some(Self::TranslatedAndApproved),
            (true, true) => Some(Self::ApprovedCompletedFiles),
        }
    }

    /// Request body for `POST /projects/{id}/translations/builds`
    pub fn to_request(self) -> BuildRequest {
        match self {
            Self::TranslatedAndApproved => BuildRequest {
                skip_untranslated_strings: true,
                export_approved_only: true,
                skip_untranslated_files: false,
            },
            Self::ApprovedOnly => BuildRequest {
                skip_untranslated_strings: false,
                export_approved_only: true,
                skip_untranslated_files: false,
            },
            Self::ApprovedCompletedFiles => BuildRequest {
                skip_untranslated_strings: false,
                export_approved_only: true,
                skip_untranslated_files: true,
            },
        }
    }
}

impl fmt::Display for ExportMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::TranslatedAndApproved => "translated+approved",
            Self::ApprovedOnly => "approved-only",
            Self::ApprovedCompletedFiles => "approved-only, completed files",
        };
        f.write_str(label)
    }
}

/// Body of a build request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BuildRequest {
    pub skip_untranslated_strings: bool,
    pub export_approved_only: bool,
    pub skip_untranslated_files: bool,
}

/// Server-side build state
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BuildStatus {
    Created,
    InProgress,
    Finished,
    Failed,
    Canceled,
    Other(String),
}

impl BuildStatus {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, Self::Created | Self::InProgress)
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::Created => crowdin::STATUS_CREATED,
            Self::InProgress => crowdin::STATUS_IN_PROGRESS,
            Self::Finished => crowdin::STATUS_FINISHED,
            Self::Failed => crowdin::STATUS_FAILED,
            Self::Canceled => crowdin::STATUS_CANCELED,
            Self::Other(s) => s,
        }
    }
}

impl From<String> for BuildStatus {
    fn from(value: String) -> Self {
        match value.as_str() {
            crowdin::STATUS_CREATED => Self::Created,
            crowdin::STATUS_IN_PROGRESS => Self::InProgress,
            crowdin::STATUS_FINISHED => Self::Finished,
            crowdin::STATUS_FAILED => Self::Failed,
            crowdin::STATUS_CANCELED => Self::Canceled,
            _ => Self::Other(value),
        }
    }
}

impl<'de> Deserialize<'de> for BuildStatus {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        String::deserialize(deserializer).map(BuildStatus::from)
    }
}

/// A project build as returned by the API
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BuildInfo {
    pub id: BuildId,
    #[serde(default)]
    pub project_id: Option<u64>,
    pub status: BuildStatus,
    #[serde(default)]
    pub progress: u8,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub finished_at: Option<DateTime<Utc>>,
}

/// Project summary, only used to validate the session
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectInfo {
    pub id: u64,
    #[serde(default)]
    pub name: Option<String>,
}

/// Signed archive link
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DownloadLink {
    pub url: String,
    #[serde(default)]
    pub expire_in: Option<DateTime<Utc>>,
}

/// `{"data": ...}` envelope wrapping every single-resource response
#[derive(Debug, Clone, Deserialize)]
pub struct Envelope<T> {
    pub data: T,
}

/// Paginated list response
#[derive(Debug, Clone, Deserialize)]
pub struct ListEnvelope<T> {
    pub data: Vec<Envelope<T>>,
}

/// Picks the most recently finished build.
///
/// Ordered by `finishedAt`, then by id; builds in any other state are ignored.
pub fn latest_finished(builds: &[BuildInfo]) -> Option<BuildId> {
    builds
        .iter()
        .filter(|b| b.status == BuildStatus::Finished)
        .max_by(|a, b| a.finished_at.cmp(&b.finished_at).then(a.id.cmp(&b.id)))
        .map(|b| b.id)
}

/// Shared build progress percentage
///
/// Written by the client, sampled by the spinner. Cloning shares the value.
#[derive(Debug, Clone, Default)]
pub struct BuildProgress(Arc<AtomicU8>);

impl BuildProgress {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn percent(&self) -> u8 {
        self.0.load(Ordering::Relaxed)
    }

    /// Stores a new value, clamped to 100
    pub fn set(&self, percent: u8) {
        self.0.store(percent.min(100), Ordering::Relaxed);
    }

    /// Stores `done / total` as a percentage; ignored when `total` is zero
    pub fn set_fraction(&self, done: u64, total: u64) {
        if total == 0 {
            return;
        }
        let percent = (done.min(total) * 100 / total) as u8;
        self.set(percent);
    }
}
