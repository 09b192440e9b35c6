//! Error types for myvoice-sync.

use std::fmt;
use std::path::PathBuf;

use serde::Serialize;
use thiserror::Error;

use myvoice_core::CoreError;

/// Step of the save flow that failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SaveStage {
    Status,
    Add,
    Commit,
    Push,
}

impl fmt::Display for SaveStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SaveStage::Status => write!(f, "status"),
            SaveStage::Add => write!(f, "add"),
            SaveStage::Commit => write!(f, "commit"),
            SaveStage::Push => write!(f, "push"),
        }
    }
}

/// All errors that can arise from profile store operations.
///
/// Every variant leaves the store usable; local content is never rolled back.
#[derive(Debug, Error)]
pub enum StoreError {
    /// No profile source is configured.
    #[error("profile storage not configured; set config.my-voice.profile_source in ~/.amplifier/settings.yaml")]
    NotConfigured,

    /// Bootstrap clone exited non-zero, could not run, or timed out.
    #[error("clone failed: {detail}")]
    CloneFailed { detail: String },

    /// `pull --rebase` failed for a reason other than a merge conflict.
    #[error("pull failed: {detail}")]
    PullFailed { detail: String },

    /// `pull --rebase` hit a merge conflict; needs manual resolution.
    #[error("merge conflict, manual resolution needed: {detail}")]
    Conflict { detail: String },

    /// One step of status/add/commit/push failed.
    #[error("{stage} failed: {detail}")]
    SaveFailed { stage: SaveStage, detail: String },

    /// The named profile document does not exist.
    #[error("profile not found: {name} (expected at {path})")]
    ProfileNotFound { name: String, path: PathBuf },

    /// Caller supplied unusable input (bad profile name, missing content).
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// The clone target holds unversioned content and replacement is disabled.
    #[error(
        "refusing to clone into {path}: directory has unversioned content \
         (set replace_unversioned_mirror to allow replacing it)"
    )]
    MirrorOccupied { path: PathBuf },

    /// Settings or mirror-layout error from myvoice-core.
    #[error("config error: {0}")]
    Config(#[from] CoreError),

    /// An I/O error, with annotated path for context.
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl StoreError {
    /// Short machine-readable key for the error kind.
    pub fn kind(&self) -> &'static str {
        match self {
            StoreError::NotConfigured => "not_configured",
            StoreError::CloneFailed { .. } => "clone_failed",
            StoreError::PullFailed { .. } => "pull_failed",
            StoreError::Conflict { .. } => "conflict",
            StoreError::SaveFailed { .. } => "save_failed",
            StoreError::ProfileNotFound { .. } => "profile_not_found",
            StoreError::InvalidInput(_) => "invalid_input",
            StoreError::MirrorOccupied { .. } => "mirror_occupied",
            StoreError::Config(_) => "config",
            StoreError::Io { .. } => "io",
        }
    }
}

/// Convenience constructor for [`StoreError::Io`].
pub(crate) fn io_err(path: impl Into<PathBuf>, source: std::io::Error) -> StoreError {
    StoreError::Io {
        path: path.into(),
        source,
    }
}

/// Bad profile names are caller input errors, not configuration errors.
pub(crate) fn name_err(err: CoreError) -> StoreError {
    match err {
        CoreError::InvalidProfileName { .. } => StoreError::InvalidInput(err.to_string()),
        other => StoreError::Config(other),
    }
}
