//! Error types for myvoice-core.

use std::path::PathBuf;

use thiserror::Error;

/// All errors that can arise from configuration and mirror layout handling.
#[derive(Debug, Error)]
pub enum CoreError {
    /// `dirs::home_dir()` returned `None`; cannot locate `~/.amplifier/`.
    #[error("cannot determine home directory; set $HOME or equivalent")]
    HomeNotFound,

    /// The profile source descriptor is neither empty, `local`, nor `git+<url>`.
    #[error("invalid profile source '{value}'; expected \"local\" or \"git+<url>\"")]
    InvalidSource { value: String },

    /// A profile name that cannot be mapped onto a single directory.
    #[error("invalid profile name '{name}': {reason}")]
    InvalidProfileName { name: String, reason: &'static str },

    /// YAML parse error on load, with the settings file path.
    #[error("failed to parse settings at {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    /// An I/O error, with annotated path for context.
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Convenience constructor for [`CoreError::Io`].
pub(crate) fn io_err(path: impl Into<PathBuf>, source: std::io::Error) -> CoreError {
    CoreError::Io {
        path: path.into(),
        source,
    }
}
