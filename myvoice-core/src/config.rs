//! Settings loading and source resolution.
//!
//! # Storage layout
//!
//! ```text
//! ~/.amplifier/
//!   settings.yaml             (read-only here; `config.my-voice` section)
//!   my-voice/
//!     profiles/               (default mirror root)
//! ```
//!
//! # API pattern
//!
//! Every loader has two forms:
//! - `fn_at(home: &Path, …)`: explicit home; used in tests with `TempDir`
//! - `fn(…)`: derives home from `dirs::home_dir()`, delegates to `_at`

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;

use crate::error::{io_err, CoreError};
use crate::mirror::Mirror;
use crate::types::ProfileSource;

/// Bounded wait for a single git invocation unless overridden.
pub const DEFAULT_GIT_TIMEOUT: Duration = Duration::from_secs(120);

// ---------------------------------------------------------------------------
// 1. Raw settings
// ---------------------------------------------------------------------------

/// The `config.my-voice` section of `settings.yaml`, as written by the user.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct MyVoiceSettings {
    #[serde(default)]
    pub profile_source: Option<String>,
    #[serde(default)]
    pub local_path: Option<PathBuf>,
    #[serde(default)]
    pub git_timeout_secs: Option<u64>,
    #[serde(default)]
    pub replace_unversioned_mirror: Option<bool>,
}

#[derive(Debug, Default, Deserialize)]
struct SettingsFile {
    #[serde(default)]
    config: Option<SettingsSection>,
}

#[derive(Debug, Default, Deserialize)]
struct SettingsSection {
    #[serde(default, rename = "my-voice")]
    my_voice: Option<MyVoiceSettings>,
}

/// `<home>/.amplifier/settings.yaml`: pure, no I/O.
pub fn settings_path_at(home: &Path) -> PathBuf {
    home.join(".amplifier").join("settings.yaml")
}

/// `<home>/.amplifier/my-voice/profiles`: pure, no I/O.
pub fn default_mirror_path_at(home: &Path) -> PathBuf {
    home.join(".amplifier").join("my-voice").join("profiles")
}

/// Load the `config.my-voice` section from `<home>/.amplifier/settings.yaml`.
///
/// A missing file, an empty file, or a file without the section all yield
/// default (unconfigured) settings.
pub fn load_settings_at(home: &Path) -> Result<MyVoiceSettings, CoreError> {
    let path = settings_path_at(home);
    if !path.exists() {
        return Ok(MyVoiceSettings::default());
    }
    let contents = std::fs::read_to_string(&path).map_err(|e| io_err(&path, e))?;
    if contents.trim().is_empty() {
        return Ok(MyVoiceSettings::default());
    }
    let file: SettingsFile =
        serde_yaml::from_str(&contents).map_err(|e| CoreError::Parse { path, source: e })?;
    Ok(file
        .config
        .and_then(|section| section.my_voice)
        .unwrap_or_default())
}

/// `load_settings_at` convenience wrapper.
pub fn load_settings() -> Result<MyVoiceSettings, CoreError> {
    load_settings_at(&home()?)
}

// ---------------------------------------------------------------------------
// 2. Resolved configuration
// ---------------------------------------------------------------------------

/// Fully resolved store configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreConfig {
    pub source: ProfileSource,
    /// Root of the local mirror.
    pub mirror_path: PathBuf,
    pub git_timeout: Duration,
    /// Allow the bootstrap clone to delete a non-empty, unversioned directory
    /// sitting at `mirror_path`.
    pub replace_unversioned_mirror: bool,
}

impl StoreConfig {
    /// Build a config with default timeout and a non-destructive clone policy.
    pub fn new(source: ProfileSource, mirror_path: impl Into<PathBuf>) -> Self {
        Self {
            source,
            mirror_path: mirror_path.into(),
            git_timeout: DEFAULT_GIT_TIMEOUT,
            replace_unversioned_mirror: false,
        }
    }

    pub fn with_git_timeout(mut self, timeout: Duration) -> Self {
        self.git_timeout = timeout;
        self
    }

    pub fn with_replace_unversioned_mirror(mut self, replace: bool) -> Self {
        self.replace_unversioned_mirror = replace;
        self
    }

    /// Resolve raw settings against `home`.
    pub fn resolve_at(home: &Path, settings: &MyVoiceSettings) -> Result<Self, CoreError> {
        let source = ProfileSource::parse(settings.profile_source.as_deref())?;
        let mirror_path = match &settings.local_path {
            Some(path) if !path.as_os_str().is_empty() => expand_home(path, home),
            _ => default_mirror_path_at(home),
        };
        let git_timeout = settings
            .git_timeout_secs
            .filter(|secs| *secs > 0)
            .map(Duration::from_secs)
            .unwrap_or(DEFAULT_GIT_TIMEOUT);
        Ok(Self {
            source,
            mirror_path,
            git_timeout,
            replace_unversioned_mirror: settings.replace_unversioned_mirror.unwrap_or(false),
        })
    }

    /// `resolve_at` convenience wrapper.
    pub fn resolve(settings: &MyVoiceSettings) -> Result<Self, CoreError> {
        Self::resolve_at(&home()?, settings)
    }

    /// Load `settings.yaml` under `home` and resolve it.
    pub fn load_at(home: &Path) -> Result<Self, CoreError> {
        Self::resolve_at(home, &load_settings_at(home)?)
    }

    /// `load_at` convenience wrapper.
    pub fn load() -> Result<Self, CoreError> {
        Self::load_at(&home()?)
    }

    pub fn mirror(&self) -> Mirror {
        Mirror::new(&self.mirror_path)
    }
}

// ---------------------------------------------------------------------------
// Private helpers
// ---------------------------------------------------------------------------

fn home() -> Result<PathBuf, CoreError> {
    dirs::home_dir().ok_or(CoreError::HomeNotFound)
}

/// Expand a leading `~` component against `home`.
fn expand_home(path: &Path, home: &Path) -> PathBuf {
    match path.strip_prefix("~") {
        Ok(rest) => home.join(rest),
        Err(_) => path.to_path_buf(),
    }
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------
