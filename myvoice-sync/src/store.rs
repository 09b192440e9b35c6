//! `ProfileStore`: the public entry point.
//!
//! Wraps a [`SyncEngine`] with name validation, status reporting and the
//! document operations. Every operation returns a `Result`; none panic on
//! remote or filesystem failure.

use std::path::PathBuf;

use serde::Serialize;

use myvoice_core::{LifecycleState, ProfileName, StoreConfig};

use crate::clock::{Clock, SystemClock};
use crate::documents::{read_document, write_document, ProfileDocument, WriteOutcome};
use crate::engine::{SaveOutcome, SyncEngine, SyncOutcome};
use crate::error::{name_err, StoreError};
use crate::runner::{GitRunner, ProcessGitRunner};

/// Commit message for an explicit save with no message.
pub const DEFAULT_SAVE_MESSAGE: &str = "Update voice profile";

// ---------------------------------------------------------------------------
// Status report
// ---------------------------------------------------------------------------

/// Snapshot of the store for display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StoreStatus {
    pub configured: bool,
    /// Descriptor form: `unconfigured`, `local` or `git+<url>`.
    pub source: String,
    pub is_remote: bool,
    pub mirror_path: PathBuf,
    pub is_versioned: bool,
    /// Whether this store instance has initialized the mirror.
    pub initialized: bool,
    pub state: LifecycleState,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sync: Option<RemoteStatus>,
    pub profiles: Vec<ProfileName>,
}

/// Remote-only part of [`StoreStatus`]. Git queries are best-effort.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RemoteStatus {
    pub is_stale: bool,
    pub seconds_since_sync: Option<i64>,
    pub has_changes: Option<bool>,
    pub current_commit: Option<String>,
}

// ---------------------------------------------------------------------------
// ProfileStore
// ---------------------------------------------------------------------------

#[derive(Debug)]
pub struct ProfileStore<R = ProcessGitRunner, C = SystemClock> {
    engine: SyncEngine<R, C>,
}

impl ProfileStore<ProcessGitRunner, SystemClock> {
    pub fn new(config: StoreConfig) -> Self {
        Self {
            engine: SyncEngine::new(config),
        }
    }

    /// Store configured from `~/.amplifier/settings.yaml`.
    pub fn load() -> Result<Self, StoreError> {
        Ok(Self::new(StoreConfig::load()?))
    }
}

impl<R: GitRunner, C: Clock> ProfileStore<R, C> {
    pub fn with_parts(config: StoreConfig, runner: R, clock: C) -> Self {
        Self {
            engine: SyncEngine::with_parts(config, runner, clock),
        }
    }

    pub fn engine(&self) -> &SyncEngine<R, C> {
        &self.engine
    }

    pub fn config(&self) -> &StoreConfig {
        self.engine.config()
    }

    pub fn is_configured(&self) -> bool {
        self.engine.source().is_configured()
    }

    pub fn is_stale(&self) -> bool {
        self.engine.is_stale()
    }

    pub fn lifecycle_state(&self) -> LifecycleState {
        self.engine.lifecycle_state()
    }

    pub fn sync(&mut self, force: bool) -> Result<SyncOutcome, StoreError> {
        self.engine.sync(force)
    }

    /// Report configuration, lifecycle state and profiles. Never mutates the
    /// mirror; remote fields are filled only for a remote source.
    pub fn status(&self) -> StoreStatus {
        let source = self.engine.source();
        let mirror = self.engine.mirror();

        let sync = source.is_remote().then(|| RemoteStatus {
            is_stale: self.engine.is_stale(),
            seconds_since_sync: self.engine.seconds_since_sync(),
            has_changes: self.engine.is_dirty(),
            current_commit: self.engine.current_commit(),
        });

        let profiles = match mirror.list_profiles() {
            Ok(names) => names,
            Err(err) => {
                tracing::warn!("could not list profiles: {err}");
                Vec::new()
            }
        };

        StoreStatus {
            configured: source.is_configured(),
            source: source.to_string(),
            is_remote: source.is_remote(),
            mirror_path: mirror.root().to_path_buf(),
            is_versioned: mirror.is_versioned(),
            initialized: self.engine.is_initialized(),
            state: self.engine.lifecycle_state(),
            sync,
            profiles,
        }
    }

    /// Read a profile; see [`ProfileDocument::sync_warning`].
    pub fn read(&mut self, name: &str) -> Result<ProfileDocument, StoreError> {
        let name = ProfileName::new(name).map_err(name_err)?;
        read_document(&mut self.engine, &name)
    }

    pub fn write(
        &mut self,
        name: &str,
        content: &str,
        auto_save: bool,
    ) -> Result<WriteOutcome, StoreError> {
        let name = ProfileName::new(name).map_err(name_err)?;
        write_document(&mut self.engine, &name, content, auto_save)
    }

    /// Commit and push. A blank or missing message uses
    /// [`DEFAULT_SAVE_MESSAGE`].
    pub fn save(&mut self, message: Option<&str>) -> Result<SaveOutcome, StoreError> {
        let message = message
            .map(str::trim)
            .filter(|m| !m.is_empty())
            .unwrap_or(DEFAULT_SAVE_MESSAGE);
        self.engine.save(message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    use myvoice_core::ProfileSource;
    use tempfile::TempDir;

    use crate::testing::{ManualClock, ScriptedRunner};

    fn store(
        source: ProfileSource,
        mirror: &std::path::Path,
    ) -> (ProfileStore<ScriptedRunner, ManualClock>, ScriptedRunner) {
        let runner = ScriptedRunner::new();
        let store = ProfileStore::with_parts(
            StoreConfig::new(source, mirror),
            runner.clone(),
            ManualClock::new(),
        );
        (store, runner)
    }

    #[test]
    fn invalid_name_is_invalid_input() {
        let tmp = TempDir::new().unwrap();
        let (mut store, _) = store(ProfileSource::Local, tmp.path());
        for bad in ["", "..", "a/b"] {
            let err = store.read(bad).unwrap_err();
            assert!(matches!(err, StoreError::InvalidInput(_)), "{bad:?}: {err}");
            let err = store.write(bad, "x", false).unwrap_err();
            assert!(matches!(err, StoreError::InvalidInput(_)), "{bad:?}: {err}");
        }
    }

    #[test]
    fn blank_save_message_uses_default() {
        let tmp = TempDir::new().unwrap();
        let mirror = tmp.path().join("profiles");
        fs::create_dir_all(mirror.join(".git")).unwrap();
        let (mut store, runner) = store(ProfileSource::Remote("https://example/r".into()), &mirror);
        runner.ok("status", " M x\n");

        store.save(Some("   ")).unwrap();
        let commit = runner
            .calls()
            .into_iter()
            .find(|c| c.subcommand() == "commit")
            .unwrap();
        assert_eq!(commit.args[2], DEFAULT_SAVE_MESSAGE);
    }

    #[test]
    fn unconfigured_status_reports_without_side_effects() {
        let tmp = TempDir::new().unwrap();
        let mirror = tmp.path().join("nowhere");
        let (store, runner) = store(ProfileSource::Unconfigured, &mirror);

        let status = store.status();
        assert!(!status.configured);
        assert_eq!(status.source, "unconfigured");
        assert_eq!(status.state, LifecycleState::Unconfigured);
        assert!(status.sync.is_none());
        assert!(status.profiles.is_empty());
        assert!(!mirror.exists());
        assert!(runner.calls().is_empty());
    }

    #[test]
    fn remote_status_fills_best_effort_fields() {
        let tmp = TempDir::new().unwrap();
        let mirror = tmp.path().join("profiles");
        fs::create_dir_all(mirror.join(".git")).unwrap();
        let (store, runner) = store(ProfileSource::Remote("https://example/r".into()), &mirror);
        runner.ok("status", "");
        runner.ok("rev-parse", "cafe123\n");

        let status = store.status();
        assert_eq!(status.source, "git+https://example/r");
        assert!(status.is_versioned);
        assert!(!status.initialized);
        let sync = status.sync.expect("remote status");
        assert!(sync.is_stale);
        assert_eq!(sync.seconds_since_sync, None);
        assert_eq!(sync.has_changes, Some(false));
        assert_eq!(sync.current_commit.as_deref(), Some("cafe123"));
    }

    #[test]
    fn status_serializes_state_as_snake_case() {
        let tmp = TempDir::new().unwrap();
        let (mut store, _) = store(ProfileSource::Local, tmp.path());
        store.write("default", "x", false).unwrap();

        let json = serde_json::to_value(store.status()).unwrap();
        assert_eq!(json["state"], "ready");
        assert_eq!(json["profiles"][0], "default");
        assert_eq!(json["initialized"], true);
        assert!(json.get("sync").is_none());
    }
}
