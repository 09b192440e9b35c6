//! Sync engine: bootstrap clone, staleness-gated pull, push-on-save.
//!
//! ## Cursor rules
//!
//! The [`SyncCursor`] records the last confirmed remote round-trip. It starts
//! unset, so a fresh process always treats a remote mirror as stale. It moves
//! only after a clone, pull or push exits 0; a failed or timed-out remote
//! call leaves it where it was.
//!
//! ## Concurrency
//!
//! Mutating operations take `&mut self`, so one engine never overlaps its own
//! remote calls. Nothing guards a mirror against a second engine (in this or
//! another process) pointed at the same path; callers must serialize that.

use std::path::{Path, PathBuf};
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::Serialize;

use myvoice_core::{classify, LifecycleState, Mirror, ProfileSource, StoreConfig};

use crate::clock::{Clock, SystemClock};
use crate::error::{io_err, SaveStage, StoreError};
use crate::runner::{GitOutput, GitRunner, ProcessGitRunner, RunnerError};

/// A remote mirror older than this is pulled before reads.
pub const STALENESS_THRESHOLD: Duration = Duration::from_secs(300);

/// Attribution appended to every commit, one `-m` paragraph each.
pub const COMMIT_TRAILERS: [&str; 2] = [
    "Generated with myvoice profile sync",
    "Co-Authored-By: myvoice <myvoice@users.noreply.github.com>",
];

// ---------------------------------------------------------------------------
// Sync cursor
// ---------------------------------------------------------------------------

/// Time of the last successful pull, push or clone. Process-local.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SyncCursor(Option<DateTime<Utc>>);

impl SyncCursor {
    pub fn last_synced(&self) -> Option<DateTime<Utc>> {
        self.0
    }

    pub fn elapsed(&self, now: DateTime<Utc>) -> Option<chrono::Duration> {
        self.0.map(|at| now.signed_duration_since(at))
    }

    /// Unset counts as stale; otherwise stale once strictly past `threshold`.
    pub fn is_stale(&self, now: DateTime<Utc>, threshold: Duration) -> bool {
        match self.elapsed(now) {
            None => true,
            // Negative elapsed (clock went backwards) reads as fresh.
            Some(elapsed) => elapsed.to_std().map_or(false, |e| e > threshold),
        }
    }

    fn advance(&mut self, at: DateTime<Utc>) {
        self.0 = Some(at);
    }
}

// ---------------------------------------------------------------------------
// Outcomes
// ---------------------------------------------------------------------------

/// Result of [`SyncEngine::ensure_initialized`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum InitOutcome {
    /// Mirror root exists (created if needed); no clone was necessary.
    Ready,
    /// Bootstrap clone ran and succeeded.
    Cloned {
        path: PathBuf,
        synced_at: DateTime<Utc>,
    },
}

/// Result of [`SyncEngine::sync`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum SyncOutcome {
    /// Source is local; there is nothing to pull.
    NoSyncNeeded,
    /// Not forced and within the staleness window; no remote call made.
    AlreadyFresh,
    /// `pull --rebase` succeeded.
    Pulled {
        output: String,
        synced_at: DateTime<Utc>,
    },
}

impl SyncOutcome {
    pub fn message(&self) -> &'static str {
        match self {
            SyncOutcome::NoSyncNeeded => "Local storage - no sync needed",
            SyncOutcome::AlreadyFresh => "Already up to date (not stale)",
            SyncOutcome::Pulled { .. } => "Synced with remote",
        }
    }
}

/// Result of [`SyncEngine::save`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum SaveOutcome {
    /// Source is local; the write on disk is the save.
    SavedLocally,
    /// Working tree is clean; no commit or push was made.
    NothingToSave,
    /// Committed and pushed.
    Pushed {
        message: String,
        synced_at: DateTime<Utc>,
    },
}

impl SaveOutcome {
    pub fn message(&self) -> String {
        match self {
            SaveOutcome::SavedLocally => "Local storage - changes saved locally".to_string(),
            SaveOutcome::NothingToSave => "No changes to save".to_string(),
            SaveOutcome::Pushed { message, .. } => format!("Saved and pushed: {message}"),
        }
    }
}

// ---------------------------------------------------------------------------
// SyncEngine
// ---------------------------------------------------------------------------

/// Owns the remote-facing state of one store instance.
#[derive(Debug)]
pub struct SyncEngine<R = ProcessGitRunner, C = SystemClock> {
    config: StoreConfig,
    mirror: Mirror,
    runner: R,
    clock: C,
    cursor: SyncCursor,
    initialized: bool,
}

impl SyncEngine<ProcessGitRunner, SystemClock> {
    /// Engine backed by the real `git` binary and wall-clock time.
    pub fn new(config: StoreConfig) -> Self {
        let runner = ProcessGitRunner::new(config.git_timeout);
        Self::with_parts(config, runner, SystemClock)
    }
}

impl<R: GitRunner, C: Clock> SyncEngine<R, C> {
    pub fn with_parts(config: StoreConfig, runner: R, clock: C) -> Self {
        let mirror = config.mirror();
        Self {
            config,
            mirror,
            runner,
            clock,
            cursor: SyncCursor::default(),
            initialized: false,
        }
    }

    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    pub fn source(&self) -> &ProfileSource {
        &self.config.source
    }

    pub fn mirror(&self) -> &Mirror {
        &self.mirror
    }

    pub fn runner(&self) -> &R {
        &self.runner
    }

    pub fn cursor(&self) -> SyncCursor {
        self.cursor
    }

    /// `true` once [`Self::ensure_initialized`] has succeeded in this session.
    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    pub fn lifecycle_state(&self) -> LifecycleState {
        classify(&self.config.source, &self.mirror)
    }

    /// Always `false` for local and unconfigured sources.
    pub fn is_stale(&self) -> bool {
        self.config.source.is_remote()
            && self.cursor.is_stale(self.clock.now(), STALENESS_THRESHOLD)
    }

    /// Whole seconds since the cursor last moved; `None` if it never has.
    pub fn seconds_since_sync(&self) -> Option<i64> {
        self.cursor
            .elapsed(self.clock.now())
            .map(|elapsed| elapsed.num_seconds().max(0))
    }

    // -----------------------------------------------------------------------
    // Initialization
    // -----------------------------------------------------------------------

    /// Make the mirror usable, cloning a remote on first use.
    pub fn ensure_initialized(&mut self) -> Result<InitOutcome, StoreError> {
        if !self.config.source.is_configured() {
            return Err(StoreError::NotConfigured);
        }
        let remote_url = self.config.source.remote_url().map(str::to_owned);
        let outcome = match remote_url {
            Some(url) if !self.mirror.is_versioned() => self.clone_remote(&url)?,
            _ => {
                let root = self.mirror.root();
                std::fs::create_dir_all(root).map_err(|e| io_err(root, e))?;
                InitOutcome::Ready
            }
        };
        self.initialized = true;
        Ok(outcome)
    }

    fn clone_remote(&mut self, url: &str) -> Result<InitOutcome, StoreError> {
        let dest = std::path::absolute(self.mirror.root())
            .map_err(|e| io_err(self.mirror.root(), e))?;
        // Passed to git as an argument; a lossy conversion would clone elsewhere.
        let dest_arg = dest
            .to_str()
            .ok_or_else(|| {
                StoreError::InvalidInput(format!(
                    "mirror path {} is not valid UTF-8",
                    dest.display()
                ))
            })?
            .to_string();
        let parent = dest
            .parent()
            .map(Path::to_path_buf)
            .ok_or_else(|| StoreError::CloneFailed {
                detail: format!("mirror path {} has no parent directory", dest.display()),
            })?;
        std::fs::create_dir_all(&parent).map_err(|e| io_err(&parent, e))?;
        self.prepare_clone_target(&dest)?;

        tracing::info!("cloning {url} into {dest_arg}");
        let output = self
            .git(&["clone", url, &dest_arg], &parent)
            .map_err(|e| StoreError::CloneFailed {
                detail: e.to_string(),
            })?;
        if !output.success() {
            return Err(StoreError::CloneFailed {
                detail: output.detail(),
            });
        }

        let now = self.clock.now();
        self.cursor.advance(now);
        Ok(InitOutcome::Cloned {
            path: dest,
            synced_at: now,
        })
    }

    /// Clear the way for `git clone`, which needs a missing or empty target.
    ///
    /// An empty directory is removed. Anything with content is removed only
    /// when `replace_unversioned_mirror` is set; otherwise nothing is touched.
    fn prepare_clone_target(&self, dest: &Path) -> Result<(), StoreError> {
        if !dest.exists() {
            return Ok(());
        }
        let vacant = dest.is_dir() && Mirror::new(dest).is_vacant()?;
        if !vacant && !self.config.replace_unversioned_mirror {
            return Err(StoreError::MirrorOccupied {
                path: dest.to_path_buf(),
            });
        }
        if !vacant {
            tracing::warn!("replacing unversioned mirror at {}", dest.display());
        }
        let removed = if dest.is_dir() {
            std::fs::remove_dir_all(dest)
        } else {
            std::fs::remove_file(dest)
        };
        removed.map_err(|e| io_err(dest, e))
    }

    // -----------------------------------------------------------------------
    // Pull
    // -----------------------------------------------------------------------

    /// Pull when forced or stale. Never resolves conflicts.
    pub fn sync(&mut self, force: bool) -> Result<SyncOutcome, StoreError> {
        self.ensure_initialized()?;

        if !self.config.source.is_remote() {
            return Ok(SyncOutcome::NoSyncNeeded);
        }
        if !force && !self.is_stale() {
            tracing::debug!("mirror is fresh; skipping pull");
            return Ok(SyncOutcome::AlreadyFresh);
        }

        let root = self.mirror.root().to_path_buf();
        let output = self
            .git(&["pull", "--rebase"], &root)
            .map_err(|e| StoreError::PullFailed {
                detail: e.to_string(),
            })?;
        if !output.success() {
            let detail = output.detail();
            // Rebase reports "CONFLICT (content): ..." on stdout, other
            // failures on stderr; check both.
            let combined = format!("{}\n{}", output.stderr, output.stdout).to_lowercase();
            return Err(if combined.contains("conflict") {
                StoreError::Conflict { detail }
            } else {
                StoreError::PullFailed { detail }
            });
        }

        let now = self.clock.now();
        self.cursor.advance(now);
        tracing::info!("pulled {}", root.display());
        Ok(SyncOutcome::Pulled {
            output: output.stdout.trim().to_string(),
            synced_at: now,
        })
    }

    // -----------------------------------------------------------------------
    // Save
    // -----------------------------------------------------------------------

    /// Commit and push local changes; a clean tree is a no-op.
    pub fn save(&mut self, message: &str) -> Result<SaveOutcome, StoreError> {
        if !self.initialized {
            self.ensure_initialized()?;
        }
        if !self.config.source.is_remote() {
            return Ok(SaveOutcome::SavedLocally);
        }

        let status = self.save_step(SaveStage::Status, &["status", "--porcelain"])?;
        if status.stdout.trim().is_empty() {
            return Ok(SaveOutcome::NothingToSave);
        }

        self.save_step(SaveStage::Add, &["add", "-A"])?;
        let mut commit = vec!["commit", "-m", message];
        for trailer in COMMIT_TRAILERS {
            commit.extend(["-m", trailer]);
        }
        self.save_step(SaveStage::Commit, &commit)?;
        self.save_step(SaveStage::Push, &["push"])?;

        let now = self.clock.now();
        self.cursor.advance(now);
        tracing::info!("pushed: {message}");
        Ok(SaveOutcome::Pushed {
            message: message.to_string(),
            synced_at: now,
        })
    }

    fn save_step(&self, stage: SaveStage, args: &[&str]) -> Result<GitOutput, StoreError> {
        let output = self
            .git(args, self.mirror.root())
            .map_err(|e| StoreError::SaveFailed {
                stage,
                detail: e.to_string(),
            })?;
        if !output.success() {
            return Err(StoreError::SaveFailed {
                stage,
                detail: output.detail(),
            });
        }
        Ok(output)
    }

    // -----------------------------------------------------------------------
    // Best-effort queries
    // -----------------------------------------------------------------------

    /// Whether the working tree has uncommitted changes. `None` when the
    /// mirror is not a clone or git could not answer.
    pub fn is_dirty(&self) -> Option<bool> {
        self.query(&["status", "--porcelain"])
            .map(|stdout| !stdout.trim().is_empty())
    }

    /// Short hash of `HEAD`, when available.
    pub fn current_commit(&self) -> Option<String> {
        self.query(&["rev-parse", "--short", "HEAD"])
            .map(|stdout| stdout.trim().to_string())
            .filter(|hash| !hash.is_empty())
    }

    fn query(&self, args: &[&str]) -> Option<String> {
        if !self.config.source.is_remote() || !self.mirror.is_versioned() {
            return None;
        }
        match self.git(args, self.mirror.root()) {
            Ok(output) if output.success() => Some(output.stdout),
            Ok(output) => {
                tracing::debug!("git {} failed: {}", args.join(" "), output.detail());
                None
            }
            Err(err) => {
                tracing::debug!("git {} failed: {err}", args.join(" "));
                None
            }
        }
    }

    fn git(&self, args: &[&str], cwd: &Path) -> Result<GitOutput, RunnerError> {
        self.runner.run(args, cwd)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
