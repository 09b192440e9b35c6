//! Profile document read/write on top of the sync engine.
//!
//! ## Write protocol
//!
//! 1. Ensure the mirror is initialized (may clone).
//! 2. Write to `<path>.myvoice.tmp`.
//! 3. Rename to the final path (atomic on POSIX).
//! 4. Optionally save; a failed save never undoes the local write.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use serde::Serialize;

use myvoice_core::ProfileName;

use crate::clock::Clock;
use crate::engine::{SaveOutcome, SyncEngine};
use crate::error::{io_err, StoreError};
use crate::runner::GitRunner;

/// A profile document as read from the mirror.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProfileDocument {
    pub name: ProfileName,
    pub path: PathBuf,
    pub content: String,
    /// Set when the pre-read pull failed and the local copy was served.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sync_warning: Option<String>,
}

/// Outcome of a document write.
#[derive(Debug)]
pub struct WriteOutcome {
    pub name: ProfileName,
    pub path: PathBuf,
    pub bytes: usize,
    /// `None` when auto-save was off. `Some(Err(_))` means the content is on
    /// disk but did not reach the remote.
    pub save: Option<Result<SaveOutcome, StoreError>>,
}

impl WriteOutcome {
    pub fn save_error(&self) -> Option<&StoreError> {
        self.save.as_ref().and_then(|r| r.as_ref().err())
    }
}

/// Commit message used when a write saves automatically.
pub fn auto_save_message(name: &ProfileName) -> String {
    format!("Update {name} voice profile")
}

/// Read one profile, pulling first if the mirror is stale.
///
/// A failed pull is logged and reported in [`ProfileDocument::sync_warning`];
/// the local copy is still returned.
pub(crate) fn read_document<R: GitRunner, C: Clock>(
    engine: &mut SyncEngine<R, C>,
    name: &ProfileName,
) -> Result<ProfileDocument, StoreError> {
    if !engine.source().is_configured() {
        return Err(StoreError::NotConfigured);
    }

    let mut sync_warning = None;
    if engine.is_stale() {
        if let Err(err) = engine.sync(false) {
            tracing::warn!("sync before reading '{name}' failed, serving local copy: {err}");
            sync_warning = Some(err.to_string());
        }
    }

    let path = engine.mirror().profile_path(name);
    match std::fs::read_to_string(&path) {
        Ok(content) => Ok(ProfileDocument {
            name: name.clone(),
            path,
            content,
            sync_warning,
        }),
        Err(e) if e.kind() == ErrorKind::NotFound => Err(StoreError::ProfileNotFound {
            name: name.to_string(),
            path,
        }),
        Err(e) => Err(io_err(path, e)),
    }
}

/// Create or replace one profile, then optionally save it.
pub(crate) fn write_document<R: GitRunner, C: Clock>(
    engine: &mut SyncEngine<R, C>,
    name: &ProfileName,
    content: &str,
    auto_save: bool,
) -> Result<WriteOutcome, StoreError> {
    engine.ensure_initialized()?;

    let path = engine.mirror().profile_path(name);
    atomic_write(&path, content)?;
    tracing::info!("wrote: {}", path.display());

    let save = auto_save.then(|| engine.save(&auto_save_message(name)));
    if let Some(Err(err)) = &save {
        tracing::warn!("auto-save of '{name}' failed, local write kept: {err}");
    }

    Ok(WriteOutcome {
        name: name.clone(),
        path,
        bytes: content.len(),
        save,
    })
}

// ---------------------------------------------------------------------------
// atomic_write
// ---------------------------------------------------------------------------

/// Write `content` byte-for-byte via a sibling temp file and rename.
pub(crate) fn atomic_write(path: &Path, content: &str) -> Result<(), StoreError> {
    let mut tmp = path.as_os_str().to_owned();
    tmp.push(".myvoice.tmp");
    atomic_write_with_tmp(path, content, Path::new(&tmp))
}

fn atomic_write_with_tmp(path: &Path, content: &str, tmp: &Path) -> Result<(), StoreError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(|e| io_err(parent, e))?;
    }
    if let Some(tmp_parent) = tmp.parent() {
        std::fs::create_dir_all(tmp_parent).map_err(|e| io_err(tmp_parent, e))?;
    }

    if let Err(e) = std::fs::write(tmp, content) {
        let _ = std::fs::remove_file(tmp);
        return Err(io_err(tmp, e));
    }
    if let Err(e) = std::fs::rename(tmp, path) {
        let _ = std::fs::remove_file(tmp);
        return Err(io_err(path, e));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
