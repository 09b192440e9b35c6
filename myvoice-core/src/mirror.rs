//! Local mirror layout.
//!
//! ```text
//! <mirror>/
//!   .git/                       (present once cloned from a remote)
//!   profiles/
//!     <name>/VOICE_PROFILE.md   (one document per profile)
//! ```
//!
//! Everything here is a pure path computation or a read-only scan; the
//! mirror directory is the only source of truth for profile contents.

use std::path::{Path, PathBuf};

use crate::error::{io_err, CoreError};
use crate::types::{ProfileName, PROFILE_FILE_NAME};

/// Handle to a mirror root. Cheap to construct; holds no open resources.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Mirror {
    root: PathBuf,
}

impl Mirror {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// `<mirror>/.git`
    pub fn git_marker(&self) -> PathBuf {
        self.root.join(".git")
    }

    /// `true` once the mirror holds version-control metadata.
    pub fn is_versioned(&self) -> bool {
        self.git_marker().exists()
    }

    /// `<mirror>/profiles`
    pub fn profiles_dir(&self) -> PathBuf {
        self.root.join("profiles")
    }

    /// `<mirror>/profiles/<name>`
    pub fn profile_dir(&self, name: &ProfileName) -> PathBuf {
        self.profiles_dir().join(name.as_str())
    }

    /// `<mirror>/profiles/<name>/VOICE_PROFILE.md`
    pub fn profile_path(&self, name: &ProfileName) -> PathBuf {
        self.profile_dir(name).join(PROFILE_FILE_NAME)
    }

    /// `true` if the root is missing or an empty directory.
    pub fn is_vacant(&self) -> Result<bool, CoreError> {
        if !self.root.exists() {
            return Ok(true);
        }
        let mut entries = std::fs::read_dir(&self.root).map_err(|e| io_err(&self.root, e))?;
        Ok(entries.next().is_none())
    }

    /// Names of every profile whose document exists, sorted.
    ///
    /// Returns an empty list when `profiles/` does not exist. Directories
    /// without a `VOICE_PROFILE.md`, and directory names that are not valid
    /// profile names, are skipped.
    pub fn list_profiles(&self) -> Result<Vec<ProfileName>, CoreError> {
        let dir = self.profiles_dir();
        if !dir.exists() {
            return Ok(vec![]);
        }
        let mut names: Vec<ProfileName> = std::fs::read_dir(&dir)
            .map_err(|e| io_err(&dir, e))?
            .filter_map(|e| e.ok())
            .filter(|e| e.file_type().map(|t| t.is_dir()).unwrap_or(false))
            .filter(|e| e.path().join(PROFILE_FILE_NAME).is_file())
            .filter_map(|e| ProfileName::new(e.file_name().to_string_lossy().into_owned()).ok())
            .collect();
        names.sort();
        Ok(names)
    }

    /// `true` if at least one profile document exists. Scan errors count as
    /// "no profile".
    pub fn has_any_profile(&self) -> bool {
        self.list_profiles()
            .map(|names| !names.is_empty())
            .unwrap_or(false)
    }
}
