//! Lifecycle classification.
//!
//! Precedence:
//! 1. `Unconfigured` (no profile source)
//! 2. `ConfiguredNeedsClone` (remote source, no `.git` marker)
//! 3. `Ready` (at least one profile document)
//! 4. `ConfiguredNoProfile`

use std::fmt;

use serde::Serialize;

use crate::mirror::Mirror;
use crate::types::ProfileSource;

/// Readiness of the profile store, derived fresh on every query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LifecycleState {
    Unconfigured,
    ConfiguredNeedsClone,
    ConfiguredNoProfile,
    Ready,
}

impl LifecycleState {
    /// Stable machine-readable key.
    pub fn key(self) -> &'static str {
        match self {
            Self::Unconfigured => "unconfigured",
            Self::ConfiguredNeedsClone => "configured_needs_clone",
            Self::ConfiguredNoProfile => "configured_no_profile",
            Self::Ready => "ready",
        }
    }
}

impl fmt::Display for LifecycleState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// Classify the store. Reads the file system only; never mutates it.
pub fn classify(source: &ProfileSource, mirror: &Mirror) -> LifecycleState {
    if !source.is_configured() {
        return LifecycleState::Unconfigured;
    }
    if source.is_remote() && !mirror.is_versioned() {
        return LifecycleState::ConfiguredNeedsClone;
    }
    if mirror.has_any_profile() {
        LifecycleState::Ready
    } else {
        LifecycleState::ConfiguredNoProfile
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    use tempfile::TempDir;

    use crate::types::{ProfileName, PROFILE_FILE_NAME};

    fn remote() -> ProfileSource {
        ProfileSource::Remote("https://example/repo".into())
    }

    fn add_default_profile(mirror: &Mirror) {
        let name = ProfileName::default();
        fs::create_dir_all(mirror.profile_dir(&name)).unwrap();
        fs::write(mirror.profile_path(&name), "voice").unwrap();
    }

    #[test]
    fn unconfigured_ignores_mirror_contents() {
        let tmp = TempDir::new().unwrap();
        let mirror = Mirror::new(tmp.path());
        add_default_profile(&mirror);
        assert_eq!(
            classify(&ProfileSource::Unconfigured, &mirror),
            LifecycleState::Unconfigured
        );
    }

    #[test]
    fn remote_without_marker_needs_clone_even_with_profiles() {
        let tmp = TempDir::new().unwrap();
        let mirror = Mirror::new(tmp.path());
        add_default_profile(&mirror);
        assert_eq!(
            classify(&remote(), &mirror),
            LifecycleState::ConfiguredNeedsClone
        );
    }

    #[test]
    fn remote_with_marker_and_no_profiles() {
        let tmp = TempDir::new().unwrap();
        let mirror = Mirror::new(tmp.path());
        fs::create_dir_all(mirror.git_marker()).unwrap();
        assert_eq!(
            classify(&remote(), &mirror),
            LifecycleState::ConfiguredNoProfile
        );
    }

    #[test]
    fn remote_with_marker_and_profile_is_ready() {
        let tmp = TempDir::new().unwrap();
        let mirror = Mirror::new(tmp.path());
        fs::create_dir_all(mirror.git_marker()).unwrap();
        add_default_profile(&mirror);
        assert_eq!(classify(&remote(), &mirror), LifecycleState::Ready);
    }

    #[test]
    fn local_missing_mirror_has_no_profile() {
        let tmp = TempDir::new().unwrap();
        let mirror = Mirror::new(tmp.path().join("never-created"));
        assert_eq!(
            classify(&ProfileSource::Local, &mirror),
            LifecycleState::ConfiguredNoProfile
        );
        assert!(!mirror.root().exists(), "classify must not create the mirror");
    }

    #[test]
    fn profile_dir_without_document_is_not_ready() {
        let tmp = TempDir::new().unwrap();
        let mirror = Mirror::new(tmp.path());
        let dir = mirror.profiles_dir().join("default");
        fs::create_dir_all(&dir).unwrap();
        fs::write(dir.join(format!("{PROFILE_FILE_NAME}.bak")), "x").unwrap();
        assert_eq!(
            classify(&ProfileSource::Local, &mirror),
            LifecycleState::ConfiguredNoProfile
        );
    }

    #[test]
    fn classify_is_repeatable() {
        let tmp = TempDir::new().unwrap();
        let mirror = Mirror::new(tmp.path());
        add_default_profile(&mirror);
        let first = classify(&ProfileSource::Local, &mirror);
        let second = classify(&ProfileSource::Local, &mirror);
        assert_eq!(first, second);
        assert_eq!(first, LifecycleState::Ready);
    }

    #[test]
    fn keys_are_snake_case() {
        assert_eq!(LifecycleState::ConfiguredNeedsClone.key(), "configured_needs_clone");
        assert_eq!(LifecycleState::Ready.to_string(), "ready");
    }
}
