//! Domain types for voice profile storage.
//!
//! All path fields use `PathBuf`; profile names are validated once at the
//! boundary so the rest of the code can join them onto paths freely.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// File name of the single document stored per profile directory.
pub const PROFILE_FILE_NAME: &str = "VOICE_PROFILE.md";

/// Profile used when the caller does not name one.
pub const DEFAULT_PROFILE: &str = "default";

/// Prefix marking a remote descriptor: `git+<url>`.
pub const REMOTE_PREFIX: &str = "git+";

// ---------------------------------------------------------------------------
// Profile source
// ---------------------------------------------------------------------------

/// Where profile documents live.
///
/// Immutable for the life of a store; changing it means building a new store.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ProfileSource {
    #[default]
    Unconfigured,
    Local,
    Remote(String),
}

impl ProfileSource {
    /// Parse a raw descriptor.
    ///
    /// - absent, blank or `"unconfigured"` → [`ProfileSource::Unconfigured`]
    /// - `"local"` → [`ProfileSource::Local`]
    /// - `"git+<url>"` → [`ProfileSource::Remote`] with the prefix stripped
    ///
    /// Anything else is rejected with [`CoreError::InvalidSource`].
    pub fn parse(raw: Option<&str>) -> Result<Self, CoreError> {
        let value = raw.map(str::trim).unwrap_or_default();
        match value {
            "" | "unconfigured" => Ok(Self::Unconfigured),
            "local" => Ok(Self::Local),
            _ => match value.strip_prefix(REMOTE_PREFIX) {
                Some(url) if !url.is_empty() => Ok(Self::Remote(url.to_owned())),
                _ => Err(CoreError::InvalidSource {
                    value: value.to_owned(),
                }),
            },
        }
    }

    pub fn is_configured(&self) -> bool {
        !matches!(self, Self::Unconfigured)
    }

    pub fn is_remote(&self) -> bool {
        matches!(self, Self::Remote(_))
    }

    /// Remote URL, if any.
    pub fn remote_url(&self) -> Option<&str> {
        match self {
            Self::Remote(url) => Some(url),
            _ => None,
        }
    }
}

/// Formats back to the descriptor form accepted by [`ProfileSource::parse`].
impl fmt::Display for ProfileSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unconfigured => write!(f, "unconfigured"),
            Self::Local => write!(f, "local"),
            Self::Remote(url) => write!(f, "{REMOTE_PREFIX}{url}"),
        }
    }
}

// ---------------------------------------------------------------------------
// Profile name
// ---------------------------------------------------------------------------

/// A validated profile name: exactly one path component under `profiles/`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ProfileName(String);

impl ProfileName {
    pub fn new(name: impl Into<String>) -> Result<Self, CoreError> {
        let name = name.into();
        let reason = if name.trim().is_empty() {
            Some("name is empty")
        } else if name == "." || name == ".." {
            Some("name is a relative directory reference")
        } else if name.contains(['/', '\\']) {
            Some("name contains a path separator")
        } else if name.contains('\0') {
            Some("name contains a NUL byte")
        } else {
            None
        };
        match reason {
            Some(reason) => Err(CoreError::InvalidProfileName { name, reason }),
            None => Ok(Self(name)),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for ProfileName {
    fn default() -> Self {
        Self(DEFAULT_PROFILE.to_owned())
    }
}

impl fmt::Display for ProfileName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl TryFrom<String> for ProfileName {
    type Error = CoreError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::new(s)
    }
}

impl TryFrom<&str> for ProfileName {
    type Error = CoreError;

    fn try_from(s: &str) -> Result<Self, Self::Error> {
        Self::new(s)
    }
}

impl From<ProfileName> for String {
    fn from(name: ProfileName) -> Self {
        name.0
    }
}

impl AsRef<str> for ProfileName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
