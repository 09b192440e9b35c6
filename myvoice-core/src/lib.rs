//! myvoice core library: domain types, settings resolution, mirror layout.
//!
//! - [`types`]: profile source and profile name
//! - [`config`]: settings loading and [`StoreConfig`] resolution
//! - [`mirror`]: on-disk layout of the local mirror
//! - [`lifecycle`]: readiness classification
//! - [`error`]: [`CoreError`]

pub mod config;
pub mod error;
pub mod lifecycle;
pub mod mirror;
pub mod types;

pub use config::{MyVoiceSettings, StoreConfig, DEFAULT_GIT_TIMEOUT};
pub use error::CoreError;
pub use lifecycle::{classify, LifecycleState};
pub use mirror::Mirror;
pub use types::{ProfileName, ProfileSource, DEFAULT_PROFILE, PROFILE_FILE_NAME};
