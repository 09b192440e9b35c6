//! # myvoice-sync
//!
//! Voice profile storage backed by a local directory or a git mirror.
//!
//! Build a [`ProfileStore`] from a [`myvoice_core::StoreConfig`], then
//! [`ProfileStore::read`], [`ProfileStore::write`] and [`ProfileStore::save`]
//! profiles by name. Remote mirrors are cloned on first use and pulled when
//! older than [`STALENESS_THRESHOLD`].

pub mod clock;
pub mod documents;
pub mod engine;
pub mod error;
pub mod runner;
pub mod store;

#[cfg(any(test, feature = "test-helpers"))]
pub mod testing;

pub use clock::{Clock, SystemClock};
pub use documents::{auto_save_message, ProfileDocument, WriteOutcome};
pub use engine::{
    InitOutcome, SaveOutcome, SyncCursor, SyncEngine, SyncOutcome, COMMIT_TRAILERS,
    STALENESS_THRESHOLD,
};
pub use error::{SaveStage, StoreError};
pub use runner::{GitOutput, GitRunner, ProcessGitRunner, RunnerError};
pub use store::{ProfileStore, RemoteStatus, StoreStatus, DEFAULT_SAVE_MESSAGE};
