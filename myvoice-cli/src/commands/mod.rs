pub mod read;
pub mod save;
pub mod state;
pub mod status;
pub mod sync;
pub mod write;

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;

use myvoice_core::config::load_settings;
use myvoice_core::{MyVoiceSettings, StoreConfig};
use myvoice_sync::ProfileStore;

/// Flags shared by every subcommand; each overrides the settings file.
#[derive(Args, Debug, Default)]
pub struct StoreArgs {
    /// Profile source: `local`, `git+<url>` or `unconfigured`.
    #[arg(long, global = true)]
    pub source: Option<String>,

    /// Mirror root directory.
    #[arg(long, global = true)]
    pub mirror: Option<PathBuf>,
}

impl StoreArgs {
    /// Resolve the store config. Flags are applied to the raw settings before
    /// resolution, so `--mirror` gets the same `~` expansion as `local_path`
    /// and `--source` wins over an unusable settings file.
    pub fn config(&self) -> Result<StoreConfig> {
        let mut settings = match load_settings() {
            Ok(settings) => settings,
            Err(err) if self.source.is_some() => {
                eprintln!(
                    "{} ignoring ~/.amplifier/settings.yaml: {err}",
                    "warning:".yellow().bold()
                );
                MyVoiceSettings::default()
            }
            Err(err) => return Err(err).context("failed to load ~/.amplifier/settings.yaml"),
        };
        if let Some(raw) = self.source.as_ref() {
            settings.profile_source = Some(raw.clone());
        }
        if let Some(mirror) = self.mirror.as_ref() {
            settings.local_path = Some(mirror.clone());
        }
        StoreConfig::resolve(&settings).with_context(|| match self.source.as_deref() {
            Some(raw) => format!("invalid --source descriptor '{raw}'"),
            None => "invalid settings in ~/.amplifier/settings.yaml".to_string(),
        })
    }

    pub fn open(&self) -> Result<ProfileStore> {
        Ok(ProfileStore::new(self.config()?))
    }
}
