//! `myvoice write`: create or replace a profile document.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;

use myvoice_core::DEFAULT_PROFILE;
use myvoice_sync::StoreError;

use super::StoreArgs;

/// Arguments for `myvoice write`.
#[derive(Args, Debug)]
pub struct WriteArgs {
    /// Profile name.
    #[arg(long, default_value = DEFAULT_PROFILE)]
    pub profile: String,

    /// Document content.
    #[arg(long, conflicts_with = "file")]
    pub content: Option<String>,

    /// Read document content from a file.
    #[arg(long)]
    pub file: Option<PathBuf>,

    /// Write locally without committing or pushing.
    #[arg(long)]
    pub no_save: bool,
}

impl WriteArgs {
    pub fn run(self, store: &StoreArgs) -> Result<()> {
        let content = match (self.content, self.file.as_ref()) {
            (Some(content), _) => content,
            (None, Some(path)) => std::fs::read_to_string(path)
                .with_context(|| format!("failed to read {}", path.display()))?,
            (None, None) => {
                return Err(StoreError::InvalidInput(
                    "content is required; pass --content or --file".to_string(),
                )
                .into())
            }
        };

        let mut store = store.open()?;
        let outcome = store
            .write(&self.profile, &content, !self.no_save)
            .with_context(|| format!("failed to write profile '{}'", self.profile))?;

        println!(
            "✓ wrote '{}' ({} bytes)\n  ✎  {}",
            outcome.name,
            outcome.bytes,
            outcome.path.display()
        );

        match outcome.save {
            None => Ok(()),
            Some(Ok(saved)) => {
                println!("✓ {}", saved.message());
                Ok(())
            }
            Some(Err(err)) => {
                eprintln!(
                    "{} profile written locally but not saved: {err}",
                    "warning:".yellow().bold()
                );
                Ok(())
            }
        }
    }
}
