//! `myvoice read`: print a profile document to stdout.

use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;

use myvoice_core::DEFAULT_PROFILE;

use super::StoreArgs;

/// Arguments for `myvoice read`.
#[derive(Args, Debug)]
pub struct ReadArgs {
    /// Profile name.
    #[arg(long, default_value = DEFAULT_PROFILE)]
    pub profile: String,
}

impl ReadArgs {
    pub fn run(self, store: &StoreArgs) -> Result<()> {
        let mut store = store.open()?;
        let doc = store
            .read(&self.profile)
            .with_context(|| format!("failed to read profile '{}'", self.profile))?;

        if let Some(warning) = doc.sync_warning.as_deref() {
            eprintln!(
                "{} sync failed, showing local copy: {warning}",
                "warning:".yellow().bold()
            );
        }
        print!("{}", doc.content);
        Ok(())
    }
}
