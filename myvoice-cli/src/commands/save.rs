//! `myvoice save`: commit and push local changes.

use anyhow::{Context, Result};
use clap::Args;

use super::StoreArgs;

/// Arguments for `myvoice save`.
#[derive(Args, Debug)]
pub struct SaveArgs {
    /// Commit message.
    #[arg(long, short)]
    pub message: Option<String>,
}

impl SaveArgs {
    pub fn run(self, store: &StoreArgs) -> Result<()> {
        let mut store = store.open()?;
        let outcome = store
            .save(self.message.as_deref())
            .context("save failed")?;
        println!("✓ {}", outcome.message());
        Ok(())
    }
}
