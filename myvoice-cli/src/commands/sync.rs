//! `myvoice sync`: pull remote changes into the mirror.

use anyhow::{Context, Result};
use clap::Args;

use myvoice_sync::SyncOutcome;

use super::StoreArgs;

/// Arguments for `myvoice sync`.
#[derive(Args, Debug)]
pub struct SyncArgs {
    /// Pull even if the mirror was synced recently.
    #[arg(long)]
    pub force: bool,
}

impl SyncArgs {
    pub fn run(self, store: &StoreArgs) -> Result<()> {
        let mut store = store.open()?;
        let outcome = store.sync(self.force).context("sync failed")?;

        println!("✓ {}", outcome.message());
        if let SyncOutcome::Pulled { output, .. } = &outcome {
            for line in output.lines() {
                println!("  {line}");
            }
        }
        Ok(())
    }
}
