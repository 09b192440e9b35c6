//! `myvoice state`: print the lifecycle state key.

use anyhow::Result;
use clap::Args;

use super::StoreArgs;

/// Arguments for `myvoice state`.
#[derive(Args, Debug)]
pub struct StateArgs {}

impl StateArgs {
    pub fn run(self, store: &StoreArgs) -> Result<()> {
        println!("{}", store.open()?.lifecycle_state().key());
        Ok(())
    }
}
