//! myvoice: voice profile storage CLI.
//!
//! # Usage
//!
//! ```text
//! myvoice [--source <DESCRIPTOR>] [--mirror <PATH>] status [--json]
//! myvoice state
//! myvoice sync [--force]
//! myvoice read [--profile <name>]
//! myvoice write [--profile <name>] (--content <text> | --file <path>) [--no-save]
//! myvoice save [--message <msg>]
//! ```

mod commands;

use anyhow::Result;
use clap::{Parser, Subcommand};

use commands::{
    read::ReadArgs, save::SaveArgs, state::StateArgs, status::StatusArgs, sync::SyncArgs,
    write::WriteArgs, StoreArgs,
};

// ---------------------------------------------------------------------------
// CLI entry point
// ---------------------------------------------------------------------------

#[derive(Parser, Debug)]
#[command(
    name = "myvoice",
    version,
    about = "Read, write and sync voice profiles",
    long_about = None,
)]
struct Cli {
    #[command(flatten)]
    store: StoreArgs,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Show configuration, lifecycle state and profiles.
    Status(StatusArgs),

    /// Print the lifecycle state key.
    State(StateArgs),

    /// Pull remote changes into the mirror.
    Sync(SyncArgs),

    /// Print a profile document.
    Read(ReadArgs),

    /// Create or replace a profile document.
    Write(WriteArgs),

    /// Commit and push local changes.
    Save(SaveArgs),
}

fn init_tracing() {
    use tracing_subscriber::{fmt, EnvFilter};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}

// ---------------------------------------------------------------------------
// Main
// ---------------------------------------------------------------------------

fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();
    match cli.command {
        Commands::Status(args) => args.run(&cli.store),
        Commands::State(args) => args.run(&cli.store),
        Commands::Sync(args) => args.run(&cli.store),
        Commands::Read(args) => args.run(&cli.store),
        Commands::Write(args) => args.run(&cli.store),
        Commands::Save(args) => args.run(&cli.store),
    }
}
